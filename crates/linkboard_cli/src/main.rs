//! Command-line front end for a linkboard.
//!
//! # Responsibility
//! - Open the backend selected by flags or `LINKBOARD_*` environment variables.
//! - Run one board intent and print the result.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use linkboard_core::ui::{AuthProvider, ConfirmPrompt, StatusKind, StatusMessage, StatusSink};
use linkboard_core::{
    init_logging, AnyAdapter, Board, BoardConfig, EntityId, LinkDraft, Outcome, PersistenceAdapter,
};
use std::error::Error;
use std::io::{BufRead, Write};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    if let Commands::Version = cli.command {
        println!("linkboard_core version={}", linkboard_core::core_version());
        return Ok(());
    }

    let config = BoardConfig::from_lookup(|key| cli.settings.lookup(key))?;
    if let Some(logging) = &config.logging {
        init_logging(logging)?;
    }
    let adapter = AnyAdapter::from_config(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli, adapter))
}

async fn execute(cli: Cli, adapter: AnyAdapter) -> Result<(), Box<dyn Error>> {
    let prompt = StdinPrompt { assume_yes: cli.yes };
    let mut board = Board::start(
        adapter,
        Box::new(FlagAuth(cli.editor)),
        prompt,
        Box::new(StderrStatus),
    )
    .await;

    match cli.command {
        Commands::Version => {}
        Commands::List => print_board(&board),
        Commands::Html => println!("{}", board.view().to_html()),
        Commands::Export(args) => {
            for path in board.export()?.write_to(&args.out)? {
                println!("wrote {}", path.display());
            }
        }
        Commands::Add(args) => {
            let mut draft = LinkDraft::new(args.url, args.title).with_description(args.description);
            if let Some(image) = args.image {
                draft = draft.with_image(image);
            }
            if let Some(note) = args.note {
                draft = draft.with_note(note);
            }
            let link = board.submit_link(draft).await?;
            println!("created link {}", link.id);
        }
        Commands::Notice(args) => report(board.submit_notice(&args.text).await?),
        Commands::Note(args) => {
            let id = parse_id(&args.id);
            board.open_editor(&id)?;
            board.edit_draft(&id, &args.note)?;
            board.set_note_sync(&id, args.sync)?;
            board.save_note(&id).await?;
        }
        Commands::DeleteLink(args) => report(board.delete_link(&parse_id(&args.id)).await?),
        Commands::DeleteNotice(args) => report(board.delete_notice(&parse_id(&args.id)).await?),
        Commands::ClearNotices => report(board.clear_notices().await?),
    }
    Ok(())
}

fn parse_id(value: &str) -> EntityId {
    EntityId::parse(value).unwrap_or_else(|| EntityId::from(value))
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::Applied => println!("done"),
        Outcome::Declined => println!("cancelled"),
        Outcome::Ignored => println!("nothing to do"),
        Outcome::Exported(bundle) => println!("exported {} documents", bundle.documents.len()),
    }
}

fn print_board<A: PersistenceAdapter, P: ConfirmPrompt>(board: &Board<A, P>) {
    println!("backend={}", board.backend_kind());
    println!("notices:");
    if board.notices().is_empty() {
        println!("  {}", linkboard_core::render::NO_NOTICES_TEXT);
    }
    for notice in board.notices().presentation() {
        println!("  [{}] {}", notice.id, notice.content);
    }
    println!("links:");
    for link in board.links().presentation() {
        println!("  [{}] {} <{}>", link.id, link.title, link.url);
        if let Some(note) = &link.note {
            println!("      note: {note}");
        }
    }
}

struct FlagAuth(bool);

impl AuthProvider for FlagAuth {
    fn is_editor(&self) -> bool {
        self.0
    }

    fn logout(&self) -> Result<(), String> {
        Ok(())
    }
}

struct StdinPrompt {
    assume_yes: bool,
}

impl ConfirmPrompt for StdinPrompt {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

struct StderrStatus;

impl StatusSink for StderrStatus {
    fn show(&self, message: StatusMessage) {
        let label = match message.kind {
            StatusKind::Info => "status",
            StatusKind::Progress => "working",
            StatusKind::Error => "error",
        };
        eprintln!("[ {label}: {} ]", message.text);
        log::debug!("event=cli_status module=cli kind={label}");
    }
}
