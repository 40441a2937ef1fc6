//! Store file layout for the key-value repository.
//!
//! # Invariants
//! - The layout version lives in `PRAGMA user_version`.
//! - A file written by a newer build is refused, never downgraded.
//! - Connections handed out have the current layout.

use super::kv_repo::{RepoError, RepoResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Layout steps, indexed by the version they produce.
const LAYOUT: &[(u32, &str)] = &[(1, include_str!("kv_entries.sql"))];

/// Newest layout version this build writes.
pub fn layout_version() -> u32 {
    LAYOUT.last().map_or(0, |(version, _)| *version)
}

pub(crate) fn open_file(path: &Path) -> RepoResult<Connection> {
    prepare("file", || Connection::open(path))
}

pub(crate) fn open_in_memory() -> RepoResult<Connection> {
    prepare("memory", Connection::open_in_memory)
}

fn prepare<F>(mode: &str, connect: F) -> RepoResult<Connection>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    let result = connect().map_err(RepoError::from).and_then(|mut conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        upgrade(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=kv_open module=repo status=ok mode={mode} layout={} duration_ms={}",
            layout_version(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=kv_open module=repo status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn upgrade(conn: &mut Connection) -> RepoResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = layout_version();
    if found > supported {
        return Err(RepoError::UnsupportedLayout { found, supported });
    }

    let pending: Vec<_> = LAYOUT.iter().filter(|(version, _)| *version > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;
    Ok(())
}
