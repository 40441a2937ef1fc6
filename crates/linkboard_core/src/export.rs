//! Export of the current board as downloadable documents.
//!
//! Produces the same pair of files the board has always exported:
//! `links.json` and, only when notices exist, `notice.txt`. Both hold
//! pretty-printed JSON in storage order so they can seed a local store.

use crate::model::link::Link;
use crate::model::notice::Notice;
use crate::store::Snapshot;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const LINKS_FILE: &str = "links.json";
pub const NOTICES_FILE: &str = "notice.txt";

#[derive(Debug)]
pub enum ExportError {
    Encode(serde_json::Error),
    Write { path: PathBuf, source: std::io::Error },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
            Self::Write { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Write { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// One downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: &'static str,
    pub contents: String,
}

/// Documents produced by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub documents: Vec<ExportDocument>,
}

impl ExportBundle {
    pub fn from_snapshots(
        links: &Snapshot<Link>,
        notices: &Snapshot<Notice>,
    ) -> Result<Self, ExportError> {
        let mut documents = vec![ExportDocument {
            file_name: LINKS_FILE,
            contents: serde_json::to_string_pretty(&links.storage_order())?,
        }];
        if !notices.is_empty() {
            documents.push(ExportDocument {
                file_name: NOTICES_FILE,
                contents: serde_json::to_string_pretty(&notices.storage_order())?,
            });
        }
        Ok(Self { documents })
    }

    pub fn get(&self, file_name: &str) -> Option<&ExportDocument> {
        self.documents
            .iter()
            .find(|document| document.file_name == file_name)
    }

    /// Writes every document into `dir`, returning the written paths.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        self.documents
            .iter()
            .map(|document| {
                let path = dir.join(document.file_name);
                std::fs::write(&path, &document.contents).map_err(|source| ExportError::Write {
                    path: path.clone(),
                    source,
                })?;
                Ok(path)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportBundle, LINKS_FILE, NOTICES_FILE};
    use crate::adapter::SnapshotOrder;
    use crate::model::id::EntityId;
    use crate::model::link::Link;
    use crate::model::notice::Notice;
    use crate::store::Snapshot;

    fn link(id: &str) -> Link {
        Link {
            id: EntityId::from(id),
            url: "https://a.test".to_string(),
            title: id.to_string(),
            description: String::new(),
            image: None,
            favicon: None,
            note: None,
        }
    }

    #[test]
    fn notice_file_is_omitted_without_notices() {
        let links = Snapshot::new(vec![link("a")], SnapshotOrder::OldestFirst, 1);
        let notices = Snapshot::empty(SnapshotOrder::OldestFirst);

        let bundle = ExportBundle::from_snapshots(&links, &notices).expect("export");
        assert_eq!(bundle.documents.len(), 1);
        assert!(bundle.get(LINKS_FILE).is_some());
        assert!(bundle.get(NOTICES_FILE).is_none());
    }

    #[test]
    fn newest_first_snapshot_is_exported_in_storage_order() {
        let links = Snapshot::new(vec![link("b"), link("a")], SnapshotOrder::NewestFirst, 1);
        let notices = Snapshot::new(
            vec![Notice::new(EntityId::from("n"), "hello", 1.5)],
            SnapshotOrder::NewestFirst,
            2,
        );

        let bundle = ExportBundle::from_snapshots(&links, &notices).expect("export");
        let exported: serde_json::Value =
            serde_json::from_str(&bundle.get(LINKS_FILE).expect("links").contents).expect("json");
        let ids: Vec<&str> = exported
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|item| item["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        let notices_doc = &bundle.get(NOTICES_FILE).expect("notices").contents;
        assert!(notices_doc.contains("\"content\": \"hello\""));
    }

    #[test]
    fn write_to_creates_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let links = Snapshot::new(vec![link("a")], SnapshotOrder::OldestFirst, 1);
        let notices = Snapshot::empty(SnapshotOrder::OldestFirst);

        let written = ExportBundle::from_snapshots(&links, &notices)
            .expect("export")
            .write_to(dir.path())
            .expect("write");
        assert_eq!(written, vec![dir.path().join(LINKS_FILE)]);
    }
}
