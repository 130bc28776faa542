//! Deck source backed by a directory of `*.json` deck files.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flash_core::model::DeckDraft;
use walkdir::WalkDir;

use crate::repository::{DeckSource, SourcedDeck, StorageError, in_scope};

/// Reads deck drafts from JSON files below `root`.
///
/// A deck's `path` is its location relative to `root` with `/` separators,
/// so scopes are sub-folders of `root`.
#[derive(Debug, Clone)]
pub struct JsonDeckDirectory {
    root: PathBuf,
}

impl JsonDeckDirectory {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DeckSource for JsonDeckDirectory {
    async fn load_decks(&self, scope: &str) -> Result<Vec<SourcedDeck>, StorageError> {
        let root = self.root.clone();
        let scope = scope.to_owned();
        tokio::task::spawn_blocking(move || scan(&root, &scope))
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
    }
}

fn scan(root: &Path, scope: &str) -> Result<Vec<SourcedDeck>, StorageError> {
    if !root.is_dir() {
        return Err(StorageError::NotFound);
    }

    let mut decks = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable deck directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.path().extension().is_none_or(|ext| ext != "json")
        {
            continue;
        }

        let relative = relative_path(root, entry.path());
        if !in_scope(&relative, scope) {
            continue;
        }
        decks.push(read_deck(entry.path(), relative));
    }
    Ok(decks)
}

fn read_deck(file: &Path, relative: String) -> SourcedDeck {
    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            return SourcedDeck::Unreadable {
                path: relative,
                reason: e.to_string(),
            };
        }
    };

    match serde_json::from_str::<DeckDraft>(&text) {
        Ok(mut draft) => {
            draft.path = relative;
            SourcedDeck::Parsed(draft)
        }
        Err(e) => SourcedDeck::Unreadable {
            path: relative,
            reason: format!("invalid deck file: {e}"),
        },
    }
}

fn relative_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, body: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    const NET: &str = r#"{
        "id": "net",
        "title": "Networking",
        "unit": "Unit 1",
        "cards": [
            { "question": "What is TCP?", "answer": "A transport protocol" },
            { "id": "udp", "question": "What is UDP?", "answer": "A datagram protocol" }
        ]
    }"#;

    #[tokio::test]
    async fn reads_json_decks_with_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "unit-1/net.json", NET);
        write(dir.path(), "unit-1/notes.md", "# not a deck");

        let source = JsonDeckDirectory::new(dir.path());
        let decks = source.load_decks("").await.unwrap();

        assert_eq!(decks.len(), 1);
        let SourcedDeck::Parsed(draft) = &decks[0] else {
            panic!("expected parsed deck, got {decks:?}");
        };
        assert_eq!(draft.path, "unit-1/net.json");
        assert_eq!(draft.cards.len(), 2);
        assert_eq!(draft.cards[1].id.as_deref(), Some("udp"));
    }

    #[tokio::test]
    async fn broken_files_are_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "unit-1/net.json", NET);
        write(dir.path(), "unit-1/broken.json", "{ \"title\": ");

        let source = JsonDeckDirectory::new(dir.path());
        let decks = source.load_decks("unit-1").await.unwrap();

        assert_eq!(decks.len(), 2);
        assert!(decks.iter().any(|d| matches!(
            d,
            SourcedDeck::Unreadable { path, .. } if path == "unit-1/broken.json"
        )));
    }

    #[tokio::test]
    async fn scope_limits_to_sub_folder() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "unit-1/net.json", NET);
        write(dir.path(), "unit-2/os.json", NET);

        let source = JsonDeckDirectory::new(dir.path());
        assert_eq!(source.load_decks("unit-2").await.unwrap().len(), 1);
        assert_eq!(source.load_decks("unit-3").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_root_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonDeckDirectory::new(dir.path().join("nope"));
        assert!(matches!(
            source.load_decks("").await,
            Err(StorageError::NotFound)
        ));
    }
}
