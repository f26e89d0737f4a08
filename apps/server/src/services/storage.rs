//! JSON file storage for the catalog and review history.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use srs_core::{CatalogItem, EngineError, ScheduleStore};
use thiserror::Error;

const CATALOG_FILE: &str = "catalog.json";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid history file: {0}")]
    History(#[from] EngineError),
    #[error("Invalid catalog file: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// Reads and writes the data directory.
///
/// Layout:
/// - `catalog.json`: array of `{ "id": 1, "content": "학교" }` items
/// - `history.json`: review history keyed by item key
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    /// Load the catalog. A missing file is an empty catalog.
    pub async fn load_catalog(&self) -> Result<Vec<CatalogItem>, StorageError> {
        match tokio::fs::read_to_string(self.catalog_path()).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the review history. A missing file is an empty store; corrupt
    /// entries are repaired on load.
    pub async fn load_history(&self) -> Result<ScheduleStore, StorageError> {
        match tokio::fs::read_to_string(self.history_path()).await {
            Ok(json) => Ok(ScheduleStore::from_json(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ScheduleStore::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the history snapshot.
    ///
    /// Writes to a sibling temp file and renames it over `history.json`, so a
    /// crash mid-write leaves the previous snapshot intact.
    pub async fn save_history(&self, store: &ScheduleStore) -> Result<(), StorageError> {
        let json = store.to_json()?;

        tokio::fs::create_dir_all(&self.data_dir).await?;
        let target = self.history_path();
        let temp = target.with_extension("json.tmp");
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &target).await?;

        tracing::debug!(entries = store.len(), path = %target.display(), "saved review history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use srs_core::{ItemKey, ReviewHistory};

    #[tokio::test]
    async fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(storage.load_catalog().await.unwrap().is_empty());
        assert!(storage.load_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        let store = ScheduleStore::from_entries([(
            ItemKey::from_id(4),
            ReviewHistory {
                attempts: 3,
                correct: 2,
                ..Default::default()
            },
        )]);

        storage.save_history(&store).await.unwrap();

        assert_eq!(storage.load_history().await.unwrap(), store);
        assert!(!storage.history_path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn catalog_is_read_from_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(
            storage.catalog_path(),
            r#"[{ "id": 1, "content": "학교" }, { "content": "바다" }]"#,
        )
        .unwrap();

        let catalog = storage.load_catalog().await.unwrap();
        assert_eq!(
            catalog,
            vec![
                CatalogItem::new(Some(1), "학교"),
                CatalogItem::new(None, "바다"),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.catalog_path(), "{ not json").unwrap();

        assert!(matches!(
            storage.load_catalog().await,
            Err(StorageError::Catalog(_))
        ));
    }

    #[tokio::test]
    async fn damaged_history_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(
            storage.history_path(),
            r#"{
                "1": { "attempts": 2, "correct": 1,
                       "schedule": { "interval": 6, "repetitions": 2, "ease_factor": null } },
                "2": { "attempts": 1, "correct": 1 }
            }"#,
        )
        .unwrap();

        let store = storage.load_history().await.unwrap();
        assert_eq!(store.len(), 2);
        let schedule = store.get(&ItemKey::from_id(1)).unwrap().schedule.clone().unwrap();
        assert_eq!(schedule.ease_factor, 2.5);
    }
}
