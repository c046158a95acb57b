//! File-backed persistence.
//!
//! All keys live in one JSON object file. Every write rewrites the whole
//! file through a sibling temp file and a rename, so a crash mid-write leaves
//! the previous contents in place. A file that cannot be parsed is reported
//! by reads and replaced by the next write.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::warn;

use super::{Persistence, PersistenceError};

type Entries = BTreeMap<String, String>;

/// Persistence backed by a single JSON file.
///
/// A missing file reads as an empty store. Access from this handle is
/// serialized; separate handles on the same path are not coordinated.
#[derive(Debug)]
pub struct FilePersistence {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePersistence {
    /// Create a backend for the file at `path`. The file is not touched
    /// until the first read or write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, PersistenceError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            PersistenceError::Corrupt(format!("{}: {e}", self.path.display()))
        })
    }

    /// Entries to start a write from. An unparseable file is discarded.
    async fn entries_for_write(&self) -> Result<(Entries, bool), PersistenceError> {
        match self.read_entries().await {
            Ok(entries) => Ok((entries, false)),
            Err(PersistenceError::Corrupt(reason)) => {
                warn!(%reason, "Overwriting corrupt store file");
                Ok((Entries::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Persistence for FilePersistence {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let (mut entries, _) = self.entries_for_write().await?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let (mut entries, discarded) = self.entries_for_write().await?;
        if entries.remove(key).is_some() || discarded {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::new(dir.path().join("cart.json"));
        assert_eq!(store.get("products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.json");

        FilePersistence::new(&path)
            .set("products", "[]")
            .await
            .unwrap();

        let reopened = FilePersistence::new(&path);
        assert_eq!(
            reopened.get("products").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(!dir.path().join("nested").join("cart.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::new(dir.path().join("cart.json"));
        store.set("products", "[]").await.unwrap();
        store.set("theme", "dark").await.unwrap();

        store.remove("products").await.unwrap();

        assert_eq!(store.get("products").await.unwrap(), None);
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        let store = FilePersistence::new(&path);
        store.set("products", "[]").await.unwrap();

        store.clear().await.unwrap();
        assert!(!path.exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FilePersistence::new(&path);
        assert!(matches!(
            store.get("products").await,
            Err(PersistenceError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_set_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        tokio::fs::write(&path, r#"{"products": [tru"#).await.unwrap();

        let store = FilePersistence::new(&path);
        store.set("products", "[]").await.unwrap();

        assert_eq!(store.get("products").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_remove_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        tokio::fs::write(&path, r#"{"products": [tru"#).await.unwrap();

        let store = FilePersistence::new(&path);
        store.remove("products").await.unwrap();

        assert_eq!(store.get("products").await.unwrap(), None);
    }
}
