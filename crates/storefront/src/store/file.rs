//! Directory-backed cart store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::{CartStore, StoreError};

/// Saves each key as `<dir>/<sanitized key>.json`.
///
/// Writes go to a sibling temporary file that is synced and then renamed over
/// the target, so readers see either the previous blob or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the saved blobs.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Map a storage key onto a portable file stem.
///
/// Keys like `@RocketShoes:cart` carry characters some filesystems reject;
/// anything outside `[A-Za-z0-9_-]` becomes `_`.
fn file_stem(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() { "_".to_string() } else { stem }
}

impl CartStore for FileStore {
    #[instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved cart");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, blob), fields(bytes = blob.len()))]
    async fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(blob.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "Saved cart");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_sanitizes_key() {
        assert_eq!(file_stem("@RocketShoes:cart"), "_RocketShoes_cart");
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
        assert_eq!(file_stem(""), "_");
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load("cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.save("cart", "[1]").await.unwrap();
        store.save("cart", "[2]").await.unwrap();

        assert_eq!(store.load("cart").await.unwrap().as_deref(), Some("[2]"));
        assert!(!store.path_for("cart").with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save("alice", "a").await.unwrap();
        store.save("bob", "b").await.unwrap();

        assert_eq!(store.load("alice").await.unwrap().as_deref(), Some("a"));
        assert_eq!(store.load("bob").await.unwrap().as_deref(), Some("b"));
    }
}
