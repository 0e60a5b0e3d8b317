//! Filesystem-backed storage.
//!
//! Objects live under a root directory; metadata sits next to each object in
//! a `<name>.meta.json` sidecar. Writes go to a temporary sibling and are
//! renamed into place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::debug;

use super::{
    public_url, validate_path, BundleStorage, ObjectMetadata, StorageError, StorageResult,
    StoredObject,
};
use crate::constants::bundles::CONTENT_TYPE_JSON;

const METADATA_SUFFIX: &str = ".meta.json";

const TEMP_MARKER: &str = ".tmp-";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sidecars and in-flight temp files; never handed out as objects
pub fn is_internal_key(key: &str) -> bool {
    key.ends_with(METADATA_SUFFIX) || key.contains(TEMP_MARKER)
}

#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    /// `base_url` is where `root` is publicly served from
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let key = validate_path(path)?;
        Ok(self.root.join(key))
    }

    fn sidecar(object: &Path) -> PathBuf {
        let mut name = object.as_os_str().to_owned();
        name.push(METADATA_SUFFIX);
        PathBuf::from(name)
    }

    fn temp_sibling(object: &Path) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = object.as_os_str().to_owned();
        name.push(format!("{TEMP_MARKER}{}-{n}", std::process::id()));
        PathBuf::from(name)
    }

    async fn write_atomic(target: &Path, bytes: &[u8], key: &str) -> StorageResult<()> {
        let temp = Self::temp_sibling(target);
        if let Err(err) = fs::write(&temp, bytes).await {
            return Err(StorageError::io(key, err));
        }
        if let Err(err) = fs::rename(&temp, target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io(key, err));
        }
        Ok(())
    }

    async fn remove_if_present(path: &Path, key: &str) -> StorageResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::io(key, err)),
        }
    }
}

#[async_trait]
impl BundleStorage for LocalFileStorage {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let object = self.resolve(path)?;
        fs::try_exists(&object)
            .await
            .map_err(|err| StorageError::io(path, err))
    }

    async fn read(&self, path: &str) -> StorageResult<StoredObject> {
        let object = self.resolve(path)?;
        let data = match fs::read(&object).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    path: path.to_string(),
                })
            }
            Err(err) => return Err(StorageError::io(path, err)),
        };

        let metadata = match fs::read(Self::sidecar(&object)).await {
            Ok(raw) => serde_json::from_slice::<ObjectMetadata>(&raw).map_err(|err| {
                StorageError::CorruptMetadata {
                    path: path.to_string(),
                    reason: err.to_string(),
                }
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let last_modified = fs::metadata(&object)
                    .await
                    .and_then(|m| m.modified())
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                ObjectMetadata {
                    content_type: CONTENT_TYPE_JSON.to_string(),
                    content_encoding: None,
                    size: data.len() as u64,
                    last_modified,
                }
            }
            Err(err) => return Err(StorageError::io(path, err)),
        };

        Ok(StoredObject { data, metadata })
    }

    async fn write(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> StorageResult<ObjectMetadata> {
        let object = self.resolve(path)?;
        if let Some(parent) = object.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::io(path, err))?;
        }

        let metadata = ObjectMetadata::new(content_type, content_encoding, data.len());
        let sidecar = serde_json::to_vec(&metadata).map_err(|err| StorageError::CorruptMetadata {
            path: path.to_string(),
            reason: err.to_string(),
        })?;

        Self::write_atomic(&Self::sidecar(&object), &sidecar, path).await?;
        Self::write_atomic(&object, &data, path).await?;

        debug!(path = %path, size = data.len(), "Wrote object");
        Ok(metadata)
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        let object = self.resolve(path)?;
        let removed = Self::remove_if_present(&object, path).await?;
        Self::remove_if_present(&Self::sidecar(&object), path).await?;
        Ok(removed)
    }

    fn url(&self, path: &str) -> String {
        public_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "http://localhost:8000");

        let meta = storage
            .write("Firefox/release/en-us/default.json", b"{}".to_vec(), "application/json", Some("br"))
            .await
            .unwrap();
        assert_eq!(meta.size, 2);
        assert!(storage.exists("Firefox/release/en-us/default.json").await.unwrap());

        let object = storage.read("Firefox/release/en-us/default.json").await.unwrap();
        assert_eq!(object.data, b"{}");
        assert_eq!(object.metadata.content_encoding.as_deref(), Some("br"));

        assert!(storage.delete("Firefox/release/en-us/default.json").await.unwrap());
        assert!(!storage.exists("Firefox/release/en-us/default.json").await.unwrap());
        assert!(!storage.delete("Firefox/release/en-us/default.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "http://h");
        storage.write("a.json", b"1".to_vec(), "application/json", None).await.unwrap();
        storage.write("a.json", b"22".to_vec(), "application/json", None).await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.json", "a.json.meta.json"]);
        assert_eq!(storage.read("a.json").await.unwrap().data, b"22");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "http://h");
        assert!(matches!(
            storage.read("missing.json").await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "http://h");
        assert!(matches!(
            storage.write("../x.json", Vec::new(), "application/json", None).await,
            Err(StorageError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_internal_keys() {
        assert!(is_internal_key("bundles/a.json.meta.json"));
        assert!(is_internal_key("bundles/a.json.tmp-42-0"));
        assert!(!is_internal_key("bundles/a.json"));
    }

    #[test]
    fn test_url() {
        let storage = LocalFileStorage::new("/srv/media", "https://cdn.example.com/");
        assert_eq!(
            storage.url("bundles/bundle_ab.json"),
            "https://cdn.example.com/bundles/bundle_ab.json"
        );
    }
}
