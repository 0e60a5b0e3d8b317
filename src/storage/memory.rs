//! In-memory storage for tests and single-process deployments.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    public_url, validate_path, BundleStorage, ObjectMetadata, StorageError, StorageResult,
    StoredObject,
};

#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    base_url: String,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

impl InMemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    /// Sorted keys of every stored object
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl BundleStorage for InMemoryStorage {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let key = validate_path(path)?;
        Ok(self.objects.read().contains_key(key))
    }

    async fn read(&self, path: &str) -> StorageResult<StoredObject> {
        let key = validate_path(path)?;
        self.objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })
    }

    async fn write(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> StorageResult<ObjectMetadata> {
        let key = validate_path(path)?;
        let metadata = ObjectMetadata::new(content_type, content_encoding, data.len());
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                data,
                metadata: metadata.clone(),
            },
        );
        Ok(metadata)
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        let key = validate_path(path)?;
        Ok(self.objects.write().remove(key).is_some())
    }

    fn url(&self, path: &str) -> String {
        public_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_and_keys_normalized() {
        let storage = InMemoryStorage::default();
        storage
            .write("/bundles/a.json", b"x".to_vec(), "application/json", None)
            .await
            .unwrap();
        assert!(storage.exists("bundles/a.json").await.unwrap());
        assert_eq!(storage.paths(), vec!["bundles/a.json"]);
        assert_eq!(storage.read("bundles/a.json").await.unwrap().data, b"x");
        assert!(storage.delete("bundles/a.json").await.unwrap());
        assert!(storage.is_empty());
    }
}
