//! # Bundle Storage
//!
//! Durable object storage for bundle artifacts. Objects are written whole
//! and atomically; readers never observe a partially written bundle.
//! Each object carries the content type and encoding it was written with so
//! consumers can decode it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod local;
pub mod memory;

pub use local::{is_internal_key, LocalFileStorage};
pub use memory::InMemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {path}")]
    NotFound { path: String },

    #[error("Invalid object path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt object metadata for '{path}': {reason}")]
    CorruptMetadata { path: String, reason: String },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Metadata recorded alongside every object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    /// `Some("br")` for Brotli-compressed artifacts
    pub content_encoding: Option<String>,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl ObjectMetadata {
    pub fn new(content_type: &str, content_encoding: Option<&str>, size: usize) -> Self {
        Self {
            content_type: content_type.to_string(),
            content_encoding: content_encoding.map(str::to_string),
            size: size as u64,
            last_modified: Utc::now(),
        }
    }
}

/// Object bytes with their metadata
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub metadata: ObjectMetadata,
}

/// Storage contract for bundle artifacts.
///
/// Paths are relative, `/`-separated keys such as
/// `bundles-pregen/Firefox/release/en-us/default.json`.
#[async_trait]
pub trait BundleStorage: Send + Sync + 'static {
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Read an object. Returns `StorageError::NotFound` when absent.
    async fn read(&self, path: &str) -> StorageResult<StoredObject>;

    /// Replace the object at `path` in one step.
    async fn write(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> StorageResult<ObjectMetadata>;

    /// Remove an object. Returns whether something was deleted.
    async fn delete(&self, path: &str) -> StorageResult<bool>;

    /// Public URL clients are redirected to
    fn url(&self, path: &str) -> String;
}

/// Join a base URL and an object key with exactly one `/`
pub fn public_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Reject keys that could escape the storage root
pub(crate) fn validate_path(path: &str) -> StorageResult<&str> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(StorageError::InvalidPath {
            path: path.to_string(),
            reason: "empty key".to_string(),
        });
    }
    if trimmed.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(StorageError::InvalidPath {
            path: path.to_string(),
            reason: "relative segments are not allowed".to_string(),
        });
    }
    if trimmed.contains('\\') || trimmed.contains('\0') {
        return Err(StorageError::InvalidPath {
            path: path.to_string(),
            reason: "illegal character".to_string(),
        });
    }
    Ok(trimmed)
}
