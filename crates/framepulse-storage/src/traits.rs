//! Storage abstraction trait
//!
//! This module defines the FileStore trait that all storage backends must
//! implement.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends must implement this trait. The ingestion service and
/// the extraction orchestrator work against it without coupling to a
/// specific backend.
///
/// **Key format:** keys are relative paths (`videos/{filename}`,
/// `frames/{filename}`); backends must reject keys that escape their root.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write a file under the given key, overwriting any existing content.
    /// Returns the publicly accessible URL for the file.
    async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Read a file's bytes by its storage key.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing file is not an
    /// error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
