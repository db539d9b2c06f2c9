//! Object storage abstraction trait
//!
//! This module defines the ObjectStore trait that all storage backends must implement.

use async_trait::async_trait;
use modera_core::{ErrorMetadata, LogLevel, RemoteObjectRef};
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::UploadFailed(_) => "UPLOAD_FAILED",
            StorageError::InvalidKey(_) => "INVALID_STORAGE_KEY",
            StorageError::IoError(_) => "STORAGE_IO_ERROR",
            StorageError::ConfigError(_) => "STORAGE_CONFIG_ERROR",
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            StorageError::UploadFailed(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The pipeline only needs to put local files somewhere the analysis and
/// transcription services can read them. Uploading to an existing key
/// overwrites the object. Implementations do not retry.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file to `bucket` under `key`
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> StorageResult<RemoteObjectRef>;
}
