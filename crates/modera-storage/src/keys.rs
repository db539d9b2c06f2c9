//! Shared key generation for storage backends.
//!
//! Key format: `{namespace}/{request_id}/{file_name}`.

use std::path::Path;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Generate the object key for a local file uploaded during one moderation run.
///
/// Only the base name of `local_path` is used.
pub fn object_key(namespace: &str, request_id: Uuid, local_path: &Path) -> StorageResult<String> {
    let file_name = local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            StorageError::InvalidKey(format!("{} has no file name", local_path.display()))
        })?;

    let namespace = namespace.trim_matches('/');
    let key = if namespace.is_empty() {
        format!("{}/{}", request_id, file_name)
    } else {
        format!("{}/{}/{}", namespace, request_id, file_name)
    };

    validate_key(&key)?;
    Ok(key)
}

/// Reject keys that could escape their namespace.
///
/// Only whole `.` or `..` segments count; dots inside a file name are fine.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    let traversal = key
        .split('/')
        .any(|segment| segment == ".." || segment == ".");
    if key.starts_with('/') || traversal {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}
