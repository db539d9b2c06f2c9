//! Modera Storage Library
//!
//! This crate provides the object storage abstraction used by the moderation
//! pipeline and its S3 implementation.
//!
//! # Object key format
//!
//! Keys are `{namespace}/{request_id}/{file_name}`. The request id is generated
//! once per moderation run so two submissions of the same file name never share
//! a remote object. Keys must not contain a `.` or `..` segment or a leading `/`. Key generation
//! is centralized in the `keys` module.

pub mod keys;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use keys::{object_key, validate_key};
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStore;
pub use traits::{ObjectStore, StorageError, StorageResult};
