//! Modera Core Library
//!
//! This crate provides the domain models, file classification, failure policy,
//! configuration and error metadata shared by all Modera components.

pub mod config;
pub mod constants;
pub mod error;
pub mod file_kind;
pub mod media_format;
pub mod models;
pub mod policy;

// Re-export commonly used types
pub use config::{
    AnalysisSettings, AwsSettings, Config, FrameSamplerKind, FrameSettings, StorageSettings,
    TranscriptionSettings,
};
pub use error::{ErrorMetadata, LogLevel};
pub use file_kind::{classify, content_type_for, FileKind, UnrecognizedFileType};
pub use media_format::MediaFormat;
pub use models::{
    AnalysisReport, Celebrity, Label, ModerationFlag, ModerationResult, RemoteObjectRef, Verdict,
};
pub use policy::{FailurePolicy, Stage};
