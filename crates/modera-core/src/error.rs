//! Error metadata
//!
//! Every stage of the pipeline owns its own `thiserror` enum (storage, frame
//! extraction, analysis, transcription). None of them escape the coordinator;
//! they are logged where they are caught. `ErrorMetadata` lets each error
//! describe how it should be reported so the catch point does not need to know
//! the concrete type.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected outcomes such as unsupported input
    Debug,
    /// Warning level - for remote failures the pipeline recovers from
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error reporting - defines how an error should be logged
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}
