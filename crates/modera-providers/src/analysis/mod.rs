//! Image content analysis

#[cfg(feature = "aws-rekognition")]
mod rekognition;

#[cfg(feature = "aws-rekognition")]
pub use rekognition::RekognitionAnalyzer;

use async_trait::async_trait;
use modera_core::{AnalysisReport, ErrorMetadata, LogLevel, RemoteObjectRef};
use thiserror::Error;

/// Analysis errors
///
/// A failed moderation call is an error, never an empty flag list.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Label detection failed: {0}")]
    Labels(String),

    #[error("Moderation check failed: {0}")]
    Moderation(String),

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),
}

impl ErrorMetadata for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            AnalysisError::Labels(_) => "LABEL_DETECTION_FAILED",
            AnalysisError::Moderation(_) => "MODERATION_CHECK_FAILED",
            AnalysisError::MalformedResponse(_) => "MALFORMED_ANALYSIS_RESPONSE",
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AnalysisError::MalformedResponse(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

/// Describes and moderates an image that has already been uploaded.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, object: &RemoteObjectRef) -> Result<AnalysisReport, AnalysisError>;
}
