//! Speech transcription of uploaded videos
//!
//! A job moves `NotStarted -> InProgress -> {Completed, Failed}`. Submission and
//! status queries go through a [`TranscribeBackend`]; the [`TranscriptionPoller`]
//! drives the job to a terminal state and downloads the transcript.

#[cfg(feature = "aws-transcribe")]
mod aws;
mod backend;
pub mod document;
mod job;
mod poller;

#[cfg(feature = "aws-transcribe")]
pub use aws::AwsTranscribeBackend;
pub use backend::{JobStatus, TranscribeBackend};
pub use job::{job_name, TranscriptionRequest, TranscriptionState};
pub use poller::{TranscriptionOutcome, TranscriptionPoller, TranscriptionService};

use modera_core::{ErrorMetadata, LogLevel};
use thiserror::Error;

/// Transcription errors
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Failed to start transcription job: {0}")]
    Submission(String),

    #[error("Failed to get transcription job status: {0}")]
    Poll(String),

    #[error("Transcription job {job_name} still running after {waited_secs}s")]
    PollTimeout { job_name: String, waited_secs: u64 },

    #[error("Failed to fetch transcript: {0}")]
    Fetch(String),

    #[error("Transcription of job {job_name} was cancelled")]
    Cancelled { job_name: String },
}

impl ErrorMetadata for TranscriptionError {
    fn error_code(&self) -> &'static str {
        match self {
            TranscriptionError::Submission(_) => "TRANSCRIPTION_SUBMISSION_FAILED",
            TranscriptionError::Poll(_) => "TRANSCRIPTION_POLL_FAILED",
            TranscriptionError::PollTimeout { .. } => "TRANSCRIPTION_TIMEOUT",
            TranscriptionError::Fetch(_) => "TRANSCRIPT_FETCH_FAILED",
            TranscriptionError::Cancelled { .. } => "TRANSCRIPTION_CANCELLED",
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            TranscriptionError::Cancelled { .. } => LogLevel::Debug,
            _ => LogLevel::Warn,
        }
    }
}
