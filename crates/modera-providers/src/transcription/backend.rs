use super::{TranscriptionError, TranscriptionRequest, TranscriptionState};
use async_trait::async_trait;

/// Status of a submitted job as reported by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub state: TranscriptionState,
    /// Set once the job has completed
    pub transcript_uri: Option<String>,
    pub failure_reason: Option<String>,
}

impl JobStatus {
    pub fn in_progress() -> Self {
        Self {
            state: TranscriptionState::InProgress,
            transcript_uri: None,
            failure_reason: None,
        }
    }

    pub fn completed(transcript_uri: impl Into<String>) -> Self {
        Self {
            state: TranscriptionState::Completed,
            transcript_uri: Some(transcript_uri.into()),
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            state: TranscriptionState::Failed,
            transcript_uri: None,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Remote speech-to-text job API
///
/// Implementations do not retry; the poller owns retry and timeout policy.
#[async_trait]
pub trait TranscribeBackend: Send + Sync {
    /// Submit a job. Errors are `TranscriptionError::Submission`.
    async fn start_job(
        &self,
        job_name: &str,
        request: &TranscriptionRequest,
    ) -> Result<(), TranscriptionError>;

    /// Query a job. Errors are `TranscriptionError::Poll`.
    async fn job_status(&self, job_name: &str) -> Result<JobStatus, TranscriptionError>;
}
