//! AWS Transcribe backend

use super::{
    JobStatus, TranscribeBackend, TranscriptionError, TranscriptionRequest, TranscriptionState,
};
use crate::aws::load_sdk_config;
use async_trait::async_trait;
use aws_sdk_transcribe::error::DisplayErrorContext;
use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat};
use aws_sdk_transcribe::Client as TranscribeClient;
use modera_core::AwsSettings;
use std::fmt::{Debug, Formatter, Result as FmtResult};

pub struct AwsTranscribeBackend {
    client: TranscribeClient,
}

impl Debug for AwsTranscribeBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AwsTranscribeBackend").finish()
    }
}

impl AwsTranscribeBackend {
    pub fn new(client: TranscribeClient) -> Self {
        Self { client }
    }

    /// Create Transcribe client for the configured region
    pub async fn from_settings(aws: &AwsSettings) -> Self {
        let config = load_sdk_config(aws).await;
        Self::new(TranscribeClient::new(&config))
    }
}

/// Map a Transcribe job status string to our lifecycle
fn parse_status(status: &str) -> Option<TranscriptionState> {
    match status {
        "COMPLETED" => Some(TranscriptionState::Completed),
        "FAILED" => Some(TranscriptionState::Failed),
        "IN_PROGRESS" | "QUEUED" => Some(TranscriptionState::InProgress),
        _ => None,
    }
}

#[async_trait]
impl TranscribeBackend for AwsTranscribeBackend {
    async fn start_job(
        &self,
        job_name: &str,
        request: &TranscriptionRequest,
    ) -> Result<(), TranscriptionError> {
        let media = Media::builder()
            .media_file_uri(request.object.uri())
            .build();

        self.client
            .start_transcription_job()
            .transcription_job_name(job_name)
            .language_code(LanguageCode::from(request.language_code.as_str()))
            .media_format(MediaFormat::from(request.media_format.as_str()))
            .media(media)
            .send()
            .await
            .map_err(|e| TranscriptionError::Submission(DisplayErrorContext(e).to_string()))?;

        Ok(())
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatus, TranscriptionError> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| TranscriptionError::Poll(DisplayErrorContext(e).to_string()))?;

        let job = response.transcription_job().ok_or_else(|| {
            TranscriptionError::Poll("Transcription job not found in response".to_string())
        })?;

        let status = job
            .transcription_job_status()
            .map(|s| s.as_str())
            .unwrap_or("UNKNOWN");

        let state = parse_status(status).unwrap_or_else(|| {
            tracing::debug!(
                transcription_job_name = %job_name,
                status = %status,
                "Unrecognized job status, treating as in progress"
            );
            TranscriptionState::InProgress
        });

        Ok(JobStatus {
            state,
            transcript_uri: job
                .transcript()
                .and_then(|t| t.transcript_file_uri())
                .map(|s| s.to_string()),
            failure_reason: job.failure_reason().map(|s| s.to_string()),
        })
    }
}
