use super::document::TranscriptDocument;
use super::{
    job_name, JobStatus, TranscribeBackend, TranscriptionError, TranscriptionRequest,
    TranscriptionState,
};
use async_trait::async_trait;
use chrono::Utc;
use modera_core::{ErrorMetadata, TranscriptionSettings};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Result of driving one job to a terminal state
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionOutcome {
    pub job_name: String,
    pub state: TranscriptionState,
    /// `None` when the job failed or its transcript could not be fetched
    pub transcript: Option<String>,
}

/// Transcribes a remote media object.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Submit a job and wait for it to finish.
    ///
    /// A failed job or an unreadable transcript is an `Ok` outcome without
    /// text. Errors are submission failures, exhausted poll retries, the
    /// maximum wait elapsing and cancellation.
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
        cancel: CancellationToken,
    ) -> Result<TranscriptionOutcome, TranscriptionError>;
}

/// Polls a [`TranscribeBackend`] at a fixed interval
pub struct TranscriptionPoller {
    backend: Arc<dyn TranscribeBackend>,
    http_client: reqwest::Client,
    poll_interval: Duration,
    max_wait: Duration,
    max_poll_errors: u32,
}

impl TranscriptionPoller {
    pub fn new(
        backend: Arc<dyn TranscribeBackend>,
        http_client: reqwest::Client,
        poll_interval: Duration,
        max_wait: Duration,
        max_poll_errors: u32,
    ) -> Self {
        Self {
            backend,
            http_client,
            poll_interval,
            max_wait,
            max_poll_errors: max_poll_errors.max(1),
        }
    }

    pub fn from_settings(
        backend: Arc<dyn TranscribeBackend>,
        settings: &TranscriptionSettings,
    ) -> Result<Self, TranscriptionError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                TranscriptionError::Fetch(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self::new(
            backend,
            http_client,
            settings.poll_interval,
            settings.max_wait,
            settings.max_poll_errors,
        ))
    }

    /// Query until the job reaches a terminal state.
    ///
    /// Consecutive query failures are tolerated up to `max_poll_errors`; a
    /// successful query resets the count.
    async fn poll_until_done(&self, job_name: &str) -> Result<JobStatus, TranscriptionError> {
        let mut consecutive_errors = 0;

        loop {
            match self.backend.job_status(job_name).await {
                Ok(status) if status.state.is_terminal() => return Ok(status),
                Ok(_) => consecutive_errors = 0,
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        transcription_job_name = %job_name,
                        error = %e,
                        attempt = consecutive_errors,
                        max_attempts = self.max_poll_errors,
                        "Transcription status query failed"
                    );
                    if consecutive_errors >= self.max_poll_errors {
                        return Err(e);
                    }
                }
            }

            sleep(self.poll_interval).await;
        }
    }

    /// Download the transcript JSON and return its first segment
    async fn fetch_transcript(&self, uri: &str) -> Result<Option<String>, TranscriptionError> {
        let response = self
            .http_client
            .get(uri)
            .send()
            .await
            .map_err(|e| {
                TranscriptionError::Fetch(format!("Failed to download transcript: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(TranscriptionError::Fetch(format!(
                "Failed to download transcript: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                TranscriptionError::Fetch(format!("Failed to read transcript: {}", e))
            })?;

        Ok(TranscriptDocument::parse(&body)?.into_first_transcript())
    }

    async fn completed_outcome(&self, job_name: String, status: JobStatus) -> TranscriptionOutcome {
        let fetched = match status.transcript_uri.as_deref() {
            Some(uri) => self.fetch_transcript(uri).await,
            None => Err(TranscriptionError::Fetch(
                "Completed job has no transcript URI".to_string(),
            )),
        };

        let transcript = match fetched {
            Ok(transcript) => {
                tracing::info!(
                    transcription_job_name = %job_name,
                    text_length = transcript.as_ref().map(|t| t.len()).unwrap_or(0),
                    "Transcription completed successfully"
                );
                transcript
            }
            Err(e) => {
                tracing::warn!(
                    transcription_job_name = %job_name,
                    error = %e,
                    error_code = e.error_code(),
                    "Transcription completed but transcript is unavailable"
                );
                None
            }
        };

        TranscriptionOutcome {
            job_name,
            state: TranscriptionState::Completed,
            transcript,
        }
    }

    /// Submit, poll under the maximum wait, then fetch the transcript.
    async fn run_job(
        &self,
        job_name: String,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionOutcome, TranscriptionError> {
        let start = std::time::Instant::now();

        tracing::info!(
            transcription_job_name = %job_name,
            s3_uri = %request.object.uri(),
            media_format = %request.media_format,
            language_code = %request.language_code,
            "Starting transcription job"
        );

        self.backend.start_job(&job_name, &request).await?;

        let status = tokio::time::timeout(self.max_wait, self.poll_until_done(&job_name))
            .await
            .map_err(|_| TranscriptionError::PollTimeout {
                job_name: job_name.clone(),
                waited_secs: self.max_wait.as_secs(),
            })??;

        tracing::debug!(
            transcription_job_name = %job_name,
            state = %status.state,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Transcription job finished"
        );

        match status.state {
            TranscriptionState::Completed => Ok(self.completed_outcome(job_name, status).await),
            _ => {
                tracing::warn!(
                    transcription_job_name = %job_name,
                    failure_reason = status.failure_reason.as_deref().unwrap_or("Unknown error"),
                    "Transcription job failed"
                );
                Ok(TranscriptionOutcome {
                    job_name,
                    state: TranscriptionState::Failed,
                    transcript: None,
                })
            }
        }
    }
}

#[async_trait]
impl TranscriptionService for TranscriptionPoller {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
        cancel: CancellationToken,
    ) -> Result<TranscriptionOutcome, TranscriptionError> {
        let job_name = job_name(Utc::now());

        tokio::select! {
            _ = cancel.cancelled() => {
                Err(TranscriptionError::Cancelled {
                    job_name: job_name.clone(),
                })
            }
            outcome = self.run_job(job_name.clone(), request) => outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modera_core::RemoteObjectRef;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend returning scripted statuses; the last entry repeats forever
    struct ScriptedBackend {
        start_error: bool,
        statuses: Mutex<VecDeque<Result<JobStatus, TranscriptionError>>>,
        started: Mutex<Vec<(String, TranscriptionRequest)>>,
        polls: Mutex<u32>,
    }

    impl ScriptedBackend {
        fn new(statuses: Vec<Result<JobStatus, TranscriptionError>>) -> Arc<Self> {
            Arc::new(Self {
                start_error: false,
                statuses: Mutex::new(statuses.into()),
                started: Mutex::new(Vec::new()),
                polls: Mutex::new(0),
            })
        }

        fn failing_submission() -> Arc<Self> {
            Arc::new(Self {
                start_error: true,
                statuses: Mutex::new(VecDeque::new()),
                started: Mutex::new(Vec::new()),
                polls: Mutex::new(0),
            })
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }
    }

    fn clone_status(
        status: &Result<JobStatus, TranscriptionError>,
    ) -> Result<JobStatus, TranscriptionError> {
        match status {
            Ok(s) => Ok(s.clone()),
            Err(e) => Err(TranscriptionError::Poll(e.to_string())),
        }
    }

    #[async_trait]
    impl TranscribeBackend for ScriptedBackend {
        async fn start_job(
            &self,
            job_name: &str,
            request: &TranscriptionRequest,
        ) -> Result<(), TranscriptionError> {
            if self.start_error {
                return Err(TranscriptionError::Submission("access denied".to_string()));
            }
            self.started
                .lock()
                .unwrap()
                .push((job_name.to_string(), request.clone()));
            Ok(())
        }

        async fn job_status(&self, _job_name: &str) -> Result<JobStatus, TranscriptionError> {
            *self.polls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                clone_status(statuses.front().unwrap())
            }
        }
    }

    fn poller(backend: Arc<ScriptedBackend>, max_wait: Duration) -> TranscriptionPoller {
        TranscriptionPoller::new(
            backend,
            reqwest::Client::new(),
            Duration::from_millis(5),
            max_wait,
            3,
        )
    }

    fn request() -> TranscriptionRequest {
        TranscriptionRequest::new(
            RemoteObjectRef::new("bucket", "uploaded_videos/a/clip.mp4"),
            "fr-FR",
        )
    }

    #[tokio::test]
    async fn completed_job_returns_first_transcript() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/transcripts/job.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results":{"transcripts":[{"transcript":"Bonjour"}]}}"#)
            .create_async()
            .await;

        let backend = ScriptedBackend::new(vec![
            Ok(JobStatus::in_progress()),
            Ok(JobStatus::in_progress()),
            Ok(JobStatus::completed(format!("{}/transcripts/job.json", server.url()))),
        ]);
        let outcome = poller(backend.clone(), Duration::from_secs(5))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(outcome.state, TranscriptionState::Completed);
        assert_eq!(outcome.transcript.as_deref(), Some("Bonjour"));
        assert_eq!(backend.polls(), 3);

        let started = backend.started.lock().unwrap();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].0, outcome.job_name);
        assert_eq!(started[0].1.object.key, "uploaded_videos/a/clip.mp4");
    }

    #[tokio::test]
    async fn unreadable_transcript_is_completed_without_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.json")
            .with_status(403)
            .create_async()
            .await;

        let backend = ScriptedBackend::new(vec![Ok(JobStatus::completed(format!(
            "{}/missing.json",
            server.url()
        )))]);
        let outcome = poller(backend, Duration::from_secs(5))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.state, TranscriptionState::Completed);
        assert_eq!(outcome.transcript, None);
    }

    #[tokio::test]
    async fn malformed_transcript_is_completed_without_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/bad.json")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let backend = ScriptedBackend::new(vec![Ok(JobStatus::completed(format!(
            "{}/bad.json",
            server.url()
        )))]);
        let outcome = poller(backend, Duration::from_secs(5))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.state, TranscriptionState::Completed);
        assert_eq!(outcome.transcript, None);
    }

    #[tokio::test]
    async fn failed_job_has_no_transcript() {
        let backend = ScriptedBackend::new(vec![Ok(JobStatus::failed("unsupported codec"))]);
        let outcome = poller(backend, Duration::from_secs(5))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.state, TranscriptionState::Failed);
        assert_eq!(outcome.transcript, None);
    }

    #[tokio::test]
    async fn submission_failure_is_not_retried() {
        let backend = ScriptedBackend::failing_submission();
        let err = poller(backend.clone(), Duration::from_secs(5))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranscriptionError::Submission(_)));
        assert_eq!(backend.polls(), 0);
    }

    #[tokio::test]
    async fn transient_poll_errors_are_retried() {
        let backend = ScriptedBackend::new(vec![
            Err(TranscriptionError::Poll("throttled".to_string())),
            Err(TranscriptionError::Poll("throttled".to_string())),
            Ok(JobStatus::failed("bad media")),
        ]);
        let outcome = poller(backend.clone(), Duration::from_secs(5))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.state, TranscriptionState::Failed);
        assert_eq!(backend.polls(), 3);
    }

    #[tokio::test]
    async fn consecutive_poll_errors_exhaust_budget() {
        let backend = ScriptedBackend::new(vec![Err(TranscriptionError::Poll(
            "service unavailable".to_string(),
        ))]);
        let err = poller(backend.clone(), Duration::from_secs(5))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranscriptionError::Poll(_)));
        assert_eq!(backend.polls(), 3);
    }

    #[tokio::test]
    async fn long_running_job_times_out() {
        let backend = ScriptedBackend::new(vec![Ok(JobStatus::in_progress())]);
        let err = poller(backend, Duration::from_millis(50))
            .transcribe(request(), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranscriptionError::PollTimeout { .. }));
    }

    /// Backend whose submission never returns
    struct StalledSubmission;

    #[async_trait]
    impl TranscribeBackend for StalledSubmission {
        async fn start_job(
            &self,
            _job_name: &str,
            _request: &TranscriptionRequest,
        ) -> Result<(), TranscriptionError> {
            std::future::pending().await
        }

        async fn job_status(&self, _job_name: &str) -> Result<JobStatus, TranscriptionError> {
            Ok(JobStatus::in_progress())
        }
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_stalled_submission() {
        let poller = TranscriptionPoller::new(
            Arc::new(StalledSubmission),
            reqwest::Client::new(),
            Duration::from_millis(5),
            Duration::from_secs(30),
            3,
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let transcription = poller.transcribe(request(), cancel);
        let err = tokio::time::timeout(Duration::from_secs(5), transcription)
            .await
            .expect("cancellation should end the submission wait")
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn cancellation_stops_polling() {
        let backend = ScriptedBackend::new(vec![Ok(JobStatus::in_progress())]);
        let cancel = CancellationToken::new();
        let poller = poller(backend, Duration::from_secs(30));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = poller.transcribe(request(), cancel).await.unwrap_err();
        assert!(matches!(err, TranscriptionError::Cancelled { .. }));
    }
}
