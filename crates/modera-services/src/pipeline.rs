//! Moderation coordinator
//!
//! One run per submitted file:
//!
//! - **Image**: upload, analyze, approve when no moderation flag is raised.
//! - **Video**: upload the video, sample one frame, upload and analyze the
//!   frame, then transcribe the original video only if the frame passed.
//!
//! Every collaborator failure is caught where it happens and folded into the
//! returned [`ModerationResult`] according to the [`Stage`] failure policy.
//! The submitted file and any frame extracted from it are deleted before the
//! run returns.

use crate::cleanup::{scratch_dir, TransientFile};
use modera_core::{
    classify, AnalysisReport, Config, ErrorMetadata, FileKind, LogLevel, ModerationResult,
    RemoteObjectRef, Stage, UnrecognizedFileType,
};
use modera_processing::{detect_media_format, FrameExtractionError, FrameSampler};
use modera_providers::{ContentAnalyzer, TranscriptionRequest, TranscriptionService};
use modera_storage::{object_key, ObjectStore, StorageError};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Remote and local collaborators of the coordinator
#[derive(Clone)]
pub struct Capabilities {
    pub store: Arc<dyn ObjectStore>,
    pub analyzer: Arc<dyn ContentAnalyzer>,
    pub frame_sampler: Arc<dyn FrameSampler>,
    pub transcriber: Arc<dyn TranscriptionService>,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub bucket: String,
    pub image_key_prefix: String,
    pub video_key_prefix: String,
    pub language_code: String,
    pub frame_offset_secs: f64,
    /// Root under which each run gets its own scratch directory
    pub work_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bucket: config.storage.bucket.clone(),
            image_key_prefix: config.storage.image_key_prefix.clone(),
            video_key_prefix: config.storage.video_key_prefix.clone(),
            language_code: config.transcription.language_code.clone(),
            frame_offset_secs: config.frame.offset_secs,
            work_dir: config.frame.work_dir.clone(),
        }
    }
}

/// A moderation running on the tokio runtime
pub struct ModerationHandle {
    cancel: CancellationToken,
    join: JoinHandle<ModerationResult>,
}

impl ModerationHandle {
    /// Token that stops waiting for the transcription job
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to finish. A run that panicked counts as rejected.
    pub async fn join(self) -> ModerationResult {
        match self.join.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Moderation task did not complete");
                ModerationResult::unsupported()
            }
        }
    }
}

#[derive(Clone)]
pub struct ModerationPipeline {
    capabilities: Capabilities,
    settings: PipelineSettings,
}

impl ModerationPipeline {
    pub fn new(capabilities: Capabilities, settings: PipelineSettings) -> Self {
        Self {
            capabilities,
            settings,
        }
    }

    /// Moderate a local file. The file is deleted before this returns.
    pub async fn moderate(&self, file_path: &Path) -> ModerationResult {
        self.moderate_with_cancel(file_path, CancellationToken::new())
            .await
    }

    /// Like [`moderate`](Self::moderate); cancelling `cancel` abandons the
    /// transcription wait, which leaves the transcript empty.
    pub async fn moderate_with_cancel(
        &self,
        file_path: &Path,
        cancel: CancellationToken,
    ) -> ModerationResult {
        let request_id = Uuid::new_v4();
        let _submitted = TransientFile::new(file_path);
        let kind = classify(file_path);

        let span = tracing::info_span!(
            "moderate",
            request_id = %request_id,
            file_kind = %kind
        );

        async move {
            let start = std::time::Instant::now();
            let result = match kind {
                FileKind::Image => self.moderate_image(file_path, request_id).await,
                FileKind::Video => self.moderate_video(file_path, request_id, cancel).await,
                FileKind::Unknown => {
                    log_stage_error(Stage::Classify, &UnrecognizedFileType::new(file_path));
                    ModerationResult::unsupported()
                }
            };

            tracing::info!(
                is_safe = result.is_safe,
                verdict = %result.verdict(),
                hashtag_count = result.hashtags.len(),
                has_transcript = result.transcript.is_some(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Moderation finished"
            );
            result
        }
        .instrument(span)
        .await
    }

    /// Run a moderation in the background
    pub fn spawn(&self, file_path: impl Into<PathBuf>) -> ModerationHandle {
        let cancel = CancellationToken::new();
        let pipeline = self.clone();
        let file_path = file_path.into();
        let token = cancel.clone();
        let join =
            tokio::spawn(async move { pipeline.moderate_with_cancel(&file_path, token).await });
        ModerationHandle { cancel, join }
    }

    async fn moderate_image(&self, path: &Path, request_id: Uuid) -> ModerationResult {
        let object = match self
            .upload(path, &self.settings.image_key_prefix, request_id)
            .await
        {
            Ok(object) => object,
            Err(e) => return fail(Stage::Upload, &e, FileKind::Image),
        };

        let report = match self.capabilities.analyzer.analyze(&object).await {
            Ok(report) => report,
            Err(e) => return fail(Stage::Analyze, &e, FileKind::Image),
        };
        if report.is_flagged() {
            log_flags(&object, &report);
            return ModerationResult::rejected(FileKind::Image);
        }

        log_celebrities(&report);
        ModerationResult::approved(FileKind::Image, report.hashtags(), None)
    }

    async fn moderate_video(
        &self,
        path: &Path,
        request_id: Uuid,
        cancel: CancellationToken,
    ) -> ModerationResult {
        let video = match self
            .upload(path, &self.settings.video_key_prefix, request_id)
            .await
        {
            Ok(object) => object,
            Err(e) => return fail(Stage::Upload, &e, FileKind::Video),
        };

        let scratch = match scratch_dir(&self.settings.work_dir) {
            Ok(dir) => dir,
            Err(e) => {
                let error = FrameExtractionError::WriteFailed {
                    path: self.settings.work_dir.clone(),
                    reason: e.to_string(),
                };
                return fail(Stage::FrameSample, &error, FileKind::Video);
            }
        };

        let frame_path = scratch.path().join(frame_file_name(path));
        let frame = match self
            .capabilities
            .frame_sampler
            .sample_frame(path, self.settings.frame_offset_secs, &frame_path)
            .await
        {
            Ok(frame) => TransientFile::new(frame),
            Err(e) => return fail(Stage::FrameSample, &e, FileKind::Video),
        };

        let frame_object = match self
            .upload(frame.path(), &self.settings.image_key_prefix, request_id)
            .await
        {
            Ok(object) => object,
            Err(e) => return fail(Stage::Upload, &e, FileKind::Video),
        };

        let report = match self.capabilities.analyzer.analyze(&frame_object).await {
            Ok(report) => report,
            Err(e) => return fail(Stage::Analyze, &e, FileKind::Video),
        };
        if report.is_flagged() {
            log_flags(&frame_object, &report);
            return ModerationResult::rejected(FileKind::Video);
        }
        log_celebrities(&report);

        let transcript = self.transcribe(path, video, cancel).await;
        ModerationResult::approved(FileKind::Video, report.hashtags(), transcript)
    }

    async fn upload(
        &self,
        path: &Path,
        namespace: &str,
        request_id: Uuid,
    ) -> Result<RemoteObjectRef, StorageError> {
        let key = object_key(namespace, request_id, path)?;
        self.capabilities
            .store
            .upload(path, &self.settings.bucket, &key)
            .await
    }

    /// Best effort: any failure leaves the transcript empty
    async fn transcribe(
        &self,
        video_path: &Path,
        video: RemoteObjectRef,
        cancel: CancellationToken,
    ) -> Option<String> {
        let mut request = TranscriptionRequest::new(video, self.settings.language_code.clone());
        if let Some(format) = detect_media_format(video_path).await {
            request = request.with_media_format(format);
        }

        match self
            .capabilities
            .transcriber
            .transcribe(request, cancel)
            .await
        {
            Ok(outcome) => outcome.transcript,
            Err(e) => {
                log_stage_error(Stage::Transcribe, &e);
                None
            }
        }
    }
}

/// Name of the extracted still, derived from the video's file stem
fn frame_file_name(video_path: &Path) -> String {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "video".to_string());
    format!("{}_frame.jpg", stem)
}

/// Log a failure of a fail-closed stage and reject the content
fn fail<E>(stage: Stage, error: &E, kind: FileKind) -> ModerationResult
where
    E: ErrorMetadata + Display,
{
    debug_assert!(stage.rejects_on_failure());
    log_stage_error(stage, error);
    ModerationResult::rejected(kind)
}

fn log_stage_error<E>(stage: Stage, error: &E)
where
    E: ErrorMetadata + Display,
{
    let policy = stage.policy();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(
            stage = %stage,
            policy = %policy,
            error_code = code,
            error = %error,
            "Stage failed"
        ),
        LogLevel::Warn => tracing::warn!(
            stage = %stage,
            policy = %policy,
            error_code = code,
            error = %error,
            "Stage failed"
        ),
        LogLevel::Error => tracing::error!(
            stage = %stage,
            policy = %policy,
            error_code = code,
            error = %error,
            "Stage failed"
        ),
    }
}

fn log_flags(object: &RemoteObjectRef, report: &AnalysisReport) {
    let flags: Vec<&str> = report
        .moderation_flags
        .iter()
        .map(|flag| flag.name.as_str())
        .collect();
    tracing::info!(
        bucket = %object.bucket,
        key = %object.key,
        flags = ?flags,
        "Content flagged by moderation"
    );
}

fn log_celebrities(report: &AnalysisReport) {
    for celebrity in &report.celebrities {
        tracing::info!(
            name = %celebrity.name,
            match_confidence = celebrity.match_confidence,
            "Celebrity recognized"
        );
    }
}
