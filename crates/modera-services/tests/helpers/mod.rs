//! In-memory capabilities for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use modera_core::{AnalysisReport, Celebrity, Label, ModerationFlag, RemoteObjectRef};
use modera_processing::{FrameExtractionError, FrameResult, FrameSampler};
use modera_providers::{
    AnalysisError, ContentAnalyzer, TranscriptionError, TranscriptionOutcome,
    TranscriptionRequest, TranscriptionService, TranscriptionState,
};
use modera_services::{Capabilities, ModerationPipeline, PipelineSettings};
use modera_storage::{ObjectStore, StorageError, StorageResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const BUCKET: &str = "moderation-test";

/// Ordered record of collaborator calls shared by all fakes
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Event names without their arguments
    pub fn names(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .map(|e| e.split(':').next().unwrap_or_default().to_string())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub local_path: PathBuf,
    pub bucket: String,
    pub key: String,
    pub contents: Vec<u8>,
}

/// Which uploads the fake store refuses
#[derive(Clone, Copy)]
pub enum UploadFailure {
    Never,
    Always,
    /// Only the n-th upload of the run, counting from 1
    At(usize),
}

pub struct FakeStore {
    events: Events,
    failure: UploadFailure,
    attempts: Mutex<usize>,
    pub uploads: Mutex<Vec<UploadRecord>>,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> StorageResult<RemoteObjectRef> {
        self.events.push(format!("upload:{}", key));
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        let fail = match self.failure {
            UploadFailure::Never => false,
            UploadFailure::Always => true,
            UploadFailure::At(n) => n == attempt,
        };
        if fail {
            return Err(StorageError::UploadFailed("connection reset".to_string()));
        }
        let contents = std::fs::read(local_path)
            .map_err(|e| StorageError::UploadFailed(format!("local file unreadable: {}", e)))?;
        self.uploads.lock().unwrap().push(UploadRecord {
            local_path: local_path.to_path_buf(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            contents,
        });
        Ok(RemoteObjectRef::new(bucket, key))
    }
}

#[derive(Clone)]
pub enum AnalysisScript {
    Report(AnalysisReport),
    Fail,
}

pub struct FakeAnalyzer {
    events: Events,
    script: AnalysisScript,
    pub calls: Mutex<Vec<RemoteObjectRef>>,
}

#[async_trait]
impl ContentAnalyzer for FakeAnalyzer {
    async fn analyze(&self, object: &RemoteObjectRef) -> Result<AnalysisReport, AnalysisError> {
        self.events.push(format!("analyze:{}", object.key));
        self.calls.lock().unwrap().push(object.clone());
        match &self.script {
            AnalysisScript::Report(report) => Ok(report.clone()),
            AnalysisScript::Fail => Err(AnalysisError::Moderation("throttled".to_string())),
        }
    }
}

pub struct FakeFrameSampler {
    events: Events,
    fail: bool,
    pub calls: Mutex<Vec<(PathBuf, f64)>>,
}

#[async_trait]
impl FrameSampler for FakeFrameSampler {
    async fn sample_frame(
        &self,
        video_path: &Path,
        at_seconds: f64,
        output_path: &Path,
    ) -> FrameResult<PathBuf> {
        self.events.push(format!("sample_frame:{}", at_seconds));
        self.calls
            .lock()
            .unwrap()
            .push((video_path.to_path_buf(), at_seconds));
        if self.fail {
            return Err(FrameExtractionError::NoFrameAvailable { at_seconds });
        }
        std::fs::write(output_path, b"\xff\xd8\xff\xe0 frame").map_err(|e| {
            FrameExtractionError::WriteFailed {
                path: output_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Ok(output_path.to_path_buf())
    }
}

#[derive(Clone)]
pub enum TranscriptionScript {
    Transcript(Option<String>),
    JobFailed,
    SubmissionFails,
    TimesOut,
    WaitForCancel,
}

pub struct FakeTranscriber {
    events: Events,
    script: TranscriptionScript,
    pub requests: Mutex<Vec<TranscriptionRequest>>,
}

#[async_trait]
impl TranscriptionService for FakeTranscriber {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
        cancel: CancellationToken,
    ) -> Result<TranscriptionOutcome, TranscriptionError> {
        self.events.push(format!("transcribe:{}", request.object.key));
        self.requests.lock().unwrap().push(request);
        let job_name = "modera-test-job".to_string();
        match &self.script {
            TranscriptionScript::Transcript(text) => Ok(TranscriptionOutcome {
                job_name,
                state: TranscriptionState::Completed,
                transcript: text.clone(),
            }),
            TranscriptionScript::JobFailed => Ok(TranscriptionOutcome {
                job_name,
                state: TranscriptionState::Failed,
                transcript: None,
            }),
            TranscriptionScript::SubmissionFails => Err(TranscriptionError::Submission(
                "access denied".to_string(),
            )),
            TranscriptionScript::TimesOut => Err(TranscriptionError::PollTimeout {
                job_name,
                waited_secs: 300,
            }),
            TranscriptionScript::WaitForCancel => {
                cancel.cancelled().await;
                Err(TranscriptionError::Cancelled { job_name })
            }
        }
    }
}

pub fn report(labels: &[(&str, f32)], flags: &[&str]) -> AnalysisReport {
    AnalysisReport {
        labels: labels
            .iter()
            .map(|(name, confidence)| Label::new(*name, *confidence))
            .collect(),
        moderation_flags: flags
            .iter()
            .map(|name| ModerationFlag::new(*name, 95.0))
            .collect(),
        celebrities: Vec::new(),
    }
}

pub fn celebrity(name: &str) -> Celebrity {
    Celebrity {
        name: name.to_string(),
        match_confidence: 99.0,
    }
}

pub struct HarnessBuilder {
    analysis: AnalysisScript,
    transcription: TranscriptionScript,
    uploads: UploadFailure,
    failing_frames: bool,
}

impl HarnessBuilder {
    pub fn analysis(mut self, analysis: AnalysisScript) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn transcription(mut self, transcription: TranscriptionScript) -> Self {
        self.transcription = transcription;
        self
    }

    pub fn failing_uploads(mut self) -> Self {
        self.uploads = UploadFailure::Always;
        self
    }

    /// Fail only the n-th upload, counting from 1
    pub fn failing_upload_at(mut self, n: usize) -> Self {
        self.uploads = UploadFailure::At(n);
        self
    }

    pub fn failing_frames(mut self) -> Self {
        self.failing_frames = true;
        self
    }

    pub fn build(self) -> Harness {
        let events = Events::default();
        let store = Arc::new(FakeStore {
            events: events.clone(),
            failure: self.uploads,
            attempts: Mutex::new(0),
            uploads: Mutex::new(Vec::new()),
        });
        let analyzer = Arc::new(FakeAnalyzer {
            events: events.clone(),
            script: self.analysis,
            calls: Mutex::new(Vec::new()),
        });
        let sampler = Arc::new(FakeFrameSampler {
            events: events.clone(),
            fail: self.failing_frames,
            calls: Mutex::new(Vec::new()),
        });
        let transcriber = Arc::new(FakeTranscriber {
            events: events.clone(),
            script: self.transcription,
            requests: Mutex::new(Vec::new()),
        });

        let input_dir = tempfile::tempdir().unwrap();
        let work_dir = tempfile::tempdir().unwrap();

        let pipeline = ModerationPipeline::new(
            Capabilities {
                store: store.clone(),
                analyzer: analyzer.clone(),
                frame_sampler: sampler.clone(),
                transcriber: transcriber.clone(),
            },
            PipelineSettings {
                bucket: BUCKET.to_string(),
                image_key_prefix: "uploaded_images".to_string(),
                video_key_prefix: "uploaded_videos".to_string(),
                language_code: "fr-FR".to_string(),
                frame_offset_secs: 1.0,
                work_dir: work_dir.path().to_path_buf(),
            },
        );

        Harness {
            pipeline,
            events,
            store,
            analyzer,
            sampler,
            transcriber,
            input_dir,
            work_dir,
        }
    }
}

pub struct Harness {
    pub pipeline: ModerationPipeline,
    pub events: Events,
    pub store: Arc<FakeStore>,
    pub analyzer: Arc<FakeAnalyzer>,
    pub sampler: Arc<FakeFrameSampler>,
    pub transcriber: Arc<FakeTranscriber>,
    pub input_dir: TempDir,
    pub work_dir: TempDir,
}

impl Harness {
    /// Clean analysis, transcript "Bonjour tout le monde"
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            analysis: AnalysisScript::Report(report(&[("Cat", 91.2), ("Animal", 88.0)], &[])),
            transcription: TranscriptionScript::Transcript(Some(
                "Bonjour tout le monde".to_string(),
            )),
            uploads: UploadFailure::Never,
            failing_frames: false,
        }
    }

    /// Write a file into the input directory and return its path
    pub fn input(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.input_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn work_dir_entries(&self) -> usize {
        std::fs::read_dir(self.work_dir.path()).unwrap().count()
    }

    pub fn upload_keys(&self) -> Vec<String> {
        self.store
            .uploads
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.key.clone())
            .collect()
    }

    pub fn transcription_requests(&self) -> Vec<TranscriptionRequest> {
        self.transcriber.requests.lock().unwrap().clone()
    }
}

/// Minimal ISO base media header
pub const MP4_BYTES: &[u8] = b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00isomiso2";
/// EBML header
pub const WEBM_BYTES: &[u8] = b"\x1a\x45\xdf\xa3\x9f\x42\x86\x81\x01\x42\xf7\x81\x01";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR";
