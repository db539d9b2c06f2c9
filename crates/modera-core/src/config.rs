//! Configuration module
//!
//! Configuration is read once from the environment (and an optional `.env`
//! file) into an explicit [`Config`] that is handed to the pipeline builder.
//! Nothing else in the workspace reads environment variables.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::*;

/// AWS credentials and region
#[derive(Clone)]
pub struct AwsSettings {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl AwsSettings {
    /// Static credentials, when both halves are configured. `None` means the
    /// default provider chain is used.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl Debug for AwsSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AwsSettings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "<redacted>"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Object storage target
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub bucket: String,
    /// Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub endpoint: Option<String>,
    pub image_key_prefix: String,
    pub video_key_prefix: String,
}

/// Image analysis parameters
#[derive(Clone, Debug)]
pub struct AnalysisSettings {
    pub max_labels: i32,
    pub min_confidence: f32,
    pub recognize_celebrities: bool,
}

/// Frame sampling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSamplerKind {
    /// Spawn the `ffmpeg` binary
    Ffmpeg,
    /// Decode with the linked FFmpeg libraries
    InProcess,
}

impl FromStr for FrameSamplerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ffmpeg" | "process" => Ok(FrameSamplerKind::Ffmpeg),
            "in-process" | "in_process" | "inprocess" | "library" => {
                Ok(FrameSamplerKind::InProcess)
            }
            _ => Err(anyhow::anyhow!("Invalid frame sampler: {}", s)),
        }
    }
}

/// Video frame sampling parameters
#[derive(Clone, Debug)]
pub struct FrameSettings {
    pub sampler: FrameSamplerKind,
    pub ffmpeg_path: String,
    pub offset_secs: f64,
    /// Root under which per-run working directories are created
    pub work_dir: PathBuf,
}

/// Transcription job parameters
#[derive(Clone, Debug)]
pub struct TranscriptionSettings {
    pub language_code: String,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    /// Consecutive status query failures tolerated before giving up
    pub max_poll_errors: u32,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub aws: AwsSettings,
    pub storage: StorageSettings,
    pub analysis: AnalysisSettings,
    pub frame: FrameSettings,
    pub transcription: TranscriptionSettings,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let var_or = |primary: &str, legacy: &str| var(primary).or_else(|| var(legacy));

        fn parse<T: FromStr>(
            key: &str,
            value: Option<String>,
            default: T,
        ) -> Result<T, anyhow::Error> {
            match value {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("{} must be a valid value, got '{}'", key, raw)),
                None => Ok(default),
            }
        }

        let aws = AwsSettings {
            region: var_or("AWS_REGION", "REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id: var_or("AWS_ACCESS_KEY_ID", "ACCESS_KEY"),
            secret_access_key: var_or("AWS_SECRET_ACCESS_KEY", "SECRET_KEY"),
        };

        let storage = StorageSettings {
            bucket: var_or("S3_BUCKET", "BUCKET_NAME").unwrap_or_default(),
            endpoint: var("S3_ENDPOINT"),
            image_key_prefix: var("IMAGE_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_IMAGE_KEY_PREFIX.to_string()),
            video_key_prefix: var("VIDEO_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_VIDEO_KEY_PREFIX.to_string()),
        };

        let analysis = AnalysisSettings {
            max_labels: parse("MAX_LABELS", var("MAX_LABELS"), DEFAULT_MAX_LABELS)?,
            min_confidence: parse(
                "MIN_LABEL_CONFIDENCE",
                var("MIN_LABEL_CONFIDENCE"),
                DEFAULT_MIN_LABEL_CONFIDENCE,
            )?,
            recognize_celebrities: parse(
                "RECOGNIZE_CELEBRITIES",
                var("RECOGNIZE_CELEBRITIES").map(|v| v.to_lowercase()),
                false,
            )?,
        };

        let frame = FrameSettings {
            sampler: match var("FRAME_SAMPLER") {
                Some(raw) => raw.parse()?,
                None => FrameSamplerKind::Ffmpeg,
            },
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| DEFAULT_FFMPEG_PATH.to_string()),
            offset_secs: parse(
                "FRAME_SAMPLE_OFFSET_SECS",
                var("FRAME_SAMPLE_OFFSET_SECS"),
                DEFAULT_FRAME_OFFSET_SECS,
            )?,
            work_dir: var("WORK_DIR").map(PathBuf::from).unwrap_or_else(env::temp_dir),
        };

        let transcription = TranscriptionSettings {
            language_code: var("TRANSCRIBE_LANGUAGE_CODE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
            poll_interval: Duration::from_secs(parse(
                "TRANSCRIBE_POLL_INTERVAL_SECS",
                var("TRANSCRIBE_POLL_INTERVAL_SECS"),
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            max_wait: Duration::from_secs(parse(
                "TRANSCRIBE_MAX_WAIT_SECS",
                var("TRANSCRIBE_MAX_WAIT_SECS"),
                DEFAULT_MAX_WAIT_SECS,
            )?),
            max_poll_errors: parse(
                "TRANSCRIBE_MAX_POLL_ERRORS",
                var("TRANSCRIBE_MAX_POLL_ERRORS"),
                DEFAULT_MAX_POLL_ERRORS,
            )?,
        };

        let config = Config {
            aws,
            storage,
            analysis,
            frame,
            transcription,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage.bucket.is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET (or BUCKET_NAME) must be set"));
        }

        if self.aws.access_key_id.is_some() != self.aws.secret_access_key.is_some() {
            return Err(anyhow::anyhow!(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"
            ));
        }

        for (name, prefix) in [
            ("IMAGE_KEY_PREFIX", &self.storage.image_key_prefix),
            ("VIDEO_KEY_PREFIX", &self.storage.video_key_prefix),
        ] {
            if prefix.contains("..") || prefix.starts_with('/') {
                return Err(anyhow::anyhow!(
                    "{} must be a relative key prefix without '..'",
                    name
                ));
            }
        }

        if !(1..=1000).contains(&self.analysis.max_labels) {
            return Err(anyhow::anyhow!("MAX_LABELS must be between 1 and 1000"));
        }

        if !(0.0..=100.0).contains(&self.analysis.min_confidence) {
            return Err(anyhow::anyhow!(
                "MIN_LABEL_CONFIDENCE must be between 0 and 100"
            ));
        }

        if !self.frame.offset_secs.is_finite() || self.frame.offset_secs < 0.0 {
            return Err(anyhow::anyhow!(
                "FRAME_SAMPLE_OFFSET_SECS must be a non-negative number"
            ));
        }

        if self.transcription.poll_interval < Duration::from_secs(1) {
            return Err(anyhow::anyhow!(
                "TRANSCRIBE_POLL_INTERVAL_SECS must be at least 1"
            ));
        }

        if self.transcription.max_wait < self.transcription.poll_interval {
            return Err(anyhow::anyhow!(
                "TRANSCRIBE_MAX_WAIT_SECS must not be shorter than the poll interval"
            ));
        }

        if self.transcription.language_code.is_empty() {
            return Err(anyhow::anyhow!("TRANSCRIBE_LANGUAGE_CODE must not be empty"));
        }

        Ok(())
    }
}
