//! Still frame sampling from video files.
//!
//! Two strategies share the [`FrameSampler`] trait: spawning an `ffmpeg`
//! process (always available) and decoding in-process through libav*
//! (behind the `in-process-decoder` feature).

mod ffmpeg;
#[cfg(feature = "in-process-decoder")]
mod in_process;

pub use ffmpeg::FfmpegFrameSampler;
#[cfg(feature = "in-process-decoder")]
pub use in_process::InProcessFrameSampler;

use async_trait::async_trait;
use modera_core::{ErrorMetadata, FrameSamplerKind, FrameSettings, LogLevel};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Frame extraction errors
#[derive(Debug, Error)]
pub enum FrameExtractionError {
    #[error("Failed to open video {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("No frame available at {at_seconds}s")]
    NoFrameAvailable { at_seconds: f64 },

    #[error("Invalid frame offset: {0}")]
    InvalidOffset(f64),

    #[error("Frame decoder unavailable: {0}")]
    DecoderUnavailable(String),

    #[error("Failed to write frame to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

impl ErrorMetadata for FrameExtractionError {
    fn error_code(&self) -> &'static str {
        match self {
            FrameExtractionError::OpenFailed { .. } => "VIDEO_OPEN_FAILED",
            FrameExtractionError::NoFrameAvailable { .. } => "NO_FRAME_AVAILABLE",
            FrameExtractionError::InvalidOffset(_) => "INVALID_FRAME_OFFSET",
            FrameExtractionError::DecoderUnavailable(_) => "DECODER_UNAVAILABLE",
            FrameExtractionError::WriteFailed { .. } => "FRAME_WRITE_FAILED",
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            // Bad or too-short uploads are expected input, not operator problems
            FrameExtractionError::OpenFailed { .. }
            | FrameExtractionError::NoFrameAvailable { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

pub type FrameResult<T> = Result<T, FrameExtractionError>;

/// Extracts one still image from a video.
#[async_trait]
pub trait FrameSampler: Send + Sync {
    /// Decode the first frame at or after `at_seconds` and write it as a JPEG
    /// to `output_path`. Returns the path that was written.
    async fn sample_frame(
        &self,
        video_path: &Path,
        at_seconds: f64,
        output_path: &Path,
    ) -> FrameResult<PathBuf>;
}

pub(crate) fn validate_offset(at_seconds: f64) -> FrameResult<()> {
    if !at_seconds.is_finite() || at_seconds < 0.0 {
        return Err(FrameExtractionError::InvalidOffset(at_seconds));
    }
    Ok(())
}

/// Build the sampler selected in configuration.
pub fn create_frame_sampler(settings: &FrameSettings) -> FrameResult<Arc<dyn FrameSampler>> {
    match settings.sampler {
        FrameSamplerKind::Ffmpeg => Ok(Arc::new(FfmpegFrameSampler::new(
            settings.ffmpeg_path.clone(),
        )?)),
        #[cfg(feature = "in-process-decoder")]
        FrameSamplerKind::InProcess => Ok(Arc::new(InProcessFrameSampler::new()?)),
        #[cfg(not(feature = "in-process-decoder"))]
        FrameSamplerKind::InProcess => Err(FrameExtractionError::DecoderUnavailable(
            "built without the in-process-decoder feature".to_string(),
        )),
    }
}
