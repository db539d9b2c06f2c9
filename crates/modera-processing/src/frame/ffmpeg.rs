//! Frame sampling through an `ffmpeg` child process

use super::{validate_offset, FrameExtractionError, FrameResult, FrameSampler};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// stderr fragments ffmpeg prints when the input itself is unusable
const OPEN_FAILURE_MARKERS: &[&str] = &[
    "No such file or directory",
    "Invalid data found when processing input",
    "moov atom not found",
    "does not contain any stream",
    "Permission denied",
];

/// Validate that a path doesn't contain shell metacharacters
fn validate_binary_path(path: &str) -> FrameResult<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(FrameExtractionError::DecoderUnavailable(format!(
            "Invalid ffmpeg path: {}",
            path
        )));
    }
    Ok(())
}

/// Map a failed ffmpeg run to an error kind using its stderr
fn classify_failure(video_path: &Path, at_seconds: f64, stderr: &str) -> FrameExtractionError {
    if OPEN_FAILURE_MARKERS.iter().any(|m| stderr.contains(m)) {
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("ffmpeg could not open input")
            .trim()
            .to_string();
        FrameExtractionError::OpenFailed {
            path: video_path.to_path_buf(),
            reason,
        }
    } else {
        FrameExtractionError::NoFrameAvailable { at_seconds }
    }
}

pub struct FfmpegFrameSampler {
    ffmpeg_path: String,
}

impl FfmpegFrameSampler {
    pub fn new(ffmpeg_path: String) -> FrameResult<Self> {
        validate_binary_path(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }

    fn args(video_path: &Path, at_seconds: f64, output_path: &Path) -> Vec<std::ffi::OsString> {
        // -ss before -i seeks on the demuxer, then decodes up to the exact time
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-ss".into(),
            format!("{:.3}", at_seconds).into(),
            "-i".into(),
            video_path.as_os_str().to_owned(),
            "-frames:v".into(),
            "1".into(),
            "-q:v".into(),
            "2".into(),
            "-f".into(),
            "image2".into(),
            "-y".into(),
            output_path.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl FrameSampler for FfmpegFrameSampler {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "sample_frame"
    ))]
    async fn sample_frame(
        &self,
        video_path: &Path,
        at_seconds: f64,
        output_path: &Path,
    ) -> FrameResult<PathBuf> {
        validate_offset(at_seconds)?;
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffmpeg_path)
            .args(Self::args(video_path, at_seconds, output_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                FrameExtractionError::DecoderUnavailable(format!(
                    "Failed to execute {}: {}",
                    self.ffmpeg_path, e
                ))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(classify_failure(video_path, at_seconds, &stderr));
        }

        // Seeking past the end exits 0 without encoding anything
        let written = tokio::fs::metadata(output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(FrameExtractionError::NoFrameAvailable { at_seconds });
        }

        tracing::debug!(
            output = %output_path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Frame extracted"
        );

        Ok(output_path.to_path_buf())
    }
}
