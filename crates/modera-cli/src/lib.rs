//! Helpers for the `modera` command-line front-end

use anyhow::{Context, Result};
use clap::ValueEnum;
use modera_core::{FileKind, ModerationResult};
use std::fmt::Write as _;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Exit status for rejected content
pub const EXIT_REJECTED: u8 = 2;
/// Exit status for configuration and setup failures
pub const EXIT_SETUP_ERROR: u8 = 1;
/// Exit status after a second interrupt
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Copy `source` into `staging_dir`, keeping its file name.
///
/// The pipeline deletes the file it is given; moderating a private copy
/// leaves the user's original in place.
pub fn stage_copy(source: &Path, staging_dir: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .with_context(|| format!("{} is not a file path", source.display()))?;
    let staged = staging_dir.join(file_name);
    std::fs::copy(source, &staged)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    Ok(staged)
}

/// Human-readable report of a moderation result
pub fn render_result(result: &ModerationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.verdict());

    if !result.is_safe {
        return out;
    }

    if result.hashtags.is_empty() {
        let _ = writeln!(out, "No hashtags.");
    } else {
        let _ = writeln!(out, "Hashtags: {}", result.hashtags.join(" "));
    }

    if result.file_kind == Some(FileKind::Video) {
        match &result.transcript {
            Some(transcript) => {
                let _ = writeln!(out, "Transcript: {}", transcript);
            }
            None => {
                let _ = writeln!(out, "No transcript available.");
            }
        }
    }

    out
}

pub fn exit_status(result: &ModerationResult) -> u8 {
    if result.is_safe {
        0
    } else {
        EXIT_REJECTED
    }
}

pub fn exit_code(result: &ModerationResult) -> ExitCode {
    ExitCode::from(exit_status(result))
}

/// React to interrupts during a moderation.
///
/// The first interrupt cancels `cancel`, which abandons the transcription
/// wait. Returns `true` on a second interrupt, when the caller should exit
/// without waiting for the run. Returns `false` if interrupts can no longer
/// be received.
pub async fn watch_interrupts<F, Fut>(mut next_interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    tracing::info!("Interrupted, abandoning transcription; interrupt again to exit");
    cancel.cancel();

    if next_interrupt().await.is_err() {
        return false;
    }
    tracing::warn!("Interrupted again, exiting");
    true
}
