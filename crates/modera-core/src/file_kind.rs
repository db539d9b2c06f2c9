//! File type classification by extension.
//!
//! The extension is mapped to a MIME type first, then the `image/` or `video/`
//! prefix decides the kind. Nothing is read from disk.

use crate::error::{ErrorMetadata, LogLevel};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Kind of a submitted file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Unknown,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Unknown => "unknown",
        }
    }

    /// Derive the kind from a MIME type such as `image/png`.
    pub fn from_content_type(content_type: &str) -> Self {
        let normalized = content_type.to_ascii_lowercase();
        if normalized.starts_with("image/") {
            FileKind::Image
        } else if normalized.starts_with("video/") {
            FileKind::Video
        } else {
            FileKind::Unknown
        }
    }
}

impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A submitted file that is neither an image nor a video
#[derive(Debug, Clone, Error)]
#[error("{} is neither an image nor a video", path.display())]
pub struct UnrecognizedFileType {
    pub path: PathBuf,
}

impl UnrecognizedFileType {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ErrorMetadata for UnrecognizedFileType {
    fn error_code(&self) -> &'static str {
        "UNRECOGNIZED_FILE_TYPE"
    }

    // Unsupported input is an expected outcome
    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

/// Best-effort content type for a path, keyed by its lowercase extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?;

    let content_type = match extension.as_str() {
        // Images
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "heic" => "image/heic",
        // Videos
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" | "qt" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mpeg" | "mpg" | "mpe" => "video/mpeg",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "3gp" => "video/3gpp",
        "ogv" => "video/ogg",
        // Audio and documents are known but not moderated
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => return None,
    };

    Some(content_type)
}

/// Classify a path as image, video or unknown. Never fails.
pub fn classify(path: &Path) -> FileKind {
    content_type_for(path)
        .map(FileKind::from_content_type)
        .unwrap_or(FileKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_images_case_insensitively() {
        assert_eq!(classify(Path::new("cat.jpg")), FileKind::Image);
        assert_eq!(classify(Path::new("/tmp/Cat.JPEG")), FileKind::Image);
        assert_eq!(classify(Path::new("selfie.png")), FileKind::Image);
    }

    #[test]
    fn classifies_videos() {
        assert_eq!(classify(Path::new("clip.mp4")), FileKind::Video);
        assert_eq!(classify(Path::new("clip.MOV")), FileKind::Video);
        assert_eq!(classify(Path::new("clip.avi")), FileKind::Video);
    }

    #[test]
    fn unknown_for_other_or_missing_extensions() {
        assert_eq!(classify(Path::new("notes.txt")), FileKind::Unknown);
        assert_eq!(classify(Path::new("song.mp3")), FileKind::Unknown);
        assert_eq!(classify(Path::new("README")), FileKind::Unknown);
        assert_eq!(classify(Path::new("archive.xyz")), FileKind::Unknown);
    }

    #[test]
    fn from_content_type_uses_prefix() {
        assert_eq!(FileKind::from_content_type("image/webp"), FileKind::Image);
        assert_eq!(FileKind::from_content_type("VIDEO/mp4"), FileKind::Video);
        assert_eq!(
            FileKind::from_content_type("application/pdf"),
            FileKind::Unknown
        );
    }

    #[test]
    fn unrecognized_file_type_logs_quietly() {
        let error = UnrecognizedFileType::new("/tmp/notes.txt");
        assert_eq!(error.error_code(), "UNRECOGNIZED_FILE_TYPE");
        assert_eq!(error.log_level(), LogLevel::Debug);
        assert!(error.to_string().contains("notes.txt"));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FileKind::Video).unwrap(),
            "\"video\""
        );
    }
}
