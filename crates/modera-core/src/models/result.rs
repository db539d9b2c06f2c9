use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::file_kind::FileKind;

/// Outcome of one moderation run, the only thing the coordinator returns
///
/// A rejected result never carries hashtags or a transcript, and `file_kind`
/// is `None` only for unsupported files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub is_safe: bool,
    pub hashtags: Vec<String>,
    pub file_kind: Option<FileKind>,
    pub transcript: Option<String>,
}

impl ModerationResult {
    /// Rejection for a file whose type is not supported.
    pub fn unsupported() -> Self {
        Self {
            is_safe: false,
            hashtags: Vec::new(),
            file_kind: None,
            transcript: None,
        }
    }

    /// Rejection of a classified file.
    pub fn rejected(kind: FileKind) -> Self {
        Self {
            is_safe: false,
            hashtags: Vec::new(),
            file_kind: Self::known(kind),
            transcript: None,
        }
    }

    /// Approval with hashtags. A transcript is only kept for videos.
    pub fn approved(kind: FileKind, hashtags: Vec<String>, transcript: Option<String>) -> Self {
        let file_kind = Self::known(kind);
        if file_kind.is_none() {
            return Self::unsupported();
        }
        Self {
            is_safe: true,
            hashtags,
            file_kind,
            transcript: transcript.filter(|_| kind == FileKind::Video),
        }
    }

    fn known(kind: FileKind) -> Option<FileKind> {
        match kind {
            FileKind::Unknown => None,
            other => Some(other),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match (self.is_safe, self.file_kind) {
            (true, _) => Verdict::Approved,
            (false, Some(FileKind::Image)) => Verdict::InappropriateImage,
            (false, Some(FileKind::Video)) => Verdict::InappropriateVideo,
            (false, _) => Verdict::Unsupported,
        }
    }
}

/// User-facing reading of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Unsupported,
    InappropriateImage,
    InappropriateVideo,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let message = match self {
            Verdict::Approved => "Content is appropriate and can be displayed.",
            Verdict::Unsupported => "Unsupported file or processing error.",
            Verdict::InappropriateImage => "This image contains inappropriate content.",
            Verdict::InappropriateVideo => "This video contains inappropriate content.",
        };
        f.write_str(message)
    }
}
