use chrono::{DateTime, Utc};
use modera_core::{MediaFormat, RemoteObjectRef};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Transcription job lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionState {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl TranscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionState::NotStarted => "not_started",
            TranscriptionState::InProgress => "in_progress",
            TranscriptionState::Completed => "completed",
            TranscriptionState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TranscriptionState::Completed | TranscriptionState::Failed
        )
    }
}

impl Display for TranscriptionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// What to transcribe and how
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub object: RemoteObjectRef,
    /// BCP-47 code such as `fr-FR`
    pub language_code: String,
    pub media_format: MediaFormat,
}

impl TranscriptionRequest {
    /// Media format is inferred from the object key, falling back to mp4.
    pub fn new(object: RemoteObjectRef, language_code: impl Into<String>) -> Self {
        let media_format = MediaFormat::from_key(&object.key);
        Self {
            object,
            language_code: language_code.into(),
            media_format,
        }
    }

    pub fn with_media_format(mut self, media_format: MediaFormat) -> Self {
        self.media_format = media_format;
        self
    }
}

/// Unique job name: submission time in milliseconds plus a random suffix.
pub fn job_name(submitted_at: DateTime<Utc>) -> String {
    format!(
        "modera-{}-{}",
        submitted_at.timestamp_millis(),
        &Uuid::new_v4().simple().to_string()[..8]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_infers_format_from_key() {
        let request = TranscriptionRequest::new(
            RemoteObjectRef::new("bucket", "uploaded_videos/a/clip.webm"),
            "fr-FR",
        );
        assert_eq!(request.media_format, MediaFormat::Webm);

        let request = TranscriptionRequest::new(
            RemoteObjectRef::new("bucket", "uploaded_videos/a/clip.avi"),
            "fr-FR",
        );
        assert_eq!(request.media_format, MediaFormat::Mp4);
    }

    #[test]
    fn sniffed_format_overrides_extension() {
        let request = TranscriptionRequest::new(
            RemoteObjectRef::new("bucket", "uploaded_videos/a/clip.mp4"),
            "en-US",
        )
        .with_media_format(MediaFormat::Webm);
        assert_eq!(request.media_format, MediaFormat::Webm);
    }

    #[test]
    fn job_names_are_unique_for_the_same_instant() {
        let now = Utc::now();
        let a = job_name(now);
        let b = job_name(now);
        assert_ne!(a, b);
        assert!(a.starts_with(&format!("modera-{}-", now.timestamp_millis())));
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'));
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!TranscriptionState::NotStarted.is_terminal());
        assert!(!TranscriptionState::InProgress.is_terminal());
        assert!(TranscriptionState::Completed.is_terminal());
        assert!(TranscriptionState::Failed.is_terminal());
    }
}
