//! Transcript documents produced by the transcription service
//!
//! Only the plain-text transcript is used:
//! `{ "results": { "transcripts": [ { "transcript": "..." } ] } }`.

use super::TranscriptionError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TranscriptDocument {
    pub results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptResults {
    #[serde(default)]
    pub transcripts: Vec<TranscriptSegment>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptSegment {
    pub transcript: Option<String>,
}

impl TranscriptDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, TranscriptionError> {
        serde_json::from_slice(bytes).map_err(|e| {
            TranscriptionError::Fetch(format!("Failed to parse transcript JSON: {}", e))
        })
    }

    /// Text of the first transcript segment
    pub fn into_first_transcript(self) -> Option<String> {
        self.results
            .transcripts
            .into_iter()
            .next()
            .and_then(|segment| segment.transcript)
    }
}
