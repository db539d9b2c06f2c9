//! Media container formats accepted by the transcription service.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Container format submitted with a transcription job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp3,
    Mp4,
    M4a,
    Wav,
    Flac,
    Ogg,
    Amr,
    Webm,
}

impl MediaFormat {
    /// Format used when neither the content nor the name gives an answer.
    pub const FALLBACK: MediaFormat = MediaFormat::Mp4;

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
            MediaFormat::M4a => "m4a",
            MediaFormat::Wav => "wav",
            MediaFormat::Flac => "flac",
            MediaFormat::Ogg => "ogg",
            MediaFormat::Amr => "amr",
            MediaFormat::Webm => "webm",
        }
    }

    /// Map a file extension (without the dot) to a format.
    ///
    /// QuickTime and 3GP files share the ISO base media layout and are sent as mp4.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Some(MediaFormat::Mp3),
            "mp4" | "m4v" | "mov" | "qt" | "3gp" => Some(MediaFormat::Mp4),
            "m4a" => Some(MediaFormat::M4a),
            "wav" => Some(MediaFormat::Wav),
            "flac" => Some(MediaFormat::Flac),
            "ogg" | "oga" | "ogv" | "opus" => Some(MediaFormat::Ogg),
            "amr" => Some(MediaFormat::Amr),
            "webm" => Some(MediaFormat::Webm),
            _ => None,
        }
    }

    /// Infer a format from an object key's extension, falling back to [`MediaFormat::FALLBACK`].
    pub fn from_key(key: &str) -> Self {
        key.rsplit_once('.')
            .filter(|(stem, ext)| !stem.is_empty() && !ext.contains('/'))
            .and_then(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(Self::FALLBACK)
    }

    /// Identify a container from its leading bytes.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.len() >= 12 && &header[4..8] == b"ftyp" {
            return if &header[8..12] == b"M4A " {
                Some(MediaFormat::M4a)
            } else {
                Some(MediaFormat::Mp4)
            };
        }
        if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(MediaFormat::Webm);
        }
        if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WAVE" {
            return Some(MediaFormat::Wav);
        }
        if header.starts_with(b"fLaC") {
            return Some(MediaFormat::Flac);
        }
        if header.starts_with(b"OggS") {
            return Some(MediaFormat::Ogg);
        }
        if header.starts_with(b"#!AMR") {
            return Some(MediaFormat::Amr);
        }
        let frame_sync = header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0;
        if header.starts_with(b"ID3") || frame_sync {
            return Some(MediaFormat::Mp3);
        }
        None
    }
}

impl Display for MediaFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
