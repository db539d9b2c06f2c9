//! Remote analysis and transcription providers
//!
//! Capability traits consumed by the moderation pipeline, and their AWS
//! implementations (Rekognition for image analysis, Transcribe for speech).

pub mod analysis;
#[cfg(any(feature = "aws-rekognition", feature = "aws-transcribe"))]
pub mod aws;
pub mod transcription;

pub use analysis::{AnalysisError, ContentAnalyzer};
#[cfg(feature = "aws-rekognition")]
pub use analysis::RekognitionAnalyzer;
pub use transcription::{
    JobStatus, TranscribeBackend, TranscriptionError, TranscriptionOutcome, TranscriptionPoller,
    TranscriptionRequest, TranscriptionService, TranscriptionState,
};
#[cfg(feature = "aws-transcribe")]
pub use transcription::AwsTranscribeBackend;
