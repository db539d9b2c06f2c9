//! Failure policy per pipeline stage.
//!
//! Moderation stages fail closed: when a step cannot prove the content is safe,
//! the content is rejected. Transcription runs after the gate has passed and is
//! best effort: its failure only means the transcript is absent.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// What a failure at a given stage does to the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The failure rejects the content.
    FailClosed,
    /// The failure is logged and the stage output is dropped.
    BestEffort,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::FailClosed => "fail_closed",
            FailurePolicy::BestEffort => "best_effort",
        }
    }
}

impl Display for FailurePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Steps of a moderation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classify,
    Upload,
    FrameSample,
    Analyze,
    Transcribe,
}

impl Stage {
    pub const fn policy(self) -> FailurePolicy {
        match self {
            Stage::Transcribe => FailurePolicy::BestEffort,
            Stage::Classify | Stage::Upload | Stage::FrameSample | Stage::Analyze => {
                FailurePolicy::FailClosed
            }
        }
    }

    /// Whether a failure at this stage rejects the content.
    pub const fn rejects_on_failure(self) -> bool {
        matches!(self.policy(), FailurePolicy::FailClosed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classify => "classify",
            Stage::Upload => "upload",
            Stage::FrameSample => "frame_sample",
            Stage::Analyze => "analyze",
            Stage::Transcribe => "transcribe",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
