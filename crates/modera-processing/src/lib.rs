//! Modera Processing Library
//!
//! Local media work done before anything is sent to a remote service:
//! sampling a still frame out of a video and sniffing the container format
//! of a file so transcription jobs are submitted with the right media format.

pub mod container;
pub mod frame;

pub use container::detect_media_format;
pub use frame::{
    create_frame_sampler, FfmpegFrameSampler, FrameExtractionError, FrameResult, FrameSampler,
};
#[cfg(feature = "in-process-decoder")]
pub use frame::InProcessFrameSampler;
