//! Modera Services Layer
//!
//! Hosts the moderation coordinator. It classifies a local file, uploads it,
//! gates it on image moderation and, for videos that pass, transcribes them.
//! Every remote capability is injected through [`Capabilities`] so the
//! coordinator can run against in-memory fakes.

pub mod cleanup;
pub mod pipeline;
#[cfg(feature = "aws")]
pub mod setup;

pub use cleanup::{scratch_dir, TransientFile};
pub use pipeline::{Capabilities, ModerationHandle, ModerationPipeline, PipelineSettings};
#[cfg(feature = "aws")]
pub use setup::build_pipeline;
