//! Data models for the moderation pipeline
//!
//! All models are request-scoped; nothing here is persisted.

mod analysis;
mod object;
mod result;

pub use analysis::*;
pub use object::*;
pub use result::*;
