//! Defaults shared by configuration and the providers.

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_IMAGE_KEY_PREFIX: &str = "uploaded_images";
pub const DEFAULT_VIDEO_KEY_PREFIX: &str = "uploaded_videos";

pub const DEFAULT_MAX_LABELS: i32 = 10;
pub const DEFAULT_MIN_LABEL_CONFIDENCE: f32 = 50.0;

pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
pub const DEFAULT_FRAME_OFFSET_SECS: f64 = 1.0;

pub const DEFAULT_LANGUAGE_CODE: &str = "fr-FR";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_MAX_WAIT_SECS: u64 = 300;
pub const DEFAULT_MAX_POLL_ERRORS: u32 = 3;
