//! In-process frame sampling with libav* through `ffmpeg-next`

use super::{validate_offset, FrameExtractionError, FrameResult, FrameSampler};
use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{context::Context as Scaler, flag::Flags};
use ffmpeg::util::frame::video::Video;
use std::path::{Path, PathBuf};

/// Decodes in a blocking task; every libav context lives inside that task
/// and is dropped when it returns.
pub struct InProcessFrameSampler;

impl InProcessFrameSampler {
    pub fn new() -> FrameResult<Self> {
        ffmpeg::init().map_err(|e| FrameExtractionError::DecoderUnavailable(e.to_string()))?;
        Ok(Self)
    }
}

#[async_trait]
impl FrameSampler for InProcessFrameSampler {
    async fn sample_frame(
        &self,
        video_path: &Path,
        at_seconds: f64,
        output_path: &Path,
    ) -> FrameResult<PathBuf> {
        validate_offset(at_seconds)?;
        let video_path = video_path.to_path_buf();
        let output_path = output_path.to_path_buf();

        tokio::task::spawn_blocking(move || decode_frame(&video_path, at_seconds, &output_path))
            .await
            .map_err(|e| {
                FrameExtractionError::DecoderUnavailable(format!("Decoder task failed: {}", e))
            })?
    }
}

fn decode_frame(video_path: &Path, at_seconds: f64, output_path: &Path) -> FrameResult<PathBuf> {
    let open_failed = |reason: String| FrameExtractionError::OpenFailed {
        path: video_path.to_path_buf(),
        reason,
    };

    let mut ictx = ffmpeg::format::input(&video_path).map_err(|e| open_failed(e.to_string()))?;

    let (stream_index, target_pts, parameters) = {
        let stream = ictx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| open_failed("no video stream".to_string()))?;
        let time_base = stream.time_base();
        let target_pts = if time_base.numerator() > 0 {
            (at_seconds * f64::from(time_base.denominator()) / f64::from(time_base.numerator()))
                as i64
        } else {
            0
        };
        (stream.index(), target_pts, stream.parameters())
    };

    let context = ffmpeg::codec::context::Context::from_parameters(parameters)
        .map_err(|e| open_failed(e.to_string()))?;
    let mut decoder = context
        .decoder()
        .video()
        .map_err(|e| FrameExtractionError::DecoderUnavailable(e.to_string()))?;

    // Seek to the closest keyframe before the offset, then decode forward
    let seek_ts = (at_seconds * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
    if seek_ts > 0 && ictx.seek(seek_ts, ..seek_ts).is_err() {
        tracing::debug!(at_seconds, "Seek failed, decoding from the start");
    }

    let mut decoded = Video::empty();
    let mut found = false;

    let reached = |frame: &Video| frame.timestamp().map_or(true, |pts| pts >= target_pts);

    for (stream, packet) in ictx.packets() {
        if stream.index() != stream_index {
            continue;
        }
        if decoder.send_packet(&packet).is_err() {
            continue;
        }
        while decoder.receive_frame(&mut decoded).is_ok() {
            if reached(&decoded) {
                found = true;
                break;
            }
        }
        if found {
            break;
        }
    }

    if !found && decoder.send_eof().is_ok() {
        while decoder.receive_frame(&mut decoded).is_ok() {
            if reached(&decoded) {
                found = true;
                break;
            }
        }
    }

    if !found {
        return Err(FrameExtractionError::NoFrameAvailable { at_seconds });
    }

    let (width, height) = (decoded.width(), decoded.height());
    let mut scaler = Scaler::get(
        decoded.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        Flags::BILINEAR,
    )
    .map_err(|e| FrameExtractionError::DecoderUnavailable(e.to_string()))?;

    let mut rgb = Video::empty();
    scaler
        .run(&decoded, &mut rgb)
        .map_err(|e| FrameExtractionError::DecoderUnavailable(e.to_string()))?;

    // Rows are padded to the plane stride
    let row_len = width as usize * 3;
    let stride = rgb.stride(0);
    let plane = rgb.data(0);
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&plane[start..start + row_len]);
    }

    let write_failed = |reason: String| FrameExtractionError::WriteFailed {
        path: output_path.to_path_buf(),
        reason,
    };

    let image = image::RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| write_failed("frame buffer size mismatch".to_string()))?;
    image
        .save_with_format(output_path, image::ImageFormat::Jpeg)
        .map_err(|e| write_failed(e.to_string()))?;

    tracing::debug!(
        output = %output_path.display(),
        width,
        height,
        "Frame decoded in-process"
    );

    Ok(output_path.to_path_buf())
}
