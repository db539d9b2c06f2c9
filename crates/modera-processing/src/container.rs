//! Container format detection from file content

use modera_core::MediaFormat;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Bytes read from the start of a file, enough for every signature we check
const SNIFF_LEN: usize = 16;

/// Sniff the media format of a local file from its first bytes.
///
/// Returns `None` when the file cannot be read or no signature matches; callers
/// fall back to the object key extension.
pub async fn detect_media_format(path: &Path) -> Option<MediaFormat> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(error = %e, path = %path.display(), "Cannot open file for sniffing");
            return None;
        }
    };

    let mut header = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match file.read(&mut header[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => {
                tracing::debug!(error = %e, path = %path.display(), "Cannot read file header");
                return None;
            }
        }
    }

    MediaFormat::sniff(&header[..filled])
}
