//! Logo upload preprocessing
//!
//! An uploaded file becomes a fixed-size square [`LogoAsset`] ready for
//! embedding at the QR symbol's center. Uploads are identified by magic-byte
//! sniffing, never by filename or declared content type. Anything that is
//! missing, not an accepted image format, or undecodable degrades to a fully
//! transparent placeholder of the same size, so the composition step always
//! has a logo to overlay and never branches.

use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage};
use log::warn;

/// Leading bytes inspected when sniffing the upload's format
const SNIFF_LEN: usize = 512;

/// Why an upload was not usable as a logo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The magic bytes matched none of the accepted image formats
    UnsupportedType,
    /// Sniffing accepted the bytes but full decoding failed
    DecodeFailed,
}

/// Outcome of preprocessing the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoOutcome {
    /// Upload decoded and resized; the asset carries real pixels
    Decoded,
    /// No file was uploaded
    Absent,
    /// Upload was supplied but rejected
    Rejected(RejectReason),
}

/// A logo ready for embedding
///
/// `pixels` is always a square RGBA image of the configured dimension: the
/// decoded upload, or the transparent placeholder when the outcome is not
/// [`LogoOutcome::Decoded`].
#[derive(Debug, Clone)]
pub struct LogoAsset {
    pub pixels: RgbaImage,
    pub outcome: LogoOutcome,
}

impl LogoAsset {
    /// True only when an upload was supplied, sniffed as an accepted image
    /// type, and decoded without error.
    pub fn present(&self) -> bool {
        self.outcome == LogoOutcome::Decoded
    }

    fn placeholder(dimension: u32, outcome: LogoOutcome) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(dimension, dimension, Rgba([0, 0, 0, 0])),
            outcome,
        }
    }
}

/// Prepare the uploaded bytes as a square logo of the given dimension
///
/// Never fails: every bad input is logged and substituted with the
/// placeholder. A malformed or missing logo must not prevent QR generation.
pub fn prepare_logo(upload: Option<&[u8]>, dimension: u32) -> LogoAsset {
    let bytes = match upload {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return LogoAsset::placeholder(dimension, LogoOutcome::Absent),
    };

    let sniff = &bytes[..bytes.len().min(SNIFF_LEN)];
    let format = match image::guess_format(sniff) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        Ok(other) => {
            warn!("not an accepted logo format - {:?}", other);
            return LogoAsset::placeholder(dimension, LogoOutcome::Rejected(RejectReason::UnsupportedType));
        }
        Err(_) => {
            warn!("logo upload does not look like an image");
            return LogoAsset::placeholder(dimension, LogoOutcome::Rejected(RejectReason::UnsupportedType));
        }
    };

    let decoded = match image::load_from_memory_with_format(bytes, format) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("cannot decode logo upload - {}", e);
            return LogoAsset::placeholder(dimension, LogoOutcome::Rejected(RejectReason::DecodeFailed));
        }
    };

    // Lanczos3 keeps the logo legible at the small fraction of the symbol it
    // will occupy.
    let pixels = decoded
        .resize_exact(dimension, dimension, FilterType::Lanczos3)
        .to_rgba8();
    LogoAsset {
        pixels,
        outcome: LogoOutcome::Decoded,
    }
}
