//! Threshold filters: Binarize, Limiarize.
//!
//! Both compare pixel intensity (see [`intensity`]) against a threshold.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - thresholds the single channel
//! - **RGB**: (height, width, 3) - thresholds the RGB mean
//! - **RGBA**: (height, width, 4) - thresholds the RGB mean (see per-filter alpha notes)

use crate::buffer::PixelBuffer;
use crate::filters::grayscale::{intensity, GrayscaleMethod};

/// Default binarize threshold (mid-point of the 0-255 range).
pub const DEFAULT_THRESHOLD: u8 = 128;

// ============================================================================
// Binarize
// ============================================================================

/// Apply binary threshold.
///
/// Pixels with intensity `>= threshold` become white (255), all others black
/// (0), on every color channel. Alpha is binarized at the mid-point so that
/// every output sample is either 0 or 255.
///
/// # Returns
/// Two-valued image with same channel count
pub fn binarize(input: &PixelBuffer, threshold: u8) -> PixelBuffer {
    let color_channels = input.color_channels();
    let has_alpha = input.has_alpha();

    input.map(|pixel, mut out| {
        let v = if intensity(pixel, GrayscaleMethod::Average) >= threshold {
            255
        } else {
            0
        };
        for c in 0..color_channels {
            out[c] = v;
        }
        if has_alpha {
            out[3] = if pixel[3] >= DEFAULT_THRESHOLD { 255 } else { 0 };
        }
    })
}

// ============================================================================
// Limiarize
// ============================================================================

/// Threshold to zero.
///
/// Pixels with intensity below `threshold` turn black; all others pass
/// through unchanged. Alpha is preserved.
pub fn limiarize(input: &PixelBuffer, threshold: u8) -> PixelBuffer {
    let color_channels = input.color_channels();
    let has_alpha = input.has_alpha();

    input.map(|pixel, mut out| {
        let keep = intensity(pixel, GrayscaleMethod::Average) >= threshold;
        for c in 0..color_channels {
            out[c] = if keep { pixel[c] } else { 0 };
        }
        if has_alpha {
            out[3] = pixel[3];
        }
    })
}
