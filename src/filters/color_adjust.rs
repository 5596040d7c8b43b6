//! Pointwise tonal adjustments: Negative, Dynamic Compression.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - processes the single channel
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha

use crate::buffer::PixelBuffer;
use crate::error::{FilterError, FilterResult};

// ============================================================================
// Negative
// ============================================================================

/// Invert image colors.
///
/// Every color sample `v` becomes `255 - v`; alpha is preserved. Applying
/// the filter twice restores the input.
pub fn negative(input: &PixelBuffer) -> PixelBuffer {
    let color_channels = input.color_channels();
    let has_alpha = input.has_alpha();

    input.map(|pixel, mut out| {
        for c in 0..color_channels {
            out[c] = 255 - pixel[c];
        }
        if has_alpha {
            out[3] = pixel[3];
        }
    })
}

// ============================================================================
// Dynamic Compression
// ============================================================================

/// Power-law range compression: `s = c * r^gamma` on normalized samples.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels
/// * `constant` - Output scale `c` (>= 0)
/// * `gamma` - Exponent (> 0); below 1 brightens shadows, above 1 darkens
///
/// # Returns
/// Adjusted image with same channel count, or `InvalidArgument` for
/// non-finite or out-of-domain parameters
pub fn dynamic_compression(input: &PixelBuffer, constant: f32, gamma: f32) -> FilterResult<PixelBuffer> {
    if !constant.is_finite() || constant < 0.0 {
        return Err(FilterError::InvalidArgument(format!(
            "compression constant must be finite and >= 0, got {}",
            constant
        )));
    }
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(FilterError::InvalidArgument(format!(
            "gamma must be finite and > 0, got {}",
            gamma
        )));
    }

    // Pre-compute lookup table
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let r = i as f32 / 255.0;
        *entry = (255.0 * constant * r.powf(gamma)).round().clamp(0.0, 255.0) as u8;
    }

    let color_channels = input.color_channels();
    let has_alpha = input.has_alpha();

    Ok(input.map(|pixel, mut out| {
        for c in 0..color_channels {
            out[c] = lut[pixel[c] as usize];
        }
        if has_alpha {
            out[3] = pixel[3];
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_u8_rgba() {
        let input = PixelBuffer::filled(2, 2, &[100, 0, 255, 128]).unwrap();
        let result = negative(&input);
        assert_eq!(result.get(0, 1).unwrap().to_vec(), vec![155, 255, 0, 128]);
    }

    #[test]
    fn test_negative_grayscale() {
        let input = PixelBuffer::from_raw(3, 1, 1, vec![0, 127, 255]).unwrap();
        assert_eq!(negative(&input).samples(), &[255, 128, 0]);
    }

    #[test]
    fn test_negative_involution() {
        let samples: Vec<u8> = (0..=255u8).cycle().take(8 * 4 * 3).collect();
        let input = PixelBuffer::from_raw(8, 4, 3, samples).unwrap();
        assert_eq!(negative(&negative(&input)), input);
    }

    #[test]
    fn test_dynamic_compression_identity() {
        let input = PixelBuffer::from_raw(4, 1, 1, vec![0, 64, 200, 255]).unwrap();
        let result = dynamic_compression(&input, 1.0, 1.0).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_dynamic_compression_gamma_brightens() {
        let input = PixelBuffer::filled(1, 1, &[64, 64, 64, 10]).unwrap();
        let result = dynamic_compression(&input, 1.0, 0.5).unwrap();
        let px = result.get(0, 0).unwrap();
        // sqrt(64 / 255) * 255 ≈ 127.75
        assert_eq!(px[0], 128);
        assert_eq!(px[3], 10);
    }

    #[test]
    fn test_dynamic_compression_rejects_bad_params() {
        let input = PixelBuffer::new(1, 1, 1).unwrap();
        assert!(dynamic_compression(&input, 1.0, 0.0).is_err());
        assert!(dynamic_compression(&input, -1.0, 1.0).is_err());
        assert!(dynamic_compression(&input, f32::NAN, 1.0).is_err());
    }
}
