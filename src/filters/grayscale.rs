//! Grayscale conversion filter and pixel intensity.
//!
//! Intensity is the quantity every intensity-driven filter (binarize,
//! equalize, histogram, border detection) works on:
//! - **1 channel**: the sample itself
//! - **3/4 channels**: rounded mean of R, G, B (alpha never contributes)
//!
//! [`GrayscaleMethod::Luma`] swaps the mean for ITU-R BT.709 luminosity.

use ndarray::{Array2, ArrayView1, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// ITU-R BT.709 luminosity coefficients
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// How color pixels are reduced to one intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleMethod {
    /// `round((r + g + b) / 3)`
    #[default]
    Average,
    /// `round(0.2126 r + 0.7152 g + 0.0722 b)`
    Luma,
}

/// Intensity of one pixel.
#[inline]
pub fn intensity(pixel: ArrayView1<u8>, method: GrayscaleMethod) -> u8 {
    if pixel.len() < 3 {
        return pixel[0];
    }
    let (r, g, b) = (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32);
    let value = match method {
        GrayscaleMethod::Average => (r + g + b) / 3.0,
        GrayscaleMethod::Luma => LUMA_R * r + LUMA_G * g + LUMA_B * b,
    };
    value.round().clamp(0.0, 255.0) as u8
}

/// Mean intensity of every pixel as a `(height, width)` plane.
pub fn intensity_plane(input: &PixelBuffer) -> Array2<u8> {
    let (height, width) = (input.height() as usize, input.width() as usize);
    let mut plane = Array2::<u8>::zeros((height, width));

    Zip::from(&mut plane)
        .and(input.view().lanes(Axis(2)))
        .par_for_each(|out, pixel| *out = intensity(pixel, GrayscaleMethod::Average));

    plane
}

/// Convert an image to grayscale.
///
/// The channel count is preserved: every color channel receives the
/// intensity and alpha (if present) is copied. Applying the filter twice
/// gives the same result as applying it once.
pub fn grayscale(input: &PixelBuffer, method: GrayscaleMethod) -> PixelBuffer {
    let color_channels = input.color_channels();
    let has_alpha = input.has_alpha();

    input.map(|pixel, mut out| {
        let gray = intensity(pixel, method);
        for c in 0..color_channels {
            out[c] = gray;
        }
        if has_alpha {
            out[3] = pixel[3];
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBufferBuilder;

    #[test]
    fn test_intensity_average_rounds() {
        let px = [10u8, 20, 31];
        // 61 / 3 = 20.33
        assert_eq!(intensity(ArrayView1::from(&px[..]), GrayscaleMethod::Average), 20);
        let px = [0u8, 1, 1];
        // 2 / 3 = 0.67
        assert_eq!(intensity(ArrayView1::from(&px[..]), GrayscaleMethod::Average), 1);
    }

    #[test]
    fn test_intensity_single_channel() {
        let px = [42u8];
        assert_eq!(intensity(ArrayView1::from(&px[..]), GrayscaleMethod::Luma), 42);
    }

    #[test]
    fn test_intensity_ignores_alpha() {
        let px = [90u8, 90, 90, 3];
        assert_eq!(intensity(ArrayView1::from(&px[..]), GrayscaleMethod::Average), 90);
    }

    #[test]
    fn test_grayscale_red_luma() {
        let input = PixelBuffer::filled(1, 1, &[255, 0, 0, 255]).unwrap();
        let result = grayscale(&input, GrayscaleMethod::Luma);
        let px = result.get(0, 0).unwrap();

        // 0.2126 * 255 ≈ 54
        assert!((px[0] as i32 - 54).abs() <= 1);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_grayscale_preserves_alpha() {
        let input = PixelBuffer::filled(2, 2, &[128, 64, 32, 100]).unwrap();
        let result = grayscale(&input, GrayscaleMethod::Average);
        assert_eq!(result.get(1, 1).unwrap().to_vec(), vec![75, 75, 75, 100]);
    }

    #[test]
    fn test_grayscale_idempotent_both_methods() {
        let mut builder = PixelBufferBuilder::new(3, 1, 3).unwrap();
        builder.set(0, 0, &[255, 0, 0]).unwrap();
        builder.set(1, 0, &[1, 2, 4]).unwrap();
        builder.set(2, 0, &[250, 251, 3]).unwrap();
        let input = builder.build();

        for method in [GrayscaleMethod::Average, GrayscaleMethod::Luma] {
            let once = grayscale(&input, method);
            assert_eq!(grayscale(&once, method), once);
        }
    }

    #[test]
    fn test_intensity_plane_shape() {
        let input = PixelBuffer::filled(4, 3, &[30, 60, 90]).unwrap();
        let plane = intensity_plane(&input);
        assert_eq!(plane.dim(), (3, 4));
        assert!(plane.iter().all(|&v| v == 60));
    }
}
