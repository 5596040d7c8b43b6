//! Histogram-driven filters: Histogram, Equalize, Normalize, Otsu.
//!
//! All histograms are built over pixel intensity (see
//! [`intensity`](crate::filters::grayscale::intensity)) with 256 buckets.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - processes the single channel
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - processes RGB, preserves alpha

use ndarray::{ArrayView1, Axis};
use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::filters::grayscale::{intensity, GrayscaleMethod};
use crate::filters::stylize::binarize;

// ============================================================================
// Histogram
// ============================================================================

/// Raw intensity histogram (pixel count per level).
pub fn histogram_counts(input: &PixelBuffer) -> [u64; 256] {
    let channels = input.channels();

    input
        .samples()
        .par_chunks(channels)
        .fold(
            || [0u64; 256],
            |mut hist, pixel| {
                hist[intensity(ArrayView1::from(pixel), GrayscaleMethod::Average) as usize] += 1;
                hist
            },
        )
        .reduce(
            || [0u64; 256],
            |mut a, b| {
                for (acc, v) in a.iter_mut().zip(b.iter()) {
                    *acc += v;
                }
                a
            },
        )
}

/// Intensity histogram normalized so the fullest bucket is exactly 1.0.
pub fn histogram(input: &PixelBuffer) -> [f64; 256] {
    let counts = histogram_counts(input);
    let max = counts.iter().copied().max().unwrap_or(0);

    let mut normalized = [0.0f64; 256];
    if max == 0 {
        return normalized;
    }
    for (out, &count) in normalized.iter_mut().zip(counts.iter()) {
        *out = count as f64 / max as f64;
    }
    normalized
}

// ============================================================================
// Equalize
// ============================================================================

/// Lookup table mapping each level through the normalized CDF.
///
/// A histogram with a single occupied level yields the identity table.
fn equalization_lut(hist: &[u64; 256], total: u64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = i as u8;
    }

    let cdf_min = hist.iter().copied().find(|&count| count > 0).unwrap_or(0);
    if total == 0 || total <= cdf_min {
        return lut;
    }

    let range = (total - cdf_min) as f64;
    let mut cdf = 0u64;
    for (level, &count) in hist.iter().enumerate() {
        cdf += count;
        let scaled = cdf.saturating_sub(cdf_min) as f64 / range * 255.0;
        lut[level] = scaled.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Histogram equalization.
///
/// The lookup table is derived from the intensity histogram and applied to
/// each color channel; alpha is preserved. A uniform image is returned
/// unchanged.
pub fn equalize(input: &PixelBuffer) -> PixelBuffer {
    let hist = histogram_counts(input);
    let lut = equalization_lut(&hist, input.pixel_count() as u64);

    let color_channels = input.color_channels();
    let has_alpha = input.has_alpha();

    input.map(|pixel, mut out| {
        for c in 0..color_channels {
            out[c] = lut[pixel[c] as usize];
        }
        if has_alpha {
            out[3] = pixel[3];
        }
    })
}

// ============================================================================
// Normalize
// ============================================================================

/// Contrast stretch (auto levels without clipping).
///
/// Each color channel is stretched independently from its own min..max to
/// 0..255. A channel holding a single value is left unchanged.
pub fn normalize(input: &PixelBuffer) -> PixelBuffer {
    let view = input.view();
    let color_channels = input.color_channels();
    let has_alpha = input.has_alpha();

    // Process each channel independently
    let luts: Vec<[u8; 256]> = (0..color_channels)
        .map(|c| {
            let plane = view.index_axis(Axis(2), c);
            let low = plane.iter().copied().min().unwrap_or(0);
            let high = plane.iter().copied().max().unwrap_or(255);

            let mut lut = [0u8; 256];
            for (i, entry) in lut.iter_mut().enumerate() {
                *entry = if high > low {
                    let v = i.clamp(low as usize, high as usize) as f32;
                    ((v - low as f32) / (high - low) as f32 * 255.0).round() as u8
                } else {
                    i as u8
                };
            }
            lut
        })
        .collect();

    input.map(|pixel, mut out| {
        for (c, lut) in luts.iter().enumerate() {
            out[c] = lut[pixel[c] as usize];
        }
        if has_alpha {
            out[3] = pixel[3];
        }
    })
}

// ============================================================================
// Otsu
// ============================================================================

/// Threshold chosen by Otsu's method.
///
/// Maximizes the between-class variance of the intensity histogram. The
/// returned value is the first level of the bright class, so it can be
/// passed to [`binarize`] directly.
pub fn otsu_threshold(input: &PixelBuffer) -> u8 {
    let hist = histogram_counts(input);
    let total: u64 = hist.iter().sum();
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut sum_back = 0.0f64;
    let mut weight_back = 0u64;
    let mut best_level = 0usize;
    let mut best_variance = -1.0f64;

    for (level, &count) in hist.iter().enumerate() {
        weight_back += count;
        if weight_back == 0 {
            continue;
        }
        let weight_fore = total - weight_back;
        if weight_fore == 0 {
            break;
        }

        sum_back += level as f64 * count as f64;
        let mean_back = sum_back / weight_back as f64;
        let mean_fore = (sum_all - sum_back) / weight_fore as f64;

        let variance = weight_back as f64 * weight_fore as f64 * (mean_back - mean_fore).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_level = level;
        }
    }

    (best_level + 1).min(255) as u8
}

/// Binarize with the Otsu threshold.
pub fn otsu_binarize(input: &PixelBuffer) -> PixelBuffer {
    binarize(input, otsu_threshold(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBufferBuilder;

    fn two_level(width: u32, height: u32, low: u8, high: u8) -> PixelBuffer {
        let mut builder = PixelBufferBuilder::new(width, height, 1).unwrap();
        for y in 0..height {
            for x in 0..width {
                let v = if x < width / 2 { low } else { high };
                builder.set(x, y, &[v]).unwrap();
            }
        }
        builder.build()
    }

    #[test]
    fn test_histogram_counts_intensity() {
        let input = PixelBuffer::from_raw(3, 1, 3, vec![0, 0, 0, 30, 60, 90, 60, 60, 60]).unwrap();
        let counts = histogram_counts(&input);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[60], 2);
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_histogram_normalized_max_is_one() {
        let input = PixelBuffer::from_raw(4, 1, 1, vec![10, 10, 10, 200]).unwrap();
        let hist = histogram(&input);
        assert_eq!(hist[10], 1.0);
        assert!((hist[200] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(hist[0], 0.0);
    }

    #[test]
    fn test_equalize_two_levels() {
        let input = two_level(4, 2, 90, 140);
        let result = equalize(&input);
        let mut values: Vec<u8> = result.samples().to_vec();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values, vec![0, 255]);
    }

    #[test]
    fn test_equalize_uniform_is_identity() {
        let input = PixelBuffer::filled(5, 5, &[77, 77, 77, 200]).unwrap();
        assert_eq!(equalize(&input), input);
    }

    #[test]
    fn test_equalize_lut_monotonic() {
        let samples: Vec<u8> = (0..64u32).map(|i| (i * i % 251) as u8).collect();
        let input = PixelBuffer::from_raw(8, 8, 1, samples).unwrap();
        let lut = equalization_lut(&histogram_counts(&input), 64);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lut[250], 255);
    }

    #[test]
    fn test_normalize_stretches_range() {
        let input = PixelBuffer::from_raw(3, 1, 1, vec![50, 100, 150]).unwrap();
        assert_eq!(normalize(&input).samples(), &[0, 128, 255]);
    }

    #[test]
    fn test_normalize_flat_channel_unchanged() {
        let mut builder = PixelBufferBuilder::new(2, 1, 4).unwrap();
        builder.set(0, 0, &[10, 40, 90, 5]).unwrap();
        builder.set(1, 0, &[20, 40, 90, 6]).unwrap();
        let result = normalize(&builder.build());
        assert_eq!(result.samples(), &[0, 40, 90, 5, 255, 40, 90, 6]);
    }

    #[test]
    fn test_otsu_splits_bimodal() {
        let input = two_level(6, 2, 50, 200);
        let t = otsu_threshold(&input);
        assert!(t > 50 && t <= 200, "threshold {}", t);

        let result = otsu_binarize(&input);
        assert_eq!(result.get(0, 0).unwrap()[0], 0);
        assert_eq!(result.get(5, 1).unwrap()[0], 255);
    }
}
