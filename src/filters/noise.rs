//! Noise filters: Salt and Pepper, Median and the other rank filters.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - processes the single channel
//! - **RGB**: (height, width, 3) - processes all 3 channels
//! - **RGBA**: (height, width, 4) - rank filters preserve alpha; salt and
//!   pepper overwrites every channel of a hit pixel

use ndarray::{Array3, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{FilterError, FilterResult};
use crate::filters::core::{check_radius, clamp_coord};

/// Default probability that a pixel is hit by salt and pepper noise.
pub const DEFAULT_NOISE_PROBABILITY: f64 = 0.05;

// ============================================================================
// Salt and Pepper
// ============================================================================

/// Add salt and pepper noise.
///
/// Each pixel is hit independently with probability `probability`. A hit
/// pixel has ALL of its channels set to 0 (pepper) or 255 (salt) with equal
/// chance; other pixels pass through. Pixels are visited in row-major order
/// from a `StdRng` seeded with `seed`, so the output is a pure function of
/// the input, the probability and the seed.
///
/// # Returns
/// Noisy image, or `InvalidArgument` when `probability` is not in `[0, 1]`
pub fn salt_and_pepper(input: &PixelBuffer, probability: f64, seed: u64) -> FilterResult<PixelBuffer> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(FilterError::InvalidArgument(format!(
            "noise probability must be within [0, 1], got {}",
            probability
        )));
    }

    let mut output = input.clone().into_array();
    let mut rng = StdRng::seed_from_u64(seed);

    for mut pixel in output.lanes_mut(ndarray::Axis(2)) {
        if rng.gen::<f64>() < probability {
            let value = if rng.gen_bool(0.5) { 255 } else { 0 };
            pixel.fill(value);
        }
    }

    Ok(PixelBuffer::from_filtered(output))
}

// ============================================================================
// Rank Filters (Median, Min, Max, Midpoint)
// ============================================================================

/// Statistic taken over each sorted window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Median,
    Min,
    Max,
    /// `(min + max) / 2`, rounded down
    Midpoint,
}

impl Rank {
    #[inline]
    fn pick(self, sorted: &[u8]) -> u8 {
        let (low, high) = (sorted[0], sorted[sorted.len() - 1]);
        match self {
            Rank::Median => sorted[sorted.len() / 2],
            Rank::Min => low,
            Rank::Max => high,
            Rank::Midpoint => ((low as u16 + high as u16) / 2) as u8,
        }
    }
}

/// Apply a rank filter over a `(2r+1) x (2r+1)` window.
///
/// Each color channel is ranked independently; alpha is preserved. Borders
/// are clamped to the edge.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels
/// * `radius` - Window radius (0 returns a copy)
/// * `rank` - Statistic to keep
pub fn rank_filter(input: &PixelBuffer, radius: u32, rank: Rank) -> FilterResult<PixelBuffer> {
    let radius = check_radius(radius)?;
    if radius == 0 {
        return Ok(input.clone());
    }

    let view = input.view();
    let (height, width, channels) = view.dim();
    let color_channels = input.color_channels();
    let window_size = (radius * 2 + 1) * (radius * 2 + 1);

    let mut output = Array3::<u8>::zeros((height, width, channels));
    Zip::indexed(&mut output).par_for_each(|(y, x, c), out| {
        if c >= color_channels {
            *out = view[[y, x, c]];
            return;
        }

        let mut values: Vec<u8> = Vec::with_capacity(window_size);
        for dy in 0..=(radius * 2) {
            let sy = clamp_coord(y as isize + dy as isize - radius as isize, height);
            for dx in 0..=(radius * 2) {
                let sx = clamp_coord(x as isize + dx as isize - radius as isize, width);
                values.push(view[[sy, sx, c]]);
            }
        }

        values.sort_unstable();
        *out = rank.pick(&values);
    });

    Ok(PixelBuffer::from_filtered(output))
}

/// Median filter: removes salt and pepper noise while preserving edges.
pub fn median(input: &PixelBuffer, radius: u32) -> FilterResult<PixelBuffer> {
    rank_filter(input, radius, Rank::Median)
}
