//! Filter modules for image processing effects.
//!
//! ## Supported Formats
//!
//! All filters accept [`PixelBuffer`]s with 1, 3, or 4 channels:
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale8 | (H, W, 1) | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Multi-channel aware** - Handles 1, 3, or 4 channels efficiently
//! - **Alpha preservation** - Alpha (if present) is preserved unless noted
//! - **Fresh output** - Input is never modified; a new buffer is returned
//! - **Clamp-to-edge** - Neighborhood filters replicate border pixels
//! - **Thread-safe** - Use rayon for parallel processing where available
//!
//! ## Filter Categories
//!
//! - **Pixel-wise**: grayscale, negative, dynamic_compression
//! - **Tonal**: equalize, normalize, histogram
//! - **Threshold**: binarize, limiarize, otsu_binarize
//! - **Neighborhood**: blur, blur_median, rank filters, convolve
//! - **Edge detection**: border_detection
//! - **Noise**: salt_and_pepper
//!
//! [`apply`] dispatches a [`FilterKind`] with its [`FilterParams`].

pub mod blur;
pub mod channels;
pub mod color_adjust;
pub mod core;
pub mod edge;
pub mod grayscale;
pub mod levels_curves;
pub mod noise;
pub mod stylize;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::error::{FilterError, FilterResult};

pub use self::channels::{channel, channel_plane, ChannelKind};
pub use self::core::{convolve, Kernel, MAX_KERNEL_RADIUS};
pub use self::grayscale::GrayscaleMethod;
pub use self::levels_curves::{histogram, histogram_counts, otsu_threshold};
pub use self::noise::Rank;

/// Every filter reachable through [`apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Grayscale,
    Equalize,
    Negative,
    Binarize,
    Blur,
    BlurMedian,
    SaltAndPepper,
    BorderDetection,
    Normalize,
    Limiarize,
    DynamicCompression,
    NoiseReductionMin,
    NoiseReductionMax,
    NoiseReductionMidpoint,
    OtsuBinarize,
}

impl FilterKind {
    pub const ALL: [FilterKind; 15] = [
        FilterKind::Grayscale,
        FilterKind::Equalize,
        FilterKind::Negative,
        FilterKind::Binarize,
        FilterKind::Blur,
        FilterKind::BlurMedian,
        FilterKind::SaltAndPepper,
        FilterKind::BorderDetection,
        FilterKind::Normalize,
        FilterKind::Limiarize,
        FilterKind::DynamicCompression,
        FilterKind::NoiseReductionMin,
        FilterKind::NoiseReductionMax,
        FilterKind::NoiseReductionMidpoint,
        FilterKind::OtsuBinarize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Equalize => "equalize",
            FilterKind::Negative => "negative",
            FilterKind::Binarize => "binarize",
            FilterKind::Blur => "blur",
            FilterKind::BlurMedian => "blur_median",
            FilterKind::SaltAndPepper => "salt_and_pepper",
            FilterKind::BorderDetection => "border_detection",
            FilterKind::Normalize => "normalize",
            FilterKind::Limiarize => "limiarize",
            FilterKind::DynamicCompression => "dynamic_compression",
            FilterKind::NoiseReductionMin => "noise_reduction_min",
            FilterKind::NoiseReductionMax => "noise_reduction_max",
            FilterKind::NoiseReductionMidpoint => "noise_reduction_midpoint",
            FilterKind::OtsuBinarize => "otsu_binarize",
        }
    }

    /// Whether the filter reads a neighborhood (and so `kernel_radius`).
    pub fn uses_radius(self) -> bool {
        matches!(
            self,
            FilterKind::Blur
                | FilterKind::BlurMedian
                | FilterKind::BorderDetection
                | FilterKind::NoiseReductionMin
                | FilterKind::NoiseReductionMax
                | FilterKind::NoiseReductionMidpoint
        )
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        FilterKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| FilterError::UnknownFilter(s.to_string()))
    }
}

/// Tunable inputs shared by the parameterized filters.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Binarize / limiarize cut-off
    pub threshold: u8,
    /// Neighborhood radius (window side `2r + 1`)
    pub kernel_radius: u32,
    /// Salt and pepper hit probability
    pub noise_probability: f64,
    /// Salt and pepper seed
    pub rng_seed: u64,
    pub grayscale: GrayscaleMethod,
    /// Dynamic compression scale `c`
    pub constant: f32,
    /// Dynamic compression exponent
    pub gamma: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            threshold: stylize::DEFAULT_THRESHOLD,
            kernel_radius: 1,
            noise_probability: noise::DEFAULT_NOISE_PROBABILITY,
            rng_seed: 0,
            grayscale: GrayscaleMethod::Average,
            constant: 1.0,
            gamma: 1.0,
        }
    }
}

impl FilterParams {
    /// Set the threshold from a wider integer, clamping into 0-255.
    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold.clamp(0, 255) as u8;
        self
    }

    pub fn with_radius(mut self, radius: u32) -> Self {
        self.kernel_radius = radius;
        self
    }

    pub fn with_noise(mut self, probability: f64, seed: u64) -> Self {
        self.noise_probability = probability;
        self.rng_seed = seed;
        self
    }
}

/// Run `kind` over `input`.
///
/// Parameter validation happens inside the individual filters before any
/// output is allocated, so an error never comes with partial output.
pub fn apply(kind: FilterKind, input: &PixelBuffer, params: &FilterParams) -> FilterResult<PixelBuffer> {
    debug!(
        filter = %kind,
        width = input.width(),
        height = input.height(),
        channels = input.channels(),
        "applying filter"
    );

    let radius = params.kernel_radius;
    match kind {
        FilterKind::Grayscale => Ok(grayscale::grayscale(input, params.grayscale)),
        FilterKind::Equalize => Ok(levels_curves::equalize(input)),
        FilterKind::Negative => Ok(color_adjust::negative(input)),
        FilterKind::Binarize => Ok(stylize::binarize(input, params.threshold)),
        FilterKind::Blur => blur::gaussian_blur(input, radius),
        FilterKind::BlurMedian => noise::median(input, radius),
        FilterKind::SaltAndPepper => {
            noise::salt_and_pepper(input, params.noise_probability, params.rng_seed)
        }
        FilterKind::BorderDetection => edge::border_detection(input, radius),
        FilterKind::Normalize => Ok(levels_curves::normalize(input)),
        FilterKind::Limiarize => Ok(stylize::limiarize(input, params.threshold)),
        FilterKind::DynamicCompression => {
            color_adjust::dynamic_compression(input, params.constant, params.gamma)
        }
        FilterKind::NoiseReductionMin => noise::rank_filter(input, radius, Rank::Min),
        FilterKind::NoiseReductionMax => noise::rank_filter(input, radius, Rank::Max),
        FilterKind::NoiseReductionMidpoint => noise::rank_filter(input, radius, Rank::Midpoint),
        FilterKind::OtsuBinarize => {
            let threshold = otsu_threshold(input);
            debug!(threshold, "otsu threshold selected");
            Ok(stylize::binarize(input, threshold))
        }
    }
}
