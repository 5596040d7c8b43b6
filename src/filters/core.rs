//! Core utilities shared by the neighborhood filters.
//!
//! This module provides:
//! - Clamp-to-edge coordinate handling
//! - Binomial smoothing and derivative kernel generation
//! - Separable two-pass convolution over a single plane
//! - General 2D convolution with a user-supplied [`Kernel`]
//!
//! ## Border Policy
//!
//! Every neighborhood filter (blur, median and the other rank filters, border
//! detection, [`convolve`]) samples out-of-bounds coordinates from the nearest
//! valid pixel. Nothing ever reads outside `[0, width) x [0, height)`.

use ndarray::{Array2, Array3, ArrayView2, Zip};

use crate::buffer::PixelBuffer;
use crate::error::{FilterError, FilterResult};

/// Largest accepted kernel radius (window side `2 * 10 + 1 = 21`).
pub const MAX_KERNEL_RADIUS: u32 = 10;

/// Validate a kernel radius and convert it for indexing.
pub(crate) fn check_radius(radius: u32) -> FilterResult<usize> {
    if radius > MAX_KERNEL_RADIUS {
        return Err(FilterError::InvalidArgument(format!(
            "kernel radius {} exceeds maximum {}",
            radius, MAX_KERNEL_RADIUS
        )));
    }
    Ok(radius as usize)
}

/// Clamp a possibly out-of-bounds coordinate to `[0, len)`.
#[inline]
pub fn clamp_coord(v: isize, len: usize) -> usize {
    v.clamp(0, len as isize - 1) as usize
}

/// Row `n` of Pascal's triangle (length `n + 1`).
pub fn binomial_row(n: usize) -> Vec<f32> {
    let mut row = vec![1.0f32];
    for _ in 0..n {
        let mut next = Vec::with_capacity(row.len() + 1);
        next.push(1.0);
        for pair in row.windows(2) {
            next.push(pair[0] + pair[1]);
        }
        next.push(1.0);
        row = next;
    }
    row
}

/// Normalized 1D binomial kernel of the given radius.
///
/// Radius 1 gives `[1, 2, 1] / 4`, radius 2 gives `[1, 4, 6, 4, 1] / 16`.
/// Binomial weights converge to a Gaussian as the radius grows.
pub fn smoothing_kernel_1d(radius: usize) -> Vec<f32> {
    let row = binomial_row(2 * radius);
    let sum: f32 = row.iter().sum();
    row.into_iter().map(|v| v / sum).collect()
}

/// 1D binomial derivative kernel of the given radius (unnormalized).
///
/// Radius 1 gives the Sobel `[-1, 0, 1]`, radius 2 gives `[-1, -2, 0, 2, 1]`.
pub fn derivative_kernel_1d(radius: usize) -> Vec<f32> {
    if radius == 0 {
        return vec![0.0];
    }
    let base = binomial_row(2 * radius - 1);
    let len = 2 * radius + 1;
    (0..len)
        .map(|k| {
            let left = if k >= 1 { base[k - 1] } else { 0.0 };
            let right = if k < base.len() { base[k] } else { 0.0 };
            left - right
        })
        .collect()
}

/// Two-pass (horizontal, then vertical) convolution of a single plane.
///
/// Both kernels must have odd length. Borders are clamped to the edge.
pub fn separable_pass(plane: ArrayView2<f32>, kernel_x: &[f32], kernel_y: &[f32]) -> Array2<f32> {
    let (height, width) = plane.dim();
    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;

    // Horizontal pass
    let mut temp = Array2::<f32>::zeros((height, width));
    Zip::indexed(&mut temp).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel_x.iter().enumerate() {
            let sx = clamp_coord(x as isize + ki as isize - half_x, width);
            sum += plane[[y, sx]] * kv;
        }
        *out = sum;
    });

    // Vertical pass
    let mut result = Array2::<f32>::zeros((height, width));
    Zip::indexed(&mut result).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel_y.iter().enumerate() {
            let sy = clamp_coord(y as isize + ki as isize - half_y, height);
            sum += temp[[sy, x]] * kv;
        }
        *out = sum;
    });

    result
}

/// Round a filtered value back into the 0-255 sample range.
#[inline]
pub fn to_sample(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Square convolution kernel with odd side length.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a kernel from row-major weights.
    ///
    /// `size` must be odd, at most `2 * MAX_KERNEL_RADIUS + 1`, and
    /// `weights.len()` must equal `size * size`.
    pub fn new(size: usize, weights: Vec<f32>) -> FilterResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(FilterError::InvalidArgument(format!(
                "kernel size must be odd, got {}",
                size
            )));
        }
        check_radius((size / 2) as u32)?;
        if weights.len() != size * size {
            return Err(FilterError::InvalidArgument(format!(
                "kernel of size {} needs {} weights, got {}",
                size,
                size * size,
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(FilterError::InvalidArgument("kernel weights must be finite".into()));
        }
        Ok(Self { size, weights })
    }

    /// Outer product of a vertical and a horizontal 1D kernel.
    pub fn from_separable(column: &[f32], row: &[f32]) -> FilterResult<Self> {
        if column.len() != row.len() {
            return Err(FilterError::InvalidArgument(format!(
                "separable kernel halves differ in length ({} vs {})",
                column.len(),
                row.len()
            )));
        }
        let weights = column
            .iter()
            .flat_map(|&cy| row.iter().map(move |&rx| cy * rx))
            .collect();
        Self::new(row.len(), weights)
    }

    /// Normalized binomial smoothing kernel of the given radius.
    pub fn smoothing(radius: u32) -> FilterResult<Self> {
        let k = smoothing_kernel_1d(check_radius(radius)?);
        Self::from_separable(&k, &k)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    #[inline]
    pub fn weight(&self, ky: usize, kx: usize) -> f32 {
        self.weights[ky * self.size + kx]
    }
}

/// Convolve every color channel with `kernel`, alpha untouched.
///
/// Borders are clamped to the edge; results are rounded and clamped to 0-255.
pub fn convolve(input: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let view = input.view();
    let (height, width, channels) = view.dim();
    let color_channels = input.color_channels();
    let half = kernel.radius() as isize;

    let mut output = Array3::<u8>::zeros((height, width, channels));
    Zip::indexed(&mut output).par_for_each(|(y, x, c), out| {
        if c >= color_channels {
            *out = view[[y, x, c]];
            return;
        }
        let mut sum = 0.0f32;
        for ky in 0..kernel.size() {
            let sy = clamp_coord(y as isize + ky as isize - half, height);
            for kx in 0..kernel.size() {
                let sx = clamp_coord(x as isize + kx as isize - half, width);
                sum += view[[sy, sx, c]] as f32 * kernel.weight(ky, kx);
            }
        }
        *out = to_sample(sum);
    });

    PixelBuffer::from_filtered(output)
}
