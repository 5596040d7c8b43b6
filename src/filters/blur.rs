//! Gaussian-like blur.
//!
//! Uses a separable binomial kernel (radius 1 is the classic 3x3
//! `[1, 2, 1]` kernel) with clamp-to-edge borders. All channels, alpha
//! included, are blurred.

use ndarray::{Array3, Axis};

use crate::buffer::PixelBuffer;
use crate::error::FilterResult;
use crate::filters::core::{check_radius, separable_pass, smoothing_kernel_1d, to_sample};

/// Apply a binomial blur of the given radius.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels
/// * `radius` - Kernel radius (window side `2 * radius + 1`); 0 returns a copy
///
/// # Returns
/// Blurred image with same dimensions, or `InvalidArgument` when the radius
/// exceeds [`MAX_KERNEL_RADIUS`](crate::filters::core::MAX_KERNEL_RADIUS)
pub fn gaussian_blur(input: &PixelBuffer, radius: u32) -> FilterResult<PixelBuffer> {
    let radius = check_radius(radius)?;
    if radius == 0 {
        return Ok(input.clone());
    }

    let kernel = smoothing_kernel_1d(radius);
    let view = input.view();
    let mut output = Array3::<u8>::zeros(view.dim());

    // Work in f32 for precision
    for (c, mut out_plane) in output.axis_iter_mut(Axis(2)).enumerate() {
        let plane = view.index_axis(Axis(2), c).mapv(|v| v as f32);
        let blurred = separable_pass(plane.view(), &kernel, &kernel);
        out_plane.zip_mut_with(&blurred, |dst, &src| *dst = to_sample(src));
    }

    Ok(PixelBuffer::from_filtered(output))
}
