//! Border detection (generalized Sobel).
//!
//! The gradient is taken over pixel intensity with a binomial derivative
//! kernel along one axis and a binomial smoothing kernel along the other.
//! Radius 1 is exactly the classic 3x3 Sobel operator:
//!
//! ```text
//!   Gx = [-1 0 1]      Gy = [-1 -2 -1]
//!        [-2 0 2]           [ 0  0  0]
//!        [-1 0 1]           [ 1  2  1]
//! ```
//!
//! Larger radii are rescaled so that a unit step produces the same response
//! as radius 1.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 3, or 4 channels:
//! - **Grayscale**: (height, width, 1) - uses single channel directly
//! - **RGB**: (height, width, 3) - uses the RGB mean
//! - **RGBA**: (height, width, 4) - uses the RGB mean, preserves alpha
//!
//! Output is always grayscale (same value for all color channels).

use ndarray::{Array3, Axis, Zip};

use crate::buffer::PixelBuffer;
use crate::error::{FilterError, FilterResult};
use crate::filters::core::{binomial_row, check_radius, derivative_kernel_1d, separable_pass, to_sample};
use crate::filters::grayscale::intensity_plane;

/// Gradient magnitude edge map.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels
/// * `radius` - Operator radius, 1 for the 3x3 Sobel
///
/// # Returns
/// Edge image with same channel count; `InvalidArgument` for radius 0 or a
/// radius above the maximum
pub fn border_detection(input: &PixelBuffer, radius: u32) -> FilterResult<PixelBuffer> {
    if radius == 0 {
        return Err(FilterError::InvalidArgument(
            "border detection needs a radius of at least 1".into(),
        ));
    }
    let radius = check_radius(radius)?;

    let derivative = derivative_kernel_1d(radius);
    let smoothing = binomial_row(2 * radius);

    // Rescale to the radius-1 gain (smoothing sum 4, derivative sum 1)
    let positive: f32 = derivative.iter().filter(|&&v| v > 0.0).sum();
    let gain: f32 = smoothing.iter().sum::<f32>() * positive;
    let scale = 4.0 / gain;

    let plane = intensity_plane(input).mapv(|v| v as f32);
    let gx = separable_pass(plane.view(), &derivative, &smoothing);
    let gy = separable_pass(plane.view(), &smoothing, &derivative);

    let color_channels = input.color_channels();
    let view = input.view();
    let mut output = Array3::<u8>::zeros(view.dim());

    Zip::from(output.lanes_mut(Axis(2)))
        .and(&gx)
        .and(&gy)
        .and(view.lanes(Axis(2)))
        .par_for_each(|mut out, &dx, &dy, pixel| {
            let edge = to_sample((dx * dx + dy * dy).sqrt() * scale);
            for c in 0..color_channels {
                out[c] = edge;
            }
            if pixel.len() == 4 {
                out[3] = pixel[3];
            }
        });

    Ok(PixelBuffer::from_filtered(output))
}
