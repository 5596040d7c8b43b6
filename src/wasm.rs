//! WebAssembly exports for the Kayn filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat row-major byte arrays with explicit dimensions;
//! errors are returned as JS string values.

use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::error::FilterError;
use crate::filters::{self, ChannelKind, FilterKind, FilterParams};

fn to_js(err: FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_buffer(data: &[u8], width: u32, height: u32, channels: usize) -> Result<PixelBuffer, JsValue> {
    PixelBuffer::from_raw(width, height, channels, data.to_vec()).map_err(to_js)
}

// ============================================================================
// Filters
// ============================================================================

/// Apply a filter by name.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1, 3 or 4
/// * `name` - Filter name, e.g. "equalize" or "salt_and_pepper"
/// * `params_json` - Optional JSON object of filter parameters
///
/// # Returns
/// Flat array of bytes with the same layout as the input
#[wasm_bindgen]
pub fn apply_filter_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    name: &str,
    params_json: Option<String>,
) -> Result<Vec<u8>, JsValue> {
    let kind: FilterKind = name.parse().map_err(to_js)?;
    let params: FilterParams = match params_json.as_deref() {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(json)
            .map_err(|e| to_js(FilterError::Config(e)))?,
        _ => FilterParams::default(),
    };

    let input = to_buffer(data, width, height, channels)?;
    let output = filters::apply(kind, &input, &params).map_err(to_js)?;
    Ok(output.into_raw_vec())
}

/// Keep one color channel ("red", "green" or "blue").
#[wasm_bindgen]
pub fn channel_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    color: &str,
) -> Result<Vec<u8>, JsValue> {
    let color: ChannelKind = color.parse().map_err(to_js)?;
    let input = to_buffer(data, width, height, channels)?;
    Ok(filters::channel(color, &input).into_raw_vec())
}

/// Normalized intensity histogram (256 values, fullest bucket 1.0).
#[wasm_bindgen]
pub fn histogram_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    channels: usize,
) -> Result<Vec<f64>, JsValue> {
    let input = to_buffer(data, width, height, channels)?;
    Ok(filters::histogram(&input).to_vec())
}
