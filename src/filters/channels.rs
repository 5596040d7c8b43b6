//! Single color channel extraction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{FilterError, FilterResult};

/// One of the three color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Red,
    Green,
    Blue,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Red, ChannelKind::Green, ChannelKind::Blue];

    /// Sample offset of this channel within an RGB(A) pixel.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ChannelKind::Red => 0,
            ChannelKind::Green => 1,
            ChannelKind::Blue => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Red => "red",
            ChannelKind::Green => "green",
            ChannelKind::Blue => "blue",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(ChannelKind::Red),
            "green" | "g" => Ok(ChannelKind::Green),
            "blue" | "b" => Ok(ChannelKind::Blue),
            other => Err(FilterError::InvalidArgument(format!(
                "unknown channel '{}' (expected red, green or blue)",
                other
            ))),
        }
    }
}

/// Keep one color channel and zero the other two.
///
/// The channel count is preserved and alpha is copied. A single-channel
/// image has no separate colors and is returned unchanged.
pub fn channel(color: ChannelKind, input: &PixelBuffer) -> PixelBuffer {
    if input.channels() == 1 {
        return input.clone();
    }
    let keep = color.index();
    let has_alpha = input.has_alpha();

    input.map(|pixel, mut out| {
        out[keep] = pixel[keep];
        if has_alpha {
            out[3] = pixel[3];
        }
    })
}

/// Extract one color channel as a single-channel image.
pub fn channel_plane(color: ChannelKind, input: &PixelBuffer) -> FilterResult<PixelBuffer> {
    if input.channels() == 1 {
        return Ok(input.clone());
    }
    let keep = color.index();
    input.map_to(1, |pixel, mut out| out[0] = pixel[keep])
}
