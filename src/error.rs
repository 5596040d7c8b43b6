//! Error types for buffers and filters.

use thiserror::Error;

/// Error type for pixel buffers, filters and configuration.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Pixel coordinate outside the buffer bounds.
    #[error("pixel ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Out-of-domain parameter or unrecognized channel name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Filter name that does not match any known filter.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// Sample storage does not match the declared dimensions.
    #[error("malformed buffer: {0}")]
    MalformedBuffer(String),

    /// Engine configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for buffer and filter operations.
pub type FilterResult<T> = Result<T, FilterError>;
