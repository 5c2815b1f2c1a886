//! Error types shared across the thumbsink crates.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Pixel format not supported by the operation.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Frame dimensions do not match what the operation expects.
    #[error("Dimension mismatch: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}")]
    DimensionMismatch {
        /// Expected width in pixels.
        expected_width: u32,
        /// Expected height in pixels.
        expected_height: u32,
        /// Actual width in pixels.
        actual_width: u32,
        /// Actual height in pixels.
        actual_height: u32,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        CoreError::InvalidParameter(msg.into())
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        CoreError::UnsupportedFormat(msg.into())
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
