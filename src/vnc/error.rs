//! Error types for the display core.
//!
//! Only lookups and validation of externally supplied values can fail. Pixel
//! conversion and transform geometry have no error path: their inputs are
//! validated here first.

use thiserror::Error;

use super::fourcc::Fourcc;

/// Errors surfaced by format negotiation and framebuffer setup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VncError {
    /// The host fourcc has no known pixel format.
    #[error("unsupported pixel format: {0}")]
    NotSupported(Fourcc),

    /// The pixel format has no canonical fourcc.
    #[error("pixel format has no matching fourcc")]
    NotRepresentable,

    /// A pixel format received from a client is malformed.
    #[error("invalid pixel format: {0}")]
    InvalidPixelFormat(&'static str),

    /// Framebuffer dimensions outside the supported range.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VncError>;
