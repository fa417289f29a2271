//! Negotiated output settings and framebuffer limits.

use log::{error, warn};

use super::error::{Result, VncError};
use super::protocol::PixelFormat;
use super::transform::Transform;

/// Largest supported framebuffer width or height.
pub const MAX_DIMENSION: u16 = 8192;
/// Smallest supported framebuffer width or height.
pub const MIN_DIMENSION: u16 = 1;

/// Checks framebuffer dimensions and narrows them to wire coordinates.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(u16, u16)> {
    let in_range = |v: u32| match u16::try_from(v) {
        Ok(v) if (MIN_DIMENSION..=MAX_DIMENSION).contains(&v) => Some(v),
        _ => None,
    };

    match (in_range(width), in_range(height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => {
            error!(
                "Invalid dimensions: {}x{} (each must be {}-{})",
                width, height, MIN_DIMENSION, MAX_DIMENSION
            );
            Err(VncError::InvalidDimensions { width, height })
        }
    }
}

/// What a client negotiated for the framebuffer updates it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputConfig {
    /// Pixel format the client asked for.
    pub pixel_format: PixelFormat,
    /// Orientation applied before pixels are sent.
    pub transform: Transform,
    /// Send compact pixels (`CPIXEL`) instead of full pixels.
    pub compact: bool,
}

impl OutputConfig {
    /// Creates a configuration for a client pixel format.
    ///
    /// # Errors
    ///
    /// [`VncError::InvalidPixelFormat`] if the format cannot be produced.
    pub fn new(pixel_format: PixelFormat) -> Result<Self> {
        if let Err(e) = pixel_format.validate() {
            warn!("Rejecting client pixel format {:?}: {}", pixel_format, e);
            return Err(e);
        }
        Ok(Self {
            pixel_format,
            ..Self::default()
        })
    }

    /// Sets the orientation.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Enables or disables compact pixels.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Bytes sent per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        if self.compact {
            self.pixel_format.cpixel_size()
        } else {
            self.pixel_format.bytes_per_pixel()
        }
    }
}
