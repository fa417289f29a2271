//! RFB Display Core
//!
//! Pixel format conversion and output orientation handling for a VNC server.
//! The network transport, handshake and encoders live elsewhere and call into
//! this crate with already negotiated settings.
//!
//! # Modules
//!
//! - `vnc`: Pixel formats, fourcc mapping, pixel translation, transforms,
//!   damage regions and the display surface.

pub mod vnc;

pub use vnc::config::{OutputConfig, MAX_DIMENSION, MIN_DIMENSION};
pub use vnc::display::{Display, FramebufferUpdate, UpdateRect};
pub use vnc::error::{Result, VncError};
pub use vnc::fourcc::{from_fourcc, supported_fourccs, to_fourcc, Fourcc};
pub use vnc::framebuffer::Framebuffer;
pub use vnc::protocol::{Channel, Endian, PixelFormat};
pub use vnc::region::{Rect, Region};
pub use vnc::transform::{Matrix, Transform};
pub use vnc::translate::{convert, convert_into};
