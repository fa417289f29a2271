//! Display core of the VNC (Virtual Network Computing) server.
//!
//! This module holds the parts of a Remote Framebuffer (RFB) server that sit
//! between the renderer and the encoders: pixel format negotiation and
//! translation, and orientation handling for clients that want the screen
//! rotated or mirrored.
//!
//! # Architecture
//!
//! - **`protocol`**: RFB pixel format descriptions and their wire encoding
//! - **`fourcc`**: Mapping between host fourcc codes and pixel formats
//! - **`translate`**: Conversion of native pixels into a client's pixel format
//! - **`transform`**: Rotation/mirror transforms, dimensions and damage remapping
//! - **`region`**: Disjoint rectangle sets for damage tracking
//! - **`framebuffer`**: Native 32-bit pixel storage
//! - **`display`**: Damage accumulation and per-client update production
//! - **`config`**: Negotiated output settings and dimension limits
//!
//! # Example Flow
//!
//! ```ignore
//! // Allocate a framebuffer in the host's layout
//! let fb = Framebuffer::new(500, 500, DrmFourcc::Rgbx8888.into())?;
//! let mut display = Display::new(fb);
//!
//! // Renderer draws and reports damage
//! display.framebuffer_mut().fill_rect(&Rect::new(10, 10, 32, 32), 0);
//! display.damage_region(&Region::from_rect(Rect::new(10, 10, 32, 32)));
//!
//! // Client negotiated RGB565, rotated by 90 degrees
//! let config = OutputConfig::new(client_format)?.with_transform(Transform::Rotate90);
//! let update = display.render(&config);
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod fourcc;
pub mod framebuffer;
pub mod protocol;
pub mod region;
pub mod transform;
pub mod translate;
