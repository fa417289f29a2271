//! Server-side framebuffer.
//!
//! Pixels are stored as native 32-bit words in the layout named by the
//! framebuffer's fourcc. Only 32 bpp fourccs are accepted since the pixel
//! translator reads one word per pixel.

use bytes::BytesMut;
use log::{info, warn};

use super::config::validate_dimensions;
use super::error::{Result, VncError};
use super::fourcc::{from_fourcc, Fourcc};
use super::protocol::PixelFormat;
use super::region::Rect;
use super::transform::Transform;
use super::translate;

/// A framebuffer with known dimensions and pixel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    fourcc: Fourcc,
    format: PixelFormat,
    pixels: Vec<u32>,
}

impl Framebuffer {
    /// Allocates a zeroed framebuffer.
    ///
    /// # Errors
    ///
    /// * [`VncError::InvalidDimensions`] if either dimension is outside
    ///   `MIN_DIMENSION..=MAX_DIMENSION`.
    /// * [`VncError::NotSupported`] if the fourcc is unknown or not 32 bpp.
    pub fn new(width: u32, height: u32, fourcc: Fourcc) -> Result<Self> {
        let (width, height) = validate_dimensions(width, height)?;
        let format = from_fourcc(fourcc)?;
        if format.bits_per_pixel != 32 {
            warn!("Framebuffer format {} is not 32 bits per pixel", fourcc);
            return Err(VncError::NotSupported(fourcc));
        }

        info!("Created {}x{} framebuffer ({})", width, height, fourcc);
        Ok(Self {
            width,
            height,
            fourcc,
            format,
            pixels: vec![0; usize::from(width) * usize::from(height)],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Host format code.
    pub fn fourcc(&self) -> Fourcc {
        self.fourcc
    }

    /// Pixel format of the stored words.
    pub fn pixel_format(&self) -> &PixelFormat {
        &self.format
    }

    /// The whole buffer covered as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// All pixels, row-major, for drawing.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// One row of pixels, if inside the buffer.
    pub fn row(&self, y: u16) -> Option<&[u32]> {
        self.pixels.chunks_exact(usize::from(self.width)).nth(usize::from(y))
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        self.bounds()
            .contains(x, y)
            .then(|| y as usize * usize::from(self.width) + x as usize)
    }

    /// The pixel at (`x`, `y`), if inside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Sets the pixel at (`x`, `y`). Returns `false` if outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = value;
                true
            }
            None => false,
        }
    }

    /// Fills the whole buffer.
    pub fn fill(&mut self, value: u32) {
        self.pixels.fill(value);
    }

    /// Fills the part of `rect` inside the buffer.
    pub fn fill_rect(&mut self, rect: &Rect, value: u32) {
        let Some(rect) = rect.intersect(&self.bounds()) else {
            return;
        };
        let width = usize::from(self.width);
        for y in rect.y..rect.y + rect.height {
            let start = usize::from(y) * width + usize::from(rect.x);
            self.pixels[start..start + usize::from(rect.width)].fill(value);
        }
    }

    /// A copy of the buffer with `transform` applied to its pixels.
    pub fn transformed(&self, transform: Transform) -> Framebuffer {
        if transform.is_identity() {
            return self.clone();
        }

        let (width, height) = transform.dimensions(self.width, self.height);
        let matrix = transform.matrix(self.width, self.height);
        let mut pixels = vec![0; self.pixels.len()];

        for y in 0..i32::from(self.height) {
            for x in 0..i32::from(self.width) {
                // the image of the pixel square starts at its nearest mapped corner
                let (x0, y0) = matrix.map_point(x, y);
                let (x1, y1) = matrix.map_point(x + 1, y + 1);
                let (dx, dy) = (x0.min(x1) as usize, y0.min(y1) as usize);
                pixels[dy * usize::from(width) + dx] =
                    self.pixels[y as usize * usize::from(self.width) + x as usize];
            }
        }

        Framebuffer {
            width,
            height,
            fourcc: self.fourcc,
            format: self.format,
            pixels,
        }
    }

    /// Converts the pixels of `rect` into `dst_fmt`, row by row.
    ///
    /// `rect` must lie inside the buffer and `dst_fmt` must be valid.
    pub fn translate_rect(&self, rect: &Rect, dst_fmt: &PixelFormat, bytes_per_cpixel: usize) -> BytesMut {
        debug_assert!(rect.right() <= u32::from(self.width) && rect.bottom() <= u32::from(self.height));

        let row_len = usize::from(rect.width);
        let start = usize::from(rect.x);
        let mut buf = BytesMut::with_capacity(row_len * usize::from(rect.height) * bytes_per_cpixel);
        let rows = self
            .pixels
            .chunks_exact(usize::from(self.width))
            .skip(usize::from(rect.y))
            .take(usize::from(rect.height));
        for row in rows {
            translate::convert_into(&mut buf, dst_fmt, &row[start..start + row_len], &self.format, bytes_per_cpixel);
        }
        buf
    }

    /// Converts the pixels of `rect` as seen through `transform` into
    /// `dst_fmt`, row by row.
    ///
    /// `rect` is in transformed coordinates and must lie inside
    /// `transform.dimensions(width, height)`. Only the source pixels under
    /// `rect` are read, so the cost follows the rectangle and not the buffer.
    pub fn translate_transformed_rect(
        &self,
        transform: Transform,
        rect: &Rect,
        dst_fmt: &PixelFormat,
        bytes_per_cpixel: usize,
    ) -> BytesMut {
        if transform.is_identity() {
            return self.translate_rect(rect, dst_fmt, bytes_per_cpixel);
        }

        let (width, height) = transform.dimensions(self.width, self.height);
        debug_assert!(rect.right() <= u32::from(width) && rect.bottom() <= u32::from(height));

        // maps transformed points back into this buffer
        let matrix = transform.inverse().matrix(width, height);
        let row_len = usize::from(rect.width);
        let mut row = Vec::with_capacity(row_len);
        let mut buf = BytesMut::with_capacity(row_len * usize::from(rect.height) * bytes_per_cpixel);
        for y in i32::from(rect.y)..rect.bottom() as i32 {
            row.clear();
            for x in i32::from(rect.x)..rect.right() as i32 {
                let (x0, y0) = matrix.map_point(x, y);
                let (x1, y1) = matrix.map_point(x + 1, y + 1);
                let (sx, sy) = (x0.min(x1) as usize, y0.min(y1) as usize);
                row.push(self.pixels[sy * usize::from(self.width) + sx]);
            }
            translate::convert_into(&mut buf, dst_fmt, &row, &self.format, bytes_per_cpixel);
        }
        buf
    }
}
