//! Display surface shared between a renderer and the update pipeline.
//!
//! The renderer draws into the [`Framebuffer`] and reports what it touched
//! through [`Display::damage_region`]. When an update is due,
//! [`Display::render`] applies the client's orientation to the damage, reads
//! the pixels under each transformed rectangle, converts them to the client's
//! pixel format, and clears the damage.

use bytes::BytesMut;
use log::trace;

use super::config::OutputConfig;
use super::framebuffer::Framebuffer;
use super::region::{Rect, Region};

/// One converted rectangle of a framebuffer update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRect {
    /// Position in the transformed framebuffer.
    pub rect: Rect,
    /// Pixels in the client's format, row-major, ready to follow the
    /// rectangle header.
    pub data: BytesMut,
}

/// Everything a client needs for one framebuffer update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferUpdate {
    /// Framebuffer width as seen by the client.
    pub width: u16,
    /// Framebuffer height as seen by the client.
    pub height: u16,
    /// Damaged rectangles with their pixel data.
    pub rects: Vec<UpdateRect>,
}

impl FramebufferUpdate {
    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// A framebuffer with accumulated damage.
#[derive(Debug)]
pub struct Display {
    framebuffer: Framebuffer,
    damage: Region,
}

impl Display {
    /// Creates a display. The whole buffer starts damaged.
    pub fn new(framebuffer: Framebuffer) -> Self {
        let damage = Region::from_rect(framebuffer.bounds());
        Self { framebuffer, damage }
    }

    /// The framebuffer.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// The framebuffer, for drawing. Damage must be reported separately.
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// Replaces the framebuffer and damages all of it.
    pub fn set_framebuffer(&mut self, framebuffer: Framebuffer) {
        self.framebuffer = framebuffer;
        self.damage = Region::from_rect(self.framebuffer.bounds());
    }

    /// Marks a region as changed. Parts outside the buffer are dropped.
    pub fn damage_region(&mut self, region: &Region) {
        let clipped = region.intersect_rect(&self.framebuffer.bounds());
        self.damage.union(&clipped);
    }

    /// Marks the whole buffer as changed.
    pub fn damage_all(&mut self) {
        self.damage = Region::from_rect(self.framebuffer.bounds());
    }

    /// Damage accumulated since the last update.
    pub fn damage(&self) -> &Region {
        &self.damage
    }

    /// Returns and clears the accumulated damage.
    pub fn take_damage(&mut self) -> Region {
        std::mem::take(&mut self.damage)
    }

    /// Produces the update for a client and clears the damage.
    pub fn render(&mut self, config: &OutputConfig) -> FramebufferUpdate {
        let damage = self.take_damage();
        let transform = config.transform;
        let (width, height) = transform.dimensions(self.framebuffer.width(), self.framebuffer.height());

        if damage.is_empty() {
            return FramebufferUpdate { width, height, rects: Vec::new() };
        }

        let region = transform.apply_to_region(self.framebuffer.width(), self.framebuffer.height(), &damage);
        let bytes_per_pixel = config.bytes_per_pixel();
        let rects: Vec<UpdateRect> = region
            .iter()
            .map(|rect| UpdateRect {
                rect: *rect,
                data: self.framebuffer.translate_transformed_rect(
                    transform,
                    rect,
                    &config.pixel_format,
                    bytes_per_pixel,
                ),
            })
            .collect();

        trace!(
            "Rendered {} rects ({} pixels) for {}x{} {:?}",
            rects.len(),
            region.area(),
            width,
            height,
            transform
        );

        FramebufferUpdate { width, height, rects }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vnc::protocol::{Channel, PixelFormat};
    use crate::vnc::transform::Transform;
    use drm_fourcc::DrmFourcc;

    fn display(width: u32, height: u32) -> Display {
        let mut fb = Framebuffer::new(width, height, DrmFourcc::Rgbx8888.into()).unwrap();
        fb.fill(0xFFFF_FF00);
        Display::new(fb)
    }

    #[test]
    fn test_starts_fully_damaged() {
        let mut display = display(8, 4);
        assert_eq!(display.damage().area(), 32);

        let update = display.render(&OutputConfig::default());
        assert_eq!(update.rects.len(), 1);
        assert_eq!(update.rects[0].data.len(), 32 * 4);
        assert!(display.damage().is_empty());
        assert!(display.render(&OutputConfig::default()).is_empty());
    }

    #[test]
    fn test_damage_is_clipped_and_merged() {
        let mut display = display(8, 4);
        display.take_damage();

        display.damage_region(&Region::from_rect(Rect::new(6, 2, 10, 10)));
        display.damage_region(&Region::from_rect(Rect::new(6, 2, 1, 1)));
        assert_eq!(display.damage().rects(), &[Rect::new(6, 2, 2, 2)]);
    }

    #[test]
    fn test_render_rotated_rgb565() {
        let mut display = display(8, 4);
        display.take_damage();
        display.framebuffer_mut().set_pixel(7, 0, 0xFF00_0000);
        display.damage_region(&Region::from_rect(Rect::new(7, 0, 1, 1)));

        let rgb565 = PixelFormat::new(16, Channel::new(11, 5), Channel::new(5, 6), Channel::new(0, 5));
        let config = OutputConfig::new(rgb565).unwrap().with_transform(Transform::Rotate90);
        let update = display.render(&config);

        assert_eq!((update.width, update.height), (4, 8));
        assert_eq!(update.rects.len(), 1);
        assert_eq!(update.rects[0].rect, Rect::new(0, 0, 1, 1));
        assert_eq!(&update.rects[0].data[..], &[0x00, 0xF8]);
    }

    #[test]
    fn test_render_rotated_keeps_pixel_order() {
        // 3x2:
        // 1 2 3
        // 4 5 6
        let mut display = display(3, 2);
        display.framebuffer_mut().pixels_mut().copy_from_slice(&[1 << 8, 2 << 8, 3 << 8, 4 << 8, 5 << 8, 6 << 8]);
        display.take_damage();
        display.damage_region(&Region::from_rect(Rect::new(1, 0, 2, 2)));

        let config = OutputConfig::new(PixelFormat::rgb888()).unwrap().with_transform(Transform::Rotate90);
        let update = display.render(&config);

        // counter-clockwise, the damaged columns become the top two rows:
        // 3 6
        // 2 5
        assert_eq!((update.width, update.height), (2, 3));
        assert_eq!(update.rects.len(), 1);
        assert_eq!(update.rects[0].rect, Rect::new(0, 0, 2, 2));
        assert_eq!(
            &update.rects[0].data[..],
            &[3, 0, 0, 0, 6, 0, 0, 0, 2, 0, 0, 0, 5, 0, 0, 0]
        );
    }
}
