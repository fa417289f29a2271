//! RFB pixel format descriptions.
//!
//! A [`PixelFormat`] describes how the red, green and blue intensities of one
//! pixel are packed into an integer and how that integer is laid out in bytes.
//! The same type describes the server's native framebuffer layout (resolved
//! from a host fourcc, see [`super::fourcc`]) and the format a client asked for
//! in `SetPixelFormat`.
//!
//! # Wire Layout
//!
//! The 16-byte `PIXEL_FORMAT` structure of RFC 6143 Section 7.4:
//!
//! ```text
//! +----+-------+------------+-------------+---------+-----------+----------+-------+-------+------+---------+
//! | u8 | u8    | u8         | u8          | u16     | u16       | u16      | u8    | u8    | u8   | 3 bytes |
//! | bpp| depth | big-endian | true-colour | red-max | green-max | blue-max | red-s | grn-s | blu-s| padding |
//! +----+-------+------------+-------------+---------+-----------+----------+-------+-------+------+---------+
//! ```

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};

use super::error::{Result, VncError};

/// Size of the `PIXEL_FORMAT` structure on the wire.
pub const PIXEL_FORMAT_SIZE: usize = 16;

/// Byte order of a multi-byte pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Position and width of one colour channel inside a pixel value.
///
/// All packing and unpacking goes through this type, so supporting a new
/// layout only takes a new `{shift, bits}` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel {
    /// Bit position of the channel's least significant bit.
    pub shift: u8,
    /// Number of bits in the channel.
    pub bits: u8,
}

impl Channel {
    /// Creates a channel occupying `bits` bits starting at `shift`.
    pub const fn new(shift: u8, bits: u8) -> Self {
        Self { shift, bits }
    }

    /// Largest intensity the channel can hold (`(1 << bits) - 1`).
    pub const fn max(self) -> u32 {
        if self.bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        }
    }

    /// The channel's bits in place within a pixel value.
    pub const fn mask(self) -> u32 {
        self.max() << self.shift
    }

    /// One past the channel's most significant bit.
    pub const fn end(self) -> u32 {
        self.shift as u32 + self.bits as u32
    }

    /// Reads this channel's intensity out of a pixel value.
    #[inline]
    pub fn extract(self, pixel: u32) -> u32 {
        (pixel >> self.shift) & self.max()
    }

    /// Moves an intensity into this channel's bit position.
    #[inline]
    pub fn place(self, value: u32) -> u32 {
        (value & self.max()) << self.shift
    }

    /// Rescales an intensity of this channel to the range of `to`.
    ///
    /// Uses `value * to.max() / self.max()` with truncating division, so
    /// zero and full intensity are preserved exactly in both directions.
    #[inline]
    pub fn rescale_to(self, value: u32, to: Channel) -> u32 {
        if self.bits == to.bits {
            return value;
        }
        (u64::from(value) * u64::from(to.max()) / u64::from(self.max())) as u32
    }
}

/// Describes one pixel memory layout.
///
/// Only true-colour formats can be converted; colour-map formats are
/// representable so that a client request can be parsed and then rejected by
/// [`PixelFormat::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    /// Storage size of one pixel in bits (8, 16, 24 or 32).
    pub bits_per_pixel: u8,
    /// Number of significant bits.
    pub depth: u8,
    /// Byte order of multi-byte pixels.
    pub byte_order: Endian,
    /// True colour (direct channels) rather than a colour map.
    pub true_colour: bool,
    /// Red channel.
    pub red: Channel,
    /// Green channel.
    pub green: Channel,
    /// Blue channel.
    pub blue: Channel,
}

impl PixelFormat {
    /// Creates a little-endian true-colour format.
    ///
    /// The depth is the sum of the channel widths.
    pub const fn new(bits_per_pixel: u8, red: Channel, green: Channel, blue: Channel) -> Self {
        Self {
            bits_per_pixel,
            depth: red.bits + green.bits + blue.bits,
            byte_order: Endian::Little,
            true_colour: true,
            red,
            green,
            blue,
        }
    }

    /// 32 bpp, 8 bits per channel, red at bit 16, green at 8, blue at 0.
    ///
    /// The format most RFB clients use and the default server format.
    pub const fn rgb888() -> Self {
        Self::new(32, Channel::new(16, 8), Channel::new(8, 8), Channel::new(0, 8))
    }

    /// Returns a copy with the given byte order.
    pub const fn with_byte_order(mut self, byte_order: Endian) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Storage size of one pixel, rounded up to whole bytes.
    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.bits_per_pixel).div_ceil(8)
    }

    /// Size of a compact pixel (`CPIXEL`) in this format.
    ///
    /// RFC 6143 shrinks 32 bpp true-colour pixels of depth 24 or less to three
    /// bytes when every channel fits in the three least significant bytes.
    /// Every other format uses [`bytes_per_pixel`](Self::bytes_per_pixel).
    pub fn cpixel_size(&self) -> usize {
        let fits_low_bytes = self.channels().iter().all(|c| c.end() <= 24);
        if self.true_colour && self.bits_per_pixel == 32 && self.depth <= 24 && fits_low_bytes {
            3
        } else {
            self.bytes_per_pixel()
        }
    }

    /// Red, green and blue channels in that order.
    pub fn channels(&self) -> [Channel; 3] {
        [self.red, self.green, self.blue]
    }

    /// Whether the format is big-endian.
    pub fn is_big_endian(&self) -> bool {
        self.byte_order == Endian::Big
    }

    /// Whether two formats pack pixels identically.
    ///
    /// Compares bits per pixel, byte order and every channel's shift and
    /// width. Depth is ignored since it is implied by the channels.
    pub fn same_layout(&self, other: &PixelFormat) -> bool {
        self.bits_per_pixel == other.bits_per_pixel
            && self.byte_order == other.byte_order
            && self.channels() == other.channels()
    }

    /// Checks that the format can be converted to and from.
    pub fn validate(&self) -> Result<()> {
        if !self.true_colour {
            return Err(VncError::InvalidPixelFormat("colour map formats are not supported"));
        }
        if !matches!(self.bits_per_pixel, 8 | 16 | 24 | 32) {
            return Err(VncError::InvalidPixelFormat("bits per pixel must be 8, 16, 24 or 32"));
        }

        let channels = self.channels();
        if channels.iter().any(|c| c.bits == 0 || c.bits > 16) {
            return Err(VncError::InvalidPixelFormat("channel width must be 1 to 16 bits"));
        }
        if channels.iter().any(|c| c.end() > u32::from(self.bits_per_pixel)) {
            return Err(VncError::InvalidPixelFormat("channel exceeds bits per pixel"));
        }

        let mut seen = 0u32;
        for channel in channels {
            if seen & channel.mask() != 0 {
                return Err(VncError::InvalidPixelFormat("channels overlap"));
            }
            seen |= channel.mask();
        }

        Ok(())
    }

    /// Appends the 16-byte wire representation to `buf`.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.reserve(PIXEL_FORMAT_SIZE);
        buf.put_u8(self.bits_per_pixel);
        buf.put_u8(self.depth);
        buf.put_u8(u8::from(self.is_big_endian()));
        buf.put_u8(u8::from(self.true_colour));
        buf.put_u16(self.red.max() as u16);
        buf.put_u16(self.green.max() as u16);
        buf.put_u16(self.blue.max() as u16);
        buf.put_u8(self.red.shift);
        buf.put_u8(self.green.shift);
        buf.put_u8(self.blue.shift);
        buf.put_bytes(0, 3); // padding
    }

    /// Parses and validates the 16-byte wire representation.
    ///
    /// Channel maxima must be of the form `2^n - 1`. Clients may only ask for
    /// 8, 16 or 32 bits per pixel (RFC 6143 7.4.1).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < PIXEL_FORMAT_SIZE {
            return Err(VncError::InvalidPixelFormat("pixel format message too short"));
        }
        if !matches!(data[0], 8 | 16 | 32) {
            return Err(VncError::InvalidPixelFormat("client bits per pixel must be 8, 16 or 32"));
        }

        let channel = |max_at: usize, shift: u8| -> Result<Channel> {
            let max = u32::from(BigEndian::read_u16(&data[max_at..max_at + 2]));
            if max == 0 || (max & (max + 1)) != 0 {
                return Err(VncError::InvalidPixelFormat("channel max is not a contiguous bit mask"));
            }
            Ok(Channel::new(shift, max.count_ones() as u8))
        };

        let format = Self {
            bits_per_pixel: data[0],
            depth: data[1],
            byte_order: if data[2] != 0 { Endian::Big } else { Endian::Little },
            true_colour: data[3] != 0,
            red: channel(4, data[10])?,
            green: channel(6, data[11])?,
            blue: channel(8, data[12])?,
        };
        format.validate()?;
        Ok(format)
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::rgb888()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb565() -> PixelFormat {
        PixelFormat::new(16, Channel::new(11, 5), Channel::new(5, 6), Channel::new(0, 5))
    }

    #[test]
    fn test_channel_arithmetic() {
        let green = Channel::new(5, 6);
        assert_eq!(green.max(), 63);
        assert_eq!(green.mask(), 0x07E0);
        assert_eq!(green.extract(0xFFFF), 63);
        assert_eq!(green.place(63), 0x07E0);
        assert_eq!(green.place(0xFFFF), 0x07E0);
    }

    #[test]
    fn test_rescale_truncates() {
        let eight = Channel::new(0, 8);
        let five = Channel::new(0, 5);
        assert_eq!(eight.rescale_to(255, five), 31);
        assert_eq!(eight.rescale_to(0, five), 0);
        // 200 * 31 / 255 = 24.31...
        assert_eq!(eight.rescale_to(200, five), 24);
        assert_eq!(five.rescale_to(31, eight), 255);
        assert_eq!(five.rescale_to(24, eight), 197);
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::rgb888().bytes_per_pixel(), 4);
        assert_eq!(rgb565().bytes_per_pixel(), 2);
        assert_eq!(rgb565().depth, 16);
    }

    #[test]
    fn test_cpixel_size() {
        assert_eq!(PixelFormat::rgb888().cpixel_size(), 3);
        assert_eq!(rgb565().cpixel_size(), 2);

        let rgbx = PixelFormat::new(32, Channel::new(24, 8), Channel::new(16, 8), Channel::new(8, 8));
        assert_eq!(rgbx.cpixel_size(), 4);
    }

    #[test]
    fn test_validate() {
        assert!(PixelFormat::rgb888().validate().is_ok());
        assert!(rgb565().validate().is_ok());

        let mut overlap = rgb565();
        overlap.green = Channel::new(4, 6);
        assert_eq!(
            overlap.validate(),
            Err(VncError::InvalidPixelFormat("channels overlap"))
        );

        let mut too_wide = rgb565();
        too_wide.red = Channel::new(12, 5);
        assert!(too_wide.validate().is_err());

        let mut colour_map = PixelFormat::rgb888();
        colour_map.true_colour = false;
        assert!(colour_map.validate().is_err());

        let mut odd_bpp = PixelFormat::rgb888();
        odd_bpp.bits_per_pixel = 12;
        assert!(odd_bpp.validate().is_err());
    }

    #[test]
    fn test_wire_encoding() {
        let mut buf = BytesMut::new();
        rgb565().with_byte_order(Endian::Big).write_to(&mut buf);
        assert_eq!(
            &buf[..],
            &[16, 16, 1, 1, 0, 31, 0, 63, 0, 31, 11, 5, 0, 0, 0, 0]
        );

        let parsed = PixelFormat::from_bytes(&buf).unwrap();
        assert_eq!(parsed, rgb565().with_byte_order(Endian::Big));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(PixelFormat::from_bytes(&[32, 24, 0]).is_err());

        // red-max of 100 is not a bit mask
        let data = [32, 24, 0, 1, 0, 100, 0, 255, 0, 255, 16, 8, 0, 0, 0, 0];
        assert_eq!(
            PixelFormat::from_bytes(&data),
            Err(VncError::InvalidPixelFormat("channel max is not a contiguous bit mask"))
        );

        // colour map
        let data = [8, 8, 0, 0, 0, 7, 0, 7, 0, 3, 5, 2, 0, 0, 0, 0];
        assert!(PixelFormat::from_bytes(&data).is_err());

        // packed 24 bpp is a host layout only
        let data = [24, 24, 0, 1, 0, 255, 0, 255, 0, 255, 16, 8, 0, 0, 0, 0];
        assert_eq!(
            PixelFormat::from_bytes(&data),
            Err(VncError::InvalidPixelFormat("client bits per pixel must be 8, 16 or 32"))
        );
        let rgb888 = PixelFormat::new(24, Channel::new(16, 8), Channel::new(8, 8), Channel::new(0, 8));
        assert_eq!(rgb888.validate(), Ok(()));
    }
}
