//! Pixel format translation.
//!
//! Converts native 32-bit framebuffer words into the pixel format a client
//! negotiated. Every pixel is handled independently: each channel is
//! extracted, rescaled when the source and destination widths differ, and
//! repacked at the destination shifts. Only the low `bytes_per_cpixel` bytes
//! of the packed value are written, in the destination byte order, which gives
//! the compact pixel (`CPIXEL`) form when fewer bytes than the full pixel are
//! requested.
//!
//! Channel rescaling truncates: `dst = src * dst_max / src_max`. Full
//! intensity maps to full intensity in both directions, so a white pixel
//! survives any round trip exactly.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use bytes::BytesMut;

use super::protocol::{Channel, Endian, PixelFormat};

/// Precomputed per-channel source and destination positions.
struct Repacker {
    channels: [(Channel, Channel); 3],
}

impl Repacker {
    fn new(src: &PixelFormat, dst: &PixelFormat) -> Self {
        Self {
            channels: [
                (src.red, dst.red),
                (src.green, dst.green),
                (src.blue, dst.blue),
            ],
        }
    }

    #[inline]
    fn pixel(&self, px: u32) -> u32 {
        self.channels.iter().fold(0, |acc, &(src, dst)| {
            acc | dst.place(src.rescale_to(src.extract(px), dst))
        })
    }
}

#[inline]
fn low_bytes_mask(bytes: usize) -> u32 {
    if bytes >= 4 {
        u32::MAX
    } else {
        (1u32 << (bytes * 8)) - 1
    }
}

/// Converts `len` native pixels from `src` into `dst`.
///
/// # Arguments
///
/// * `dst` - Output buffer, at least `len * bytes_per_cpixel` bytes.
/// * `dst_fmt` - Pixel format to produce.
/// * `src` - Native pixel words, at least `len` of them.
/// * `src_fmt` - Layout of the native pixel words. Its byte order is not
///   consulted since the pixels are already host integers.
/// * `bytes_per_cpixel` - Bytes written per pixel, 1 to 4.
/// * `len` - Number of pixels to convert.
///
/// Both formats must have passed [`PixelFormat::validate`]. The preconditions
/// are only checked in debug builds. Exactly `len * bytes_per_cpixel` bytes of
/// `dst` are written.
pub fn convert(
    dst: &mut [u8],
    dst_fmt: &PixelFormat,
    src: &[u32],
    src_fmt: &PixelFormat,
    bytes_per_cpixel: usize,
    len: usize,
) {
    debug_assert!(src_fmt.validate().is_ok(), "invalid source format {:?}", src_fmt);
    debug_assert!(dst_fmt.validate().is_ok(), "invalid destination format {:?}", dst_fmt);
    debug_assert!((1..=4).contains(&bytes_per_cpixel));
    debug_assert!(dst.len() >= len * bytes_per_cpixel);
    debug_assert!(src.len() >= len);

    let repacker = Repacker::new(src_fmt, dst_fmt);
    let mask = low_bytes_mask(bytes_per_cpixel);
    let out = dst[..len * bytes_per_cpixel].chunks_exact_mut(bytes_per_cpixel);

    match dst_fmt.byte_order {
        Endian::Little => {
            for (cpx, &px) in out.zip(&src[..len]) {
                let value = repacker.pixel(px) & mask;
                LittleEndian::write_uint(cpx, u64::from(value), bytes_per_cpixel);
            }
        }
        Endian::Big => {
            for (cpx, &px) in out.zip(&src[..len]) {
                let value = repacker.pixel(px) & mask;
                BigEndian::write_uint(cpx, u64::from(value), bytes_per_cpixel);
            }
        }
    }
}

/// Converts every pixel in `src` and appends the result to `buf`.
pub fn convert_into(
    buf: &mut BytesMut,
    dst_fmt: &PixelFormat,
    src: &[u32],
    src_fmt: &PixelFormat,
    bytes_per_cpixel: usize,
) {
    let start = buf.len();
    buf.resize(start + src.len() * bytes_per_cpixel, 0);
    convert(
        &mut buf[start..],
        dst_fmt,
        src,
        src_fmt,
        bytes_per_cpixel,
        src.len(),
    );
}
