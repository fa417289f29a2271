//! Mapping between host fourcc codes and RFB pixel formats.
//!
//! The host graphics stack names buffer layouts with DRM fourcc codes. Each
//! supported code resolves to a [`PixelFormat`]; the reverse direction is
//! partial and yields one canonical code per channel layout, so several codes
//! (e.g. `XRGB8888` and `ARGB8888`) share a layout but only the first listed
//! is returned by [`to_fourcc`].
//!
//! Both directions are backed by hash maps built once on first use and never
//! mutated afterwards.

use std::collections::HashMap;
use std::fmt;

use drm_fourcc::DrmFourcc;
use log::debug;
use once_cell::sync::OnceCell;

use super::error::{Result, VncError};
use super::protocol::{Channel, Endian, PixelFormat};

/// Flag OR-ed into a fourcc to mark a big-endian variant of the layout.
pub const BIG_ENDIAN_FLAG: u32 = 1 << 31;

/// A 32-bit host format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fourcc(pub u32);

impl Fourcc {
    /// Builds a code from its four characters.
    pub const fn from_chars(code: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(code))
    }

    /// Raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether the big-endian flag is set.
    pub const fn is_big_endian(self) -> bool {
        self.0 & BIG_ENDIAN_FLAG != 0
    }

    /// Returns the code with the big-endian flag set.
    pub const fn with_big_endian(self) -> Self {
        Self(self.0 | BIG_ENDIAN_FLAG)
    }

    /// Returns the code with the big-endian flag cleared.
    pub const fn without_big_endian(self) -> Self {
        Self(self.0 & !BIG_ENDIAN_FLAG)
    }

    /// The DRM format named by this code, ignoring the big-endian flag.
    pub fn to_drm(self) -> Option<DrmFourcc> {
        DrmFourcc::try_from(self.without_big_endian().raw()).ok()
    }
}

impl From<DrmFourcc> for Fourcc {
    fn from(format: DrmFourcc) -> Self {
        Self(format as u32)
    }
}

impl fmt::Display for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars = self.without_big_endian().raw().to_le_bytes();
        if chars.iter().all(|c| c.is_ascii_graphic() || *c == b' ') {
            for c in chars {
                write!(f, "{}", c as char)?;
            }
        } else {
            write!(f, "{:#010x}", self.without_big_endian().raw())?;
        }
        if self.is_big_endian() {
            write!(f, " (big-endian)")?;
        }
        Ok(())
    }
}

const fn rgb(bits_per_pixel: u8, red: (u8, u8), green: (u8, u8), blue: (u8, u8)) -> PixelFormat {
    PixelFormat::new(
        bits_per_pixel,
        Channel::new(red.0, red.1),
        Channel::new(green.0, green.1),
        Channel::new(blue.0, blue.1),
    )
}

/// Supported codes. The first code listed for a layout is its canonical one.
static FORMATS: &[(DrmFourcc, PixelFormat)] = &[
    // 32 bpp, 8:8:8
    (DrmFourcc::Xrgb8888, rgb(32, (16, 8), (8, 8), (0, 8))),
    (DrmFourcc::Argb8888, rgb(32, (16, 8), (8, 8), (0, 8))),
    (DrmFourcc::Xbgr8888, rgb(32, (0, 8), (8, 8), (16, 8))),
    (DrmFourcc::Abgr8888, rgb(32, (0, 8), (8, 8), (16, 8))),
    (DrmFourcc::Rgbx8888, rgb(32, (24, 8), (16, 8), (8, 8))),
    (DrmFourcc::Rgba8888, rgb(32, (24, 8), (16, 8), (8, 8))),
    (DrmFourcc::Bgrx8888, rgb(32, (8, 8), (16, 8), (24, 8))),
    (DrmFourcc::Bgra8888, rgb(32, (8, 8), (16, 8), (24, 8))),
    // 32 bpp, 10:10:10
    (DrmFourcc::Xrgb2101010, rgb(32, (20, 10), (10, 10), (0, 10))),
    (DrmFourcc::Argb2101010, rgb(32, (20, 10), (10, 10), (0, 10))),
    (DrmFourcc::Xbgr2101010, rgb(32, (0, 10), (10, 10), (20, 10))),
    (DrmFourcc::Abgr2101010, rgb(32, (0, 10), (10, 10), (20, 10))),
    // 24 bpp
    (DrmFourcc::Rgb888, rgb(24, (16, 8), (8, 8), (0, 8))),
    (DrmFourcc::Bgr888, rgb(24, (0, 8), (8, 8), (16, 8))),
    // 16 bpp, 5:6:5
    (DrmFourcc::Rgb565, rgb(16, (11, 5), (5, 6), (0, 5))),
    (DrmFourcc::Bgr565, rgb(16, (0, 5), (5, 6), (11, 5))),
    // 16 bpp, 4:4:4
    (DrmFourcc::Xrgb4444, rgb(16, (8, 4), (4, 4), (0, 4))),
    (DrmFourcc::Argb4444, rgb(16, (8, 4), (4, 4), (0, 4))),
    (DrmFourcc::Xbgr4444, rgb(16, (0, 4), (4, 4), (8, 4))),
    (DrmFourcc::Abgr4444, rgb(16, (0, 4), (4, 4), (8, 4))),
    (DrmFourcc::Rgbx4444, rgb(16, (12, 4), (8, 4), (4, 4))),
    (DrmFourcc::Rgba4444, rgb(16, (12, 4), (8, 4), (4, 4))),
    (DrmFourcc::Bgrx4444, rgb(16, (4, 4), (8, 4), (12, 4))),
    (DrmFourcc::Bgra4444, rgb(16, (4, 4), (8, 4), (12, 4))),
    // 8 bpp
    (DrmFourcc::Rgb332, rgb(8, (5, 3), (2, 3), (0, 2))),
    (DrmFourcc::Bgr233, rgb(8, (0, 3), (3, 3), (6, 2))),
];

/// Channel layout used as the reverse-lookup key. Byte order is handled by
/// the big-endian flag, so the key only covers the little-endian layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LayoutKey {
    bits_per_pixel: u8,
    channels: [Channel; 3],
}

impl LayoutKey {
    fn of(format: &PixelFormat) -> Self {
        Self {
            bits_per_pixel: format.bits_per_pixel,
            channels: format.channels(),
        }
    }
}

/// Fourcc value to pixel format.
static FOURCC_TABLE: OnceCell<HashMap<u32, PixelFormat>> = OnceCell::new();
/// Channel layout to canonical fourcc.
static LAYOUT_TABLE: OnceCell<HashMap<LayoutKey, Fourcc>> = OnceCell::new();

fn get_or_init_fourcc_table() -> &'static HashMap<u32, PixelFormat> {
    FOURCC_TABLE.get_or_init(|| {
        FORMATS
            .iter()
            .map(|(code, format)| (*code as u32, *format))
            .collect()
    })
}

fn get_or_init_layout_table() -> &'static HashMap<LayoutKey, Fourcc> {
    LAYOUT_TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for (code, format) in FORMATS {
            table
                .entry(LayoutKey::of(format))
                .or_insert_with(|| Fourcc::from(*code));
        }
        table
    })
}

/// Resolves a host fourcc into its pixel format.
///
/// A set big-endian flag yields a big-endian format.
///
/// # Errors
///
/// [`VncError::NotSupported`] if the code is not in the table.
pub fn from_fourcc(code: Fourcc) -> Result<PixelFormat> {
    let Some(format) = get_or_init_fourcc_table().get(&code.without_big_endian().raw()) else {
        debug!("No pixel format for fourcc {}", code);
        return Err(VncError::NotSupported(code));
    };

    let byte_order = if code.is_big_endian() {
        Endian::Big
    } else {
        Endian::Little
    };
    Ok(format.with_byte_order(byte_order))
}

/// Finds the canonical fourcc whose layout matches `format` exactly.
///
/// Bits per pixel and every channel's shift and width must match; depth is
/// not compared. Big-endian formats map to the flagged little-endian code.
///
/// # Errors
///
/// [`VncError::NotRepresentable`] if no canonical code has this layout.
pub fn to_fourcc(format: &PixelFormat) -> Result<Fourcc> {
    if !format.true_colour {
        return Err(VncError::NotRepresentable);
    }

    let code = get_or_init_layout_table()
        .get(&LayoutKey::of(format))
        .copied()
        .ok_or(VncError::NotRepresentable)?;

    Ok(match format.byte_order {
        Endian::Big => code.with_big_endian(),
        Endian::Little => code,
    })
}

/// Canonical codes of every supported layout, in table order.
///
/// Suitable for advertising the supported formats to a host compositor.
pub fn supported_fourccs() -> Vec<Fourcc> {
    let layouts = get_or_init_layout_table();
    FORMATS
        .iter()
        .map(|(code, _)| Fourcc::from(*code))
        .filter(|code| {
            from_fourcc(*code)
                .ok()
                .and_then(|format| layouts.get(&LayoutKey::of(&format)))
                == Some(code)
        })
        .collect()
}
