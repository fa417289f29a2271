use drm_fourcc::DrmFourcc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rfb_display::{
    convert, from_fourcc, supported_fourccs, to_fourcc, Display, Fourcc, Framebuffer,
    OutputConfig, PixelFormat, Rect, Region, Transform, VncError,
};

fn random_region(rng: &mut StdRng, width: u16, height: u16) -> Region {
    let mut region = Region::new();
    for _ in 0..rng.gen_range(1..12) {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        let w = rng.gen_range(1..=width - x);
        let h = rng.gen_range(1..=height - y);
        region.add_rect(Rect::new(x, y, w, h));
    }
    region
}

#[test]
fn fourcc_round_trip_preserves_layout() {
    for code in [
        DrmFourcc::Xrgb8888,
        DrmFourcc::Argb8888,
        DrmFourcc::Rgba8888,
        DrmFourcc::Bgra8888,
        DrmFourcc::Abgr2101010,
        DrmFourcc::Bgr888,
        DrmFourcc::Bgr565,
        DrmFourcc::Rgba4444,
        DrmFourcc::Bgr233,
    ] {
        let format = from_fourcc(code.into()).unwrap();
        let back = from_fourcc(to_fourcc(&format).unwrap()).unwrap();
        assert!(format.same_layout(&back), "{:?}", code);
    }
}

#[test]
fn rgbx8888_resolves_and_maps_back() {
    let code: Fourcc = DrmFourcc::Rgbx8888.into();
    let format = from_fourcc(code).unwrap();
    assert_eq!(format.bytes_per_pixel(), 4);
    assert_eq!(to_fourcc(&format), Ok(code));
}

#[test]
fn unknown_fourcc_is_not_supported() {
    assert_eq!(from_fourcc(Fourcc(0)), Err(VncError::NotSupported(Fourcc(0))));
}

#[test]
fn pure_red_to_rgb565() {
    let src_fmt = from_fourcc(DrmFourcc::Rgbx8888.into()).unwrap();
    let dst_fmt = from_fourcc(DrmFourcc::Rgb565.into()).unwrap();

    let mut dst = [0u8; 2];
    convert(&mut dst, &dst_fmt, &[0xFF00_0000], &src_fmt, 2, 1);
    assert_eq!(u16::from_le_bytes(dst), 0xF800);
}

#[test]
fn white_survives_every_format() {
    let native = from_fourcc(DrmFourcc::Rgbx8888.into()).unwrap();
    let white = 0xFFFF_FF00u32;

    for code in supported_fourccs() {
        let format = from_fourcc(code).unwrap();
        let bytes = format.bytes_per_pixel();

        let mut packed = [0u8; 4];
        convert(&mut packed, &format, &[white], &native, bytes, 1);
        let mut word = [0u8; 4];
        word[..bytes].copy_from_slice(&packed[..bytes]);
        let value = u32::from_le_bytes(word);

        let mut back = [0u8; 4];
        convert(&mut back, &native, &[value], &format, 4, 1);
        assert_eq!(u32::from_le_bytes(back), white, "{}", code);
    }
}

#[test]
fn narrow_channels_quantize_consistently() {
    let native = from_fourcc(DrmFourcc::Rgbx8888.into()).unwrap();
    let rgb332 = from_fourcc(DrmFourcc::Rgb332.into()).unwrap();

    for level in [0u32, 37, 128, 200, 254] {
        let px = (level << 24) | (level << 16) | (level << 8);
        let mut packed = [0u8; 1];
        convert(&mut packed, &rgb332, &[px], &native, 1, 1);

        let mut back = [0u8; 4];
        convert(&mut back, &native, &[u32::from(packed[0])], &rgb332, 4, 1);
        let red = u32::from_le_bytes(back) >> 24;

        let step = level * 7 / 255;
        assert_eq!(red, step * 255 / 7, "level {}", level);
        assert!(red <= level);
    }
}

#[test]
fn transform_dimension_law() {
    assert_eq!(Transform::Rotate90.dimensions(640, 480), (480, 640));
    assert_eq!(Transform::Normal.dimensions(640, 480), (640, 480));
}

#[test]
fn transform_inverse_law() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let width = rng.gen_range(1..200);
        let height = rng.gen_range(1..200);
        let region = random_region(&mut rng, width, height);
        assert!(region.is_disjoint());

        assert_eq!(Transform::Normal.apply_to_region(width, height, &region), region);

        for t in Transform::ALL {
            let mapped = t.apply_to_region(width, height, &region);
            let (w, h) = t.dimensions(width, height);
            assert!(mapped.is_disjoint());
            assert!(mapped
                .iter()
                .all(|r| r.right() <= u32::from(w) && r.bottom() <= u32::from(h)));
            assert_eq!(t.inverse().apply_to_region(w, h, &mapped), region);
        }
    }
}

#[test]
fn transform_group_is_closed() {
    for a in Transform::ALL {
        assert_eq!(a.inverse().inverse(), a);
        for b in Transform::ALL {
            let ab = a.compose(b);
            assert!(Transform::ALL.contains(&ab));
            // (ab)^-1 = b^-1 a^-1
            assert_eq!(ab.inverse(), b.inverse().compose(a.inverse()));
        }
    }
}

#[test]
fn region_transform_matches_pixel_transform() {
    let mut fb = Framebuffer::new(9, 5, DrmFourcc::Xrgb8888.into()).unwrap();
    let marked = Rect::new(6, 1, 2, 3);
    fb.fill_rect(&marked, 0x00AB_CDEF);

    for t in Transform::ALL {
        let moved = fb.transformed(t);
        let rect = t.apply_to_rect(fb.width(), fb.height(), &marked);
        for y in 0..u32::from(moved.height()) {
            for x in 0..u32::from(moved.width()) {
                let expected = if rect.contains(x, y) { 0x00AB_CDEF } else { 0 };
                assert_eq!(moved.pixel(x, y), Some(expected), "{:?} at {},{}", t, x, y);
            }
        }
    }
}

#[test]
fn draw_dots_and_send_updates() {
    let mut fb = Framebuffer::new(500, 500, DrmFourcc::Rgbx8888.into()).unwrap();
    fb.fill(0xFFFF_FFFF);
    let mut display = Display::new(fb);
    display.take_damage();

    // two overlapping dots
    for (cx, cy) in [(100u16, 100u16), (110, 105)] {
        let dot = Rect::new(cx - 16, cy - 16, 32, 32);
        display.framebuffer_mut().fill_rect(&dot, 0);
        display.damage_region(&Region::from_rect(dot));
    }
    assert!(display.damage().is_disjoint());

    let client = PixelFormat::rgb888();
    let config = OutputConfig::new(client)
        .unwrap()
        .with_transform(Transform::Flipped270)
        .with_compact(true);
    let update = display.render(&config);

    assert_eq!((update.width, update.height), (500, 500));
    let pixels: u64 = update.rects.iter().map(|r| r.rect.area()).sum();
    assert_eq!(pixels, 32 * 32 * 2 - 22 * 27);
    for r in &update.rects {
        assert_eq!(r.data.len() as u64, r.rect.area() * 3);
        assert!(r.data.iter().all(|&b| b == 0));
    }
}
