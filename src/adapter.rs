//! Bridges between the premultiplied core and the straight-alpha buffer
//! types of the `image` crate. Conversions round half-up in both directions.

use std::sync::Arc;

use image::RgbaImage;

use crate::raster::{PixelSource, PremulImage};
use crate::res::Res;

fn premul_channel(c: u8, a: u8) -> u32 {
    (f64::from(c) * f64::from(a) / 255.0 + 0.5).floor() as u32
}

fn straight_channel(c: u32, a: u32) -> u8 {
    if a == 0 {
        return 0;
    }
    (c as f64 * 255.0 / a as f64 + 0.5).floor().min(255.0) as u8
}

/// Convert a straight-alpha RGBA buffer into an owned premultiplied image.
pub fn premul_from_rgba(img: &RgbaImage) -> PremulImage {
    let res = Res { w: img.width(), h: img.height() };
    let out = PremulImage::new(res);
    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let p = (u32::from(a) << 24)
            | (premul_channel(r, a) << 16)
            | (premul_channel(g, a) << 8)
            | premul_channel(b, a);
        out.set(x, y, p);
    }
    out
}

/// Write a premultiplied image back out as straight-alpha RGBA. Fully
/// transparent pixels come back as zeroed RGBA.
pub fn rgba_from_premul(img: &PremulImage) -> RgbaImage {
    let res = img.res();
    RgbaImage::from_fn(res.w, res.h, |x, y| {
        let p = img.get(x, y);
        let a = p >> 24;
        image::Rgba([
            straight_channel(p >> 16 & 0xFF, a),
            straight_channel(p >> 8 & 0xFF, a),
            straight_channel(p & 0xFF, a),
            a as u8,
        ])
    })
}

/// Read-only premultiplied view over a shared straight-alpha buffer,
/// converting on every read. Snapshot with [`premul_from_rgba`] instead when
/// the same source gets scaled more than once.
#[derive(Debug, Clone)]
pub struct RgbaSource {
    data: Arc<RgbaImage>,
}

impl RgbaSource {
    pub fn new(img: RgbaImage) -> Self {
        Self { data: Arc::new(img) }
    }
}

impl From<RgbaImage> for RgbaSource {
    fn from(img: RgbaImage) -> Self {
        Self::new(img)
    }
}

impl PixelSource for RgbaSource {
    fn width(&self) -> u32 {
        self.data.width()
    }

    fn height(&self) -> u32 {
        self.data.height()
    }

    fn get_premul_argb32(&self, x: u32, y: u32) -> u32 {
        let [r, g, b, a] = self.data.get_pixel(x, y).0;
        (u32::from(a) << 24)
            | (premul_channel(r, a) << 16)
            | (premul_channel(g, a) << 8)
            | premul_channel(b, a)
    }

    fn duplicate(&self) -> Box<dyn PixelSource> {
        Box::new(self.clone())
    }

    fn storage_token(&self) -> usize {
        Arc::as_ptr(&self.data) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::is_valid_premul;

    #[test]
    fn opaque_pixels_convert_verbatim() {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([0x12, 0x34, 0x56, 0xFF]));
        let premul = premul_from_rgba(&img);
        assert_eq!(premul.get(0, 0), 0xFF12_3456);
        assert_eq!(rgba_from_premul(&premul).get_pixel(1, 1).0, [0x12, 0x34, 0x56, 0xFF]);
    }

    #[test]
    fn premultiplication_rounds_half_up() {
        // 0x80 * 0x80 / 255 = 64.25 -> 64; 0xFF * 0x80 / 255 = 128
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0x80, 0xFF, 0x00, 0x80]));
        let premul = premul_from_rgba(&img);
        assert_eq!(premul.get(0, 0), 0x8040_8000);
        assert!(is_valid_premul(premul.get(0, 0)));
    }

    #[test]
    fn transparent_round_trips_to_zero() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0xAA, 0xBB, 0xCC, 0x00]));
        let premul = premul_from_rgba(&img);
        assert_eq!(premul.get(0, 0), 0);
        assert_eq!(rgba_from_premul(&premul).get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn source_view_matches_snapshot_conversion() {
        let img = RgbaImage::from_fn(4, 3, |x, y| {
            image::Rgba([x as u8 * 40, y as u8 * 70, 0x33, 0x80 + x as u8])
        });
        let snapshot = premul_from_rgba(&img);
        let view = RgbaSource::new(img);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(view.get_premul_argb32(x, y), snapshot.get(x, y));
            }
        }
        assert_ne!(view.storage_token(), 0);
    }
}
