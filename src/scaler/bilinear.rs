use std::ops::Range;

use super::{clamp_index, Geometry};
use crate::pixel::PixelAccumulator;
use crate::raster::{PixelSink, PixelSource};

/// 2x2 kernel with linear weights, accumulated in premultiplied space.
pub(crate) fn scale_chunk(
    src: &dyn PixelSource,
    rows: Range<u32>,
    dst: &mut dyn PixelSink,
    geom: Geometry,
) {
    let mut acc = PixelAccumulator::new();

    for dj in rows {
        let sy = (f64::from(dj) + 0.5) * geom.ratio_y - 0.5;
        let fy = sy.floor();
        let wy1 = sy - fy;
        let wy0 = 1.0 - wy1;
        let y0 = clamp_index(fy as i64, geom.src.h);
        let y1 = clamp_index(fy as i64 + 1, geom.src.h);

        for di in 0..geom.dst.w {
            let sx = (f64::from(di) + 0.5) * geom.ratio_x - 0.5;
            let fx = sx.floor();
            let wx1 = sx - fx;
            let wx0 = 1.0 - wx1;
            let x0 = clamp_index(fx as i64, geom.src.w);
            let x1 = clamp_index(fx as i64 + 1, geom.src.w);

            acc.clear();
            acc.add(src.get_premul_argb32(x0, y0), wx0 * wy0);
            acc.add(src.get_premul_argb32(x1, y0), wx1 * wy0);
            acc.add(src.get_premul_argb32(x0, y1), wx0 * wy1);
            acc.add(src.get_premul_argb32(x1, y1), wx1 * wy1);
            dst.set_premul_argb32(di, dj, acc.emit_unit());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::is_valid_premul;
    use crate::raster::PremulImage;
    use crate::res::Res;

    fn run(src: &PremulImage, dst_res: Res) -> PremulImage {
        let mut dst = PremulImage::new(dst_res);
        let geom = Geometry::new(src.res(), dst_res);
        scale_chunk(src, 0..dst_res.h, &mut dst, geom);
        dst
    }

    #[test]
    fn two_by_two_to_one_averages_all_corners() {
        let src = PremulImage::from_vec(
            (2, 2).into(),
            vec![0xFF00_0000, 0xFF00_0000, 0xFFFF_FFFF, 0xFFFF_FFFF],
        );
        let out = run(&src, (1, 1).into());
        // All four weights are 0.25; 127.5 rounds half-up to 0x80.
        assert_eq!(out.get(0, 0), 0xFF80_8080);
    }

    #[test]
    fn flat_image_stays_flat() {
        let src = PremulImage::from_vec((5, 3).into(), vec![0x8040_2010; 15]);
        let out = run(&src, (9, 7).into());
        for p in out.snapshot() {
            assert_eq!(p, 0x8040_2010);
        }
    }

    #[test]
    fn edges_clamp_instead_of_wrapping() {
        // A bright left column and dark right column; upscaling must not leak
        // the right edge into the left edge.
        let src = PremulImage::from_vec((2, 1).into(), vec![0xFFFF_FFFF, 0xFF00_0000]);
        let out = run(&src, (8, 1).into());
        assert_eq!(out.get(0, 0), 0xFFFF_FFFF);
        assert_eq!(out.get(7, 0), 0xFF00_0000);
        for p in out.snapshot() {
            assert!(is_valid_premul(p));
        }
    }
}
