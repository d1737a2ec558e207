use std::ops::Range;

use super::{clamp_index, Geometry};
use crate::pixel::PixelAccumulator;
use crate::raster::{PixelSink, PixelSource};

// Mitchell-family cubic with a = -0.5 (Catmull-Rom). Negative lobes between
// |x| = 1 and 2, so accumulator sums are signed and emit saturates.
const A: f64 = -0.5;

#[inline]
fn cubic_weight(x: f64) -> f64 {
    let x = x.abs();
    if x <= 1.0 {
        x * x * (x * (A + 2.0) - (A + 3.0)) + 1.0
    } else if x <= 2.0 {
        A * (x * x * (x - 5.0) + 8.0 * x - 4.0)
    } else {
        0.0
    }
}

/// 4x4 kernel over the neighborhood `k in {-1, 0, 1, 2}` around the mapped
/// center, in premultiplied space.
pub(crate) fn scale_chunk(
    src: &dyn PixelSource,
    rows: Range<u32>,
    dst: &mut dyn PixelSink,
    geom: Geometry,
) {
    let mut acc = PixelAccumulator::new();
    let mut wx = [0.0f64; 4];
    let mut xs = [0u32; 4];

    for dj in rows {
        let sy = (f64::from(dj) + 0.5) * geom.ratio_y - 0.5;
        let fy = sy.floor();
        let fry = sy - fy;

        let mut wy = [0.0f64; 4];
        let mut ys = [0u32; 4];
        for k in 0..4 {
            wy[k] = cubic_weight(k as f64 - 1.0 - fry);
            ys[k] = clamp_index(fy as i64 + k as i64 - 1, geom.src.h);
        }

        for di in 0..geom.dst.w {
            let sx = (f64::from(di) + 0.5) * geom.ratio_x - 0.5;
            let fx = sx.floor();
            let frx = sx - fx;

            for k in 0..4 {
                wx[k] = cubic_weight(k as f64 - 1.0 - frx);
                xs[k] = clamp_index(fx as i64 + k as i64 - 1, geom.src.w);
            }

            acc.clear();
            for ky in 0..4 {
                for kx in 0..4 {
                    acc.add(src.get_premul_argb32(xs[kx], ys[ky]), wx[kx] * wy[ky]);
                }
            }
            dst.set_premul_argb32(di, dj, acc.emit_unit());
        }
    }
}
