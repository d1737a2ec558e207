use std::ops::Range;

use super::{clamp_index, Geometry};
use crate::pixel::PixelAccumulator;
use crate::raster::{PixelSink, PixelSource};

// Coverage ratios below this are treated as zero. Guards against pathological
// sub-pixel leaks when a span boundary lands a hair inside a neighbor column.
const MIN_RATIO: f64 = 1.0 / i32::MAX as f64;

/// Exact area-weighted averaging: every destination pixel is the mean of the
/// source area it covers, with fractional edge coverage.
pub(crate) fn scale_chunk(
    src: &dyn PixelSource,
    rows: Range<u32>,
    dst: &mut dyn PixelSink,
    geom: Geometry,
) {
    let aligned = geom.src.w % geom.dst.w == 0 && geom.src.h % geom.dst.h == 0;
    if aligned && geom.dst.shrinks_from(geom.src) {
        aligned_chunk(src, rows, dst, geom);
    } else {
        general_chunk(src, rows, dst, geom);
    }
}

// Fast path: both spans divide evenly, every destination pixel covers exactly
// span_x * span_y source pixels with unit weight.
fn aligned_chunk(src: &dyn PixelSource, rows: Range<u32>, dst: &mut dyn PixelSink, geom: Geometry) {
    let span_x = geom.src.w / geom.dst.w;
    let span_y = geom.src.h / geom.dst.h;
    let surface = f64::from(span_x * span_y);
    let mut acc = PixelAccumulator::new();

    for dj in rows {
        let sy0 = dj * span_y;
        for di in 0..geom.dst.w {
            let sx0 = di * span_x;

            acc.clear();
            for sj in sy0..sy0 + span_y {
                for si in sx0..sx0 + span_x {
                    acc.add_full(src.get_premul_argb32(si, sj));
                }
            }
            dst.set_premul_argb32(di, dj, acc.emit_averaged(surface));
        }
    }
}

// One axis of the clipped coverage window, in border coordinates where the
// image spans [0, len]: a partial low span, whole central spans, a partial
// high span.
#[derive(Debug, Clone, Copy)]
struct AxisSpan {
    lo_i: i64,
    lo_w: f64,
    full_min: i64,
    full_max: i64,
    hi_i: i64,
    hi_w: f64,
    clipped: f64,
}

fn axis_span(d: u32, ratio: f64, len: u32) -> AxisSpan {
    let center = (f64::from(d) + 0.5) * ratio - 0.5;
    // Clip [center - ratio/2, center + ratio/2] to the image borders, then
    // shift by +0.5 so coordinates run over [0, len].
    let min = (center - ratio * 0.5 + 0.5).max(0.0);
    let max = (center + ratio * 0.5 + 0.5).min(f64::from(len));

    let f0 = min.floor();
    let f1 = max.floor();

    if f0 == f1 || f0 + 1.0 == max {
        // The whole clipped span lies inside one column.
        AxisSpan {
            lo_i: f0 as i64,
            lo_w: max - min,
            full_min: f0 as i64 + 1,
            full_max: i64::MIN,
            hi_i: 0,
            hi_w: 0.0,
            clipped: max - min,
        }
    } else {
        AxisSpan {
            lo_i: f0 as i64,
            lo_w: (f0 + 1.0) - min,
            full_min: f0 as i64 + 1,
            full_max: f1 as i64 - 1,
            hi_i: f1 as i64,
            hi_w: max - f1,
            clipped: max - min,
        }
    }
}

fn general_chunk(src: &dyn PixelSource, rows: Range<u32>, dst: &mut dyn PixelSink, geom: Geometry) {
    let mut acc = PixelAccumulator::new();

    // Column decompositions don't depend on the row.
    let spans_x: Vec<AxisSpan> = (0..geom.dst.w)
        .map(|di| axis_span(di, geom.ratio_x, geom.src.w))
        .collect();

    for dj in rows {
        let sy = axis_span(dj, geom.ratio_y, geom.src.h);

        for (di, &sx) in spans_x.iter().enumerate() {
            let di = di as u32;
            let inv_surface = 1.0 / (sx.clipped * sy.clipped);
            if !inv_surface.is_finite() {
                // Degenerate clip: the destination center fell outside the
                // source. Read the nearest source pixel instead.
                let cx = (f64::from(di) + 0.5) * geom.ratio_x - 0.5;
                let cy = (f64::from(dj) + 0.5) * geom.ratio_y - 0.5;
                let p = src.get_premul_argb32(
                    clamp_index((cx + 0.5).floor() as i64, geom.src.w),
                    clamp_index((cy + 0.5).floor() as i64, geom.src.h),
                );
                dst.set_premul_argb32(di, dj, p);
                continue;
            }

            acc.clear();

            if sy.lo_w > MIN_RATIO {
                accumulate_row(src, &mut acc, sx, sy.lo_i as u32, sy.lo_w);
            }
            for sj in sy.full_min..=sy.full_max {
                let sj = sj as u32;
                if sx.lo_w > MIN_RATIO {
                    acc.add(src.get_premul_argb32(sx.lo_i as u32, sj), sx.lo_w);
                }
                // The inner rectangle dominates on strong downscales;
                // x-innermost for locality.
                for si in sx.full_min..=sx.full_max {
                    acc.add_full(src.get_premul_argb32(si as u32, sj));
                }
                if sx.hi_w > MIN_RATIO {
                    acc.add(src.get_premul_argb32(sx.hi_i as u32, sj), sx.hi_w);
                }
            }
            if sy.hi_w > MIN_RATIO {
                accumulate_row(src, &mut acc, sx, sy.hi_i as u32, sy.hi_w);
            }

            dst.set_premul_argb32(di, dj, acc.emit_scaled(inv_surface));
        }
    }
}

// One partial row: corners at the partial columns, wy per central pixel.
#[inline]
fn accumulate_row(
    src: &dyn PixelSource,
    acc: &mut PixelAccumulator,
    sx: AxisSpan,
    sj: u32,
    wy: f64,
) {
    if sx.lo_w * wy > MIN_RATIO {
        acc.add(src.get_premul_argb32(sx.lo_i as u32, sj), sx.lo_w * wy);
    }
    for si in sx.full_min..=sx.full_max {
        acc.add(src.get_premul_argb32(si as u32, sj), wy);
    }
    if sx.hi_w * wy > MIN_RATIO {
        acc.add(src.get_premul_argb32(sx.hi_i as u32, sj), sx.hi_w * wy);
    }
}
