use std::ops::Range;

use super::{clamp_index, Geometry, RunData};
use crate::raster::{PixelSink, PixelSource};

// Nearest source index for destination index `d`:
// round-half-up((d + 0.5) * ratio - 0.5), which folds to floor((d + 0.5) * ratio).
#[inline]
fn source_index(d: u32, ratio: f64, len: u32) -> u32 {
    clamp_index(((f64::from(d) + 0.5) * ratio).floor() as i64, len)
}

/// Destination column -> source column, computed once per call and shared by
/// all chunks.
pub(crate) fn column_map(geom: Geometry) -> Vec<u32> {
    (0..geom.dst.w).map(|di| source_index(di, geom.ratio_x, geom.src.w)).collect()
}

/// Single source read per destination pixel, written through the raw
/// copy-mode store. No premultiplication round-trip and no accumulator.
pub(crate) fn scale_chunk(
    src: &dyn PixelSource,
    rows: Range<u32>,
    dst: &mut dyn PixelSink,
    geom: Geometry,
    run: &RunData,
) {
    let local;
    let cols = match run {
        RunData::NearestMap(cols) => &cols[..],
        RunData::Plain => {
            local = column_map(geom);
            &local[..]
        }
    };

    for dj in rows {
        let sj = source_index(dj, geom.ratio_y, geom.src.h);

        // Consecutive destination pixels often resolve to the same source
        // cell when upscaling; reuse the read.
        let mut last_si = u32::MAX;
        let mut last_px = 0;
        for (di, &si) in cols.iter().enumerate() {
            if si != last_si {
                last_px = src.get_premul_argb32(si, sj);
                last_si = si;
            }
            dst.set_raw_argb32(di as u32, dj, last_px, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PremulImage;
    use crate::res::Res;

    fn run(src: &PremulImage, dst_res: Res) -> PremulImage {
        let mut dst = PremulImage::new(dst_res);
        let geom = Geometry::new(src.res(), dst_res);
        let run = RunData::NearestMap(column_map(geom).into());
        crate::scaler::ScalingKind::Nearest.scale_chunk(src, 0..dst_res.h, &mut dst, geom, &run);
        dst
    }

    #[test]
    fn identity_is_a_copy() {
        let px: Vec<u32> = (0..12u32).map(|i| 0xFF00_0000 | i).collect();
        let src = PremulImage::from_vec((4, 3).into(), px.clone());
        let out = run(&src, (4, 3).into());
        assert_eq!(out.snapshot(), px);
    }

    #[test]
    fn integer_upscale_replicates_blocks() {
        let src = PremulImage::from_vec(
            (2, 2).into(),
            vec![0xFF01_0101, 0xFF02_0202, 0xFF03_0303, 0xFF04_0404],
        );
        let out = run(&src, (4, 4).into());
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.get(x, y), src.get(x / 2, y / 2), "at {x},{y}");
            }
        }
    }

    #[test]
    fn column_map_rounds_half_up() {
        // 4 -> 2: source centers 0.5 and 2.5 round half-up to 1 and 3.
        let geom = Geometry::new((4, 1).into(), (2, 1).into());
        assert_eq!(column_map(geom), vec![1, 3]);

        // 5 -> 2: floor(0.5 * 2.5) = 1, floor(1.5 * 2.5) = 3
        let geom = Geometry::new((5, 1).into(), (2, 1).into());
        assert_eq!(column_map(geom), vec![1, 3]);

        // 2 -> 3: floor(0.5 * 2/3) = 0, floor(1.5 * 2/3) = 1, floor(2.5 * 2/3) = 1
        let geom = Geometry::new((2, 1).into(), (3, 1).into());
        assert_eq!(column_map(geom), vec![0, 1, 1]);
    }
}
