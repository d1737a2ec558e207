//! Splits destination rows into chunks and dispatches them to an executor.
//!
//! Chunk row ranges partition `[0, DH)` exactly once, so workers write
//! disjoint destination rows and results are bit-identical to a sequential
//! run. The submitting thread blocks until every chunk has finished; an mpsc
//! channel plays the completion latch, and a dropped sender (a task that
//! panicked past containment or was discarded by the executor) still
//! releases it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;

use crate::executor::{worker_count, Executor};
use crate::raster::{PixelSink, PixelSource};
use crate::res::Res;
use crate::scaler::{Geometry, ScalingKind};
use crate::{Result, ResizeError};

/// Run one whole-image pass of a primitive kernel, splitting rows across the
/// executor when one is supplied and the work is worth splitting.
pub(crate) fn run(
    kind: ScalingKind,
    src: &dyn PixelSource,
    dst: &mut dyn PixelSink,
    executor: Option<&dyn Executor>,
) -> Result<()> {
    debug_assert!(!kind.is_iterative());

    let geom = Geometry::new(
        Res { w: src.width(), h: src.height() },
        Res { w: dst.width(), h: dst.height() },
    );
    let run_data = kind.compute_run_data(geom);

    let chunks = executor.map_or(1, |_| chunk_count(kind, geom.src, geom.dst));
    let Some(executor) = executor.filter(|_| chunks > 1) else {
        kind.scale_chunk(src, 0..geom.dst.h, dst, geom, &run_data);
        return Ok(());
    };

    debug!("Splitting {} {:?} -> {:?} into {chunks} chunks", kind, geom.src, geom.dst);

    let (latch, completions) = mpsc::channel::<std::result::Result<(), String>>();
    let mut start = 0;
    for bound in split_bounds(geom.dst.h, chunks) {
        let rows = start..bound;
        start = bound;

        let src_view = src.duplicate();
        let mut dst_view = dst.duplicate();
        let run_data = run_data.clone();
        let latch = latch.clone();
        executor.submit(Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                kind.scale_chunk(&*src_view, rows, &mut *dst_view, geom, &run_data);
            }))
            .map_err(|e| panic_message(&*e));
            // A send failure means the submitter already gave up; nothing
            // left to report to.
            let _ = latch.send(outcome);
        }));
    }
    drop(latch);

    // Block with no timeout until every task has reported or dropped its
    // sender. The first failure wins; later ones only get logged.
    let mut completed = 0u32;
    let mut first_failure = None;
    for outcome in completions {
        completed += 1;
        if let Err(e) = outcome {
            error!("Chunk task failed: {e}");
            first_failure.get_or_insert(e);
        }
    }
    if completed < chunks && first_failure.is_none() {
        first_failure = Some("executor dropped a chunk task".to_string());
    }

    first_failure.map_or(Ok(()), |e| Err(ResizeError::TaskFailure(e)))
}

// N = min(cores * 10, max(ceil((SW*SH + 1) / src_thr),
//                         ceil((DW*DH + 1) / dst_thr))), clamped to [1, DH].
// Areas were validated to fit in i32 well before this point.
fn chunk_count(kind: ScalingKind, src: Res, dst: Res) -> u32 {
    let (src_thr, dst_thr) = kind.thresholds();
    let by_src = ceil_div(src.area() as i64 + 1, i64::from(src_thr));
    let by_dst = ceil_div(dst.area() as i64 + 1, i64::from(dst_thr));

    let cap = worker_count() as i64 * 10;
    cap.min(by_src.max(by_dst)).clamp(1, i64::from(dst.h)) as u32
}

#[inline]
fn ceil_div(a: i64, b: i64) -> i64 {
    (a + b - 1) / b
}

// Chunk k of n ends (exclusively) at floor(k * DH / N + 0.5). With n <= DH
// every range is non-empty and the last one ends at DH.
fn split_bounds(dh: u32, n: u32) -> impl Iterator<Item = u32> {
    debug_assert!(n >= 1 && n <= dh);
    (1..=n).map(move |k| {
        (f64::from(k) * f64::from(dh) / f64::from(n) + 0.5).floor() as u32
    })
}

fn panic_message(e: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = e.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InlineExecutor;
    use crate::raster::PremulImage;

    fn assert_partition(dh: u32, n: u32) {
        let mut start = 0;
        let mut ranges = Vec::new();
        for bound in split_bounds(dh, n) {
            assert!(bound > start, "empty range at {start} for {dh}/{n}");
            ranges.push(start..bound);
            start = bound;
        }
        assert_eq!(ranges.len(), n as usize);
        assert_eq!(start, dh, "last range must end at DH");
        let covered: u32 = ranges.iter().map(|r| r.end - r.start).sum();
        assert_eq!(covered, dh);
    }

    #[test]
    fn partition_completeness() {
        for dh in 1..=64 {
            for n in 1..=dh {
                assert_partition(dh, n);
            }
        }
        assert_partition(1080, 7);
        assert_partition(1081, 13);
        assert_partition(5000, 80);
    }

    #[test]
    fn chunk_count_respects_thresholds() {
        // Tiny destination: never split.
        assert_eq!(chunk_count(ScalingKind::Bilinear, (100, 100).into(), (10, 10).into()), 1);

        // Boxsampled is driven by source area even when the destination is
        // small: ceil((2_000*2_000 + 1) / 2^14) = 245, capped by cores * 10
        // and by DH.
        let n = chunk_count(ScalingKind::Boxsampled, (2000, 2000).into(), (500, 500).into());
        let cap = (worker_count() as u32 * 10).min(500);
        assert_eq!(n, 245.min(cap));

        // Destination-driven kernels ignore a huge source.
        let n = chunk_count(ScalingKind::Nearest, (2000, 2000).into(), (64, 64).into());
        assert_eq!(n, 1);
    }

    #[test]
    fn chunk_count_never_exceeds_rows() {
        let n = chunk_count(ScalingKind::Bicubic, (64, 64).into(), (4000, 3).into());
        assert!(n <= 3);
        assert!(n >= 1);
    }

    #[test]
    fn parallel_matches_sequential_inline() {
        // 200x200 source pushes boxsampled past its source threshold, so the
        // inline-executor run actually goes through the split path.
        let px: Vec<u32> = (0..200u32 * 200)
            .map(|i| {
                let v = (i * 37 + 11) % 256;
                0xFF00_0000 | (v << 16) | (v << 8) | v
            })
            .collect();
        let src = PremulImage::from_vec((200, 200).into(), px);
        assert!(chunk_count(ScalingKind::Boxsampled, (200, 200).into(), (50, 50).into()) > 1);

        let mut seq = PremulImage::new((50, 50).into());
        run(ScalingKind::Boxsampled, &src, &mut seq, None).unwrap();

        let mut par = PremulImage::new((50, 50).into());
        run(ScalingKind::Boxsampled, &src, &mut par, Some(&InlineExecutor)).unwrap();

        assert_eq!(seq.snapshot(), par.snapshot());
    }
}
