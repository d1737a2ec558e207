//! Iterative halving: repeated 2x downscales ahead of a final exact pass, so
//! kernels with small footprints don't alias on strong shrinks. Upscales are
//! never iterated.

use crate::chunk;
use crate::executor::Executor;
use crate::raster::{PixelSink, PixelSource, PremulImage};
use crate::res::Res;
use crate::scaler::ScalingKind;
use crate::Result;

pub(crate) const MAX_RATIO: f64 = 2.0;

// One halving step: each axis whose remaining shrink ratio exceeds
// MAX_RATIO moves to ceil(span / 2); the other axis holds still. Returns
// `cur` unchanged once no axis needs another pass.
fn half_step(cur: Res, target: Res) -> Res {
    let halve = |span: u32, goal: u32| {
        if f64::from(span) / f64::from(goal) > MAX_RATIO { span.div_ceil(2) } else { span }
    };
    Res { w: halve(cur.w, target.w), h: halve(cur.h, target.h) }
}

/// The intermediate sizes a `src -> dst` downscale passes through, excluding
/// both endpoints. Empty when one pass suffices.
pub(crate) fn halving_spans(src: Res, dst: Res) -> Vec<Res> {
    let mut spans = Vec::new();
    let mut cur = src;
    loop {
        let next = half_step(cur, dst);
        if next == cur {
            return spans;
        }
        spans.push(next);
        cur = next;
    }
}

/// Halve with `halve`'s kernel until the remaining per-axis ratio is at most
/// [`MAX_RATIO`], then complete to the exact destination with `finish`. Each
/// pass runs through the chunk engine; one scratch image is alive at a time.
///
/// `Single(IterX)` plans use the base kernel for both roles;
/// `PreDownThenRest` supplies its second-stage kind as `finish`.
pub(crate) fn downscale_with(
    halve: ScalingKind,
    finish: ScalingKind,
    src: &dyn PixelSource,
    dst: &mut dyn PixelSink,
    executor: Option<&dyn Executor>,
) -> Result<()> {
    debug_assert!(!halve.is_iterative() && !finish.is_iterative());

    let source_res = Res { w: src.width(), h: src.height() };
    let target = Res { w: dst.width(), h: dst.height() };

    let mut scratch: Option<PremulImage> = None;
    for next in halving_spans(source_res, target) {
        let mut inter = PremulImage::new(next);
        match &scratch {
            None => chunk::run(halve, src, &mut inter, executor)?,
            Some(prev) => chunk::run(halve, prev, &mut inter, executor)?,
        }
        scratch = Some(inter);
    }

    match &scratch {
        None => chunk::run(finish, src, dst, executor),
        Some(prev) => chunk::run(finish, prev, dst, executor),
    }
}
