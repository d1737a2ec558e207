use std::time::Instant;

use crate::compose::{self, Plan};
use crate::executor::Executor;
use crate::raster::{PixelSink, PixelSource, PremulImage};
use crate::res::Res;
use crate::scaler::{iterative, ScalingKind};
use crate::{chunk, Result, ResizeError};

/// Per-call options. The defaults match the common case: shrink before any
/// growth, and let workers touch the caller's images directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    /// Pick [`Plan::DownThenUp`] over [`Plan::PreDownThenRest`] when the two
    /// requested kinds differ.
    pub downscale_first: bool,
    /// Allow worker views of the caller's source. When false the source is
    /// snapshotted into an internal buffer before scaling.
    pub allow_src_direct: bool,
    /// Allow worker views of the caller's destination. When false scaling
    /// renders into an internal buffer that is blitted once at the end.
    pub allow_dst_direct: bool,
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self { downscale_first: true, allow_src_direct: true, allow_dst_direct: true }
    }
}

/// The entry point. Stateless and freely shareable; a single value can serve
/// any number of threads.
#[derive(Debug, Default)]
pub struct Resizer;

impl Resizer {
    pub const fn new() -> Self {
        Self
    }

    /// Scale `src` into `dst` using `first` for the downscale leg and
    /// `second` for the upscale leg of the plan.
    ///
    /// With `executor: None` everything runs on the calling thread. With an
    /// executor, destination rows are chunked across its workers; results
    /// are bit-identical either way.
    pub fn resize(
        &self,
        first: ScalingKind,
        second: ScalingKind,
        src: &dyn PixelSource,
        dst: &mut dyn PixelSink,
        executor: Option<&dyn Executor>,
        params: ResizeParams,
    ) -> Result<()> {
        let src_res = Res { w: src.width(), h: src.height() };
        let dst_res = Res { w: dst.width(), h: dst.height() };

        let src_token = src.storage_token();
        if src_token != 0 && src_token == dst.storage_token() {
            return Err(ResizeError::AliasedImages);
        }
        validate_res(src_res)?;
        validate_res(dst_res)?;

        let start = Instant::now();
        let plan = compose::plan(first, second, src_res, dst_res, params.downscale_first);
        debug!("Scaling {src_res} -> {dst_res} as {plan:?}");

        // Defensive copies when the caller's adapters can't be handed to
        // workers as-is.
        let src_copy = (!params.allow_src_direct).then(|| snapshot(src));
        let source: &dyn PixelSource = match &src_copy {
            Some(copy) => copy,
            None => src,
        };

        if params.allow_dst_direct {
            execute(plan, src_res, dst_res, source, dst, executor)?;
        } else {
            let mut staging = PremulImage::new(dst_res);
            execute(plan, src_res, dst_res, source, &mut staging, executor)?;
            blit(&staging, dst);
        }

        trace!("Finished scaling {src_res} -> {dst_res} in {:?}", start.elapsed());
        Ok(())
    }
}

fn validate_res(res: Res) -> Result<()> {
    if res.is_zero_area() {
        return Err(ResizeError::InvalidDimensions { width: res.w, height: res.h });
    }
    // The split heuristics and coverage ratios assume areas fit in i32.
    if res.area() > i32::MAX as u64 {
        return Err(ResizeError::AreaOverflow { width: res.w, height: res.h });
    }
    Ok(())
}

fn execute(
    plan: Plan,
    src_res: Res,
    dst_res: Res,
    src: &dyn PixelSource,
    dst: &mut dyn PixelSink,
    executor: Option<&dyn Executor>,
) -> Result<()> {
    match plan {
        // Nearest with an identity map degenerates to a raw row copy.
        Plan::Copy => chunk::run(ScalingKind::Nearest, src, dst, executor),
        Plan::Single(kind) => run_kind(kind, src, dst, executor),
        Plan::DownThenUp { down, up } => {
            let mid = compose::down_then_up_mid(src_res, dst_res);
            if mid == src_res {
                // Nothing shrinks; the whole resize is stage 2.
                run_kind(up, src, dst, executor)
            } else if mid == dst_res {
                // Stage 1 already lands on the destination size and stage 2
                // would be an identity pass.
                run_kind(down, src, dst, executor)
            } else {
                let mut inter = PremulImage::new(mid);
                run_kind(down, src, &mut inter, executor)?;
                run_kind(up, &inter, dst, executor)
            }
        }
        Plan::PreDownThenRest { pre, rest, .. } => {
            iterative::downscale_with(pre.base(), rest.base(), src, dst, executor)
        }
    }
}

fn run_kind(
    kind: ScalingKind,
    src: &dyn PixelSource,
    dst: &mut dyn PixelSink,
    executor: Option<&dyn Executor>,
) -> Result<()> {
    if kind.is_iterative() {
        iterative::downscale_with(kind.base(), kind.base(), src, dst, executor)
    } else {
        chunk::run(kind, src, dst, executor)
    }
}

fn snapshot(src: &dyn PixelSource) -> PremulImage {
    let res = Res { w: src.width(), h: src.height() };
    let copy = PremulImage::new(res);
    for y in 0..res.h {
        for x in 0..res.w {
            copy.set(x, y, src.get_premul_argb32(x, y));
        }
    }
    copy
}

fn blit(staging: &PremulImage, dst: &mut dyn PixelSink) {
    let res = staging.res();
    for y in 0..res.h {
        for x in 0..res.w {
            dst.set_raw_argb32(x, y, staging.get(x, y), true);
        }
    }
}
