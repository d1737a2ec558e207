//! Plans how one or two scaler choices combine across a resize, simplifying
//! degenerate cases before any pixel is touched.

use crate::res::Res;
use crate::scaler::iterative::MAX_RATIO;
use crate::scaler::ScalingKind;

/// How a `(first, second)` kernel request is actually executed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Plan {
    /// Sizes match; the resize degenerates to a row copy.
    Copy,
    /// One kernel covers the whole path.
    Single(ScalingKind),
    /// Shrink both axes to the destination spans with `down`, then grow the
    /// remaining axis (if any) with `up`.
    DownThenUp { down: ScalingKind, up: ScalingKind },
    /// Halve with `pre` while either axis still shrinks by more than
    /// `max_ratio`, then complete to the destination with `rest`.
    PreDownThenRest { pre: ScalingKind, rest: ScalingKind, max_ratio: f64 },
}

/// Apply the simplification rules, in order, and pick a plan shape.
pub fn plan(
    first: ScalingKind,
    second: ScalingKind,
    src: Res,
    dst: Res,
    downscale_first: bool,
) -> Plan {
    use ScalingKind::*;

    if src == dst {
        return Plan::Copy;
    }

    let mut k1 = first;
    let mut k2 = second;

    // Pixel-aligned integer growth: every destination pixel covers an exact
    // fraction of one source pixel, so boxsampling equals replication.
    if k2 == Boxsampled && dst.is_integer_multiple_of(src) {
        k1 = Nearest;
        k2 = Nearest;
    }

    // The second stage never shrinks by more than the wrap threshold, so the
    // iterative wrappers add nothing there.
    k2 = match k2 {
        IterBilinear => Bilinear,
        IterBicubic => Bicubic,
        other => other,
    };

    // After that lowering the pair may have become the same family; collapse
    // so the single-kernel path handles it.
    if (k1 == IterBilinear && k2 == Bilinear) || (k1 == IterBicubic && k2 == Bicubic) {
        k2 = k1;
    }

    if k1 == k2 {
        Plan::Single(k1)
    } else if downscale_first {
        Plan::DownThenUp { down: k1, up: k2 }
    } else {
        Plan::PreDownThenRest { pre: k1, rest: k2, max_ratio: MAX_RATIO }
    }
}

/// The intermediate size of a [`Plan::DownThenUp`]: both axes shrunk to the
/// destination span, growth deferred to stage 2.
pub fn down_then_up_mid(src: Res, dst: Res) -> Res {
    Res { w: src.w.min(dst.w), h: src.h.min(dst.h) }
}
