use std::ops::Range;
use std::sync::Arc;

use derive_more::Display;

use crate::raster::{PixelSink, PixelSource};
use crate::res::Res;

pub(crate) mod bicubic;
pub(crate) mod bilinear;
pub(crate) mod boxsampled;
pub(crate) mod iterative;
pub(crate) mod nearest;

/// The closed catalogue of resampling kernels.
///
/// The iterative variants wrap their base kernel in repeated 2x halving so
/// strong downscales don't alias; on upscales they behave exactly like the
/// base kernel.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ScalingKind {
    Nearest,
    Bilinear,
    Bicubic,
    Boxsampled,
    IterBilinear,
    IterBicubic,
}

impl ScalingKind {
    pub const fn is_iterative(self) -> bool {
        match self {
            Self::IterBilinear | Self::IterBicubic => true,
            Self::Nearest | Self::Bilinear | Self::Bicubic | Self::Boxsampled => false,
        }
    }

    /// The primitive kernel that actually runs over chunks.
    pub const fn base(self) -> Self {
        match self {
            Self::IterBilinear => Self::Bilinear,
            Self::IterBicubic => Self::Bicubic,
            k => k,
        }
    }

    // (source, destination) area thresholds for the chunk split heuristic.
    // i32::MAX means that dimension never drives a split. Boxsampled is the
    // only kernel whose cost scales with source area.
    pub(crate) const fn thresholds(self) -> (i32, i32) {
        match self {
            Self::Nearest => (i32::MAX, 1 << 15),
            Self::Bilinear | Self::IterBilinear => (i32::MAX, 1 << 14),
            Self::Bicubic | Self::IterBicubic => (i32::MAX, 1 << 13),
            Self::Boxsampled => (1 << 14, 1 << 12),
        }
    }

    /// Per-call payload computed once and shared by every chunk.
    pub(crate) fn compute_run_data(self, geom: Geometry) -> RunData {
        match self.base() {
            Self::Nearest => RunData::NearestMap(nearest::column_map(geom).into()),
            _ => RunData::Plain,
        }
    }

    /// Render destination rows `rows` of the whole scale described by `geom`.
    /// Inputs are validated by the facade; this never fails.
    pub(crate) fn scale_chunk(
        self,
        src: &dyn PixelSource,
        rows: Range<u32>,
        dst: &mut dyn PixelSink,
        geom: Geometry,
        run: &RunData,
    ) {
        debug_assert!(rows.end <= geom.dst.h);

        match self.base() {
            Self::Nearest => nearest::scale_chunk(src, rows, dst, geom, run),
            Self::Bilinear => bilinear::scale_chunk(src, rows, dst, geom),
            Self::Bicubic => bicubic::scale_chunk(src, rows, dst, geom),
            Self::Boxsampled => boxsampled::scale_chunk(src, rows, dst, geom),
            Self::IterBilinear | Self::IterBicubic => unreachable!("base() is primitive"),
        }
    }
}

/// Shared per-call geometry. Pixel centers sit at integer coordinates,
/// borders at half-integers; the center of destination pixel `d` maps to
/// `(d + 0.5) * ratio - 0.5` in source space.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Geometry {
    pub src: Res,
    pub dst: Res,
    pub ratio_x: f64,
    pub ratio_y: f64,
}

impl Geometry {
    pub fn new(src: Res, dst: Res) -> Self {
        Self {
            src,
            dst,
            ratio_x: f64::from(src.w) / f64::from(dst.w),
            ratio_y: f64::from(src.h) / f64::from(dst.h),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum RunData {
    Plain,
    // Destination column -> source column, from the nearest kernel.
    NearestMap(Arc<[u32]>),
}

// Source indices outside the image clamp to the edge (replication), never
// wrap.
#[inline]
pub(crate) fn clamp_index(v: i64, len: u32) -> u32 {
    v.clamp(0, i64::from(len) - 1) as u32
}
