//! Parallel premultiplied-alpha raster scaling.
//!
//! A small catalogue of resampling kernels (nearest, bilinear, bicubic and
//! exact box sampling, plus iterative-halving wrappers), a planner that
//! composes them across a downscale-then-upscale path, and a chunk engine
//! that splits destination rows across an external worker pool while keeping
//! results bit-identical to a sequential run.

#[macro_use]
extern crate log;

pub use error::ResizeError;
pub use executor::{default_pool, Executor, InlineExecutor};
pub use facade::{ResizeParams, Resizer};
pub use pixel::PixelAccumulator;
pub use raster::{PixelSink, PixelSource, PremulImage};
pub use res::Res;
pub use scaler::ScalingKind;

pub mod adapter;
mod chunk;
pub mod compose;
mod error;
mod executor;
mod facade;
pub mod pixel;
mod raster;
mod res;
mod scaler;

pub type Result<T> = std::result::Result<T, ResizeError>;
