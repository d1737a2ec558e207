use thiserror::Error;

/// Failures surfaced by [`Resizer::resize`](crate::Resizer::resize).
///
/// Kernels themselves are infallible once inputs are validated; anything that
/// goes wrong inside a worker chunk is reported as [`ResizeError::TaskFailure`]
/// after every outstanding chunk has finished.
#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("source and destination share the same pixel storage")]
    AliasedImages,

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The chunk-splitting heuristics work in signed 32-bit areas.
    #[error("image area {width}x{height} overflows the splitting heuristics")]
    AreaOverflow { width: u32, height: u32 },

    #[error("chunk task failed: {0}")]
    TaskFailure(String),
}
