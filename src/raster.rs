//! The pixel I/O contract the kernels scale through, and the built-in
//! premultiplied carrier used for intermediates and tests.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::pixel;
use crate::res::Res;

/// Random-access reads of premultiplied ARGB32 pixels.
///
/// Reads must be pure and deterministic: the same `(x, y)` always yields the
/// same value for the lifetime of a resize call. Workers never share a handle;
/// each gets its own [`duplicate`](PixelSource::duplicate).
pub trait PixelSource: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn get_premul_argb32(&self, x: u32, y: u32) -> u32;

    /// An independent handle over the same pixels, safe to move to another
    /// worker thread. May share underlying storage read-only.
    fn duplicate(&self) -> Box<dyn PixelSource>;

    /// Identity of the backing storage, 0 when opaque. Equal nonzero tokens
    /// on a source/sink pair mean the images alias and the resize is refused.
    fn storage_token(&self) -> usize {
        0
    }
}

/// Random-access writes of premultiplied ARGB32 pixels.
///
/// The chunk engine partitions destination rows between workers, so
/// duplicated sink views are only ever asked to write disjoint rows.
pub trait PixelSink: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// `p` must satisfy the valid-premul invariant (`R, G, B <= A`).
    fn set_premul_argb32(&mut self, x: u32, y: u32, p: u32);

    /// Store a raw value without a premultiplication round-trip when the
    /// sink's native format matches. The nearest-neighbor copy path uses
    /// this. `premul` describes the format of `p`.
    fn set_raw_argb32(&mut self, x: u32, y: u32, p: u32, premul: bool) {
        if premul {
            self.set_premul_argb32(x, y, p);
        } else {
            self.set_premul_argb32(x, y, pixel::premultiply_argb32(p));
        }
    }

    /// An independent handle over the same storage for another worker thread.
    /// Views must tolerate concurrent writes to distinct rows.
    fn duplicate(&self) -> Box<dyn PixelSink>;

    fn storage_token(&self) -> usize {
        0
    }
}

struct Storage {
    res: Res,
    // Relaxed per-pixel atomics let duplicated views write disjoint rows from
    // worker threads without locks; the chunk engine's completion channel
    // publishes the writes back to the caller.
    px: Box<[AtomicU32]>,
}

/// Premultiplied ARGB32 raster with shared storage.
///
/// `Clone` produces another view of the same pixels, not a copy; use
/// [`snapshot`](PremulImage::snapshot) for an owned copy of the contents.
#[derive(Clone)]
pub struct PremulImage {
    data: Arc<Storage>,
}

impl fmt::Debug for PremulImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PremulImage({:?})", self.data.res)
    }
}

impl PremulImage {
    /// Fully transparent image of the given size.
    pub fn new(res: Res) -> Self {
        let px = (0..res.area()).map(|_| AtomicU32::new(0)).collect();
        Self { data: Arc::new(Storage { res, px }) }
    }

    /// Wrap row-major premultiplied pixels. Panics if `px` does not match
    /// `res`, debug-asserts the valid-premul invariant.
    pub fn from_vec(res: Res, px: Vec<u32>) -> Self {
        assert_eq!(px.len() as u64, res.area(), "pixel buffer does not match {res:?}");
        debug_assert!(px.iter().all(|&p| pixel::is_valid_premul(p)));

        let px = px.into_iter().map(AtomicU32::new).collect();
        Self { data: Arc::new(Storage { res, px }) }
    }

    pub fn res(&self) -> Res {
        self.data.res
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.data.res.w && y < self.data.res.h);
        y as usize * self.data.res.w as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.data.px[self.index(x, y)].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, x: u32, y: u32, p: u32) {
        debug_assert!(pixel::is_valid_premul(p));
        self.data.px[self.index(x, y)].store(p, Ordering::Relaxed);
    }

    /// Owned row-major copy of the current contents.
    pub fn snapshot(&self) -> Vec<u32> {
        self.data.px.iter().map(|p| p.load(Ordering::Relaxed)).collect()
    }
}

impl PixelSource for PremulImage {
    fn width(&self) -> u32 {
        self.data.res.w
    }

    fn height(&self) -> u32 {
        self.data.res.h
    }

    #[inline]
    fn get_premul_argb32(&self, x: u32, y: u32) -> u32 {
        self.get(x, y)
    }

    fn duplicate(&self) -> Box<dyn PixelSource> {
        Box::new(self.clone())
    }

    fn storage_token(&self) -> usize {
        Arc::as_ptr(&self.data) as usize
    }
}

impl PixelSink for PremulImage {
    fn width(&self) -> u32 {
        self.data.res.w
    }

    fn height(&self) -> u32 {
        self.data.res.h
    }

    #[inline]
    fn set_premul_argb32(&mut self, x: u32, y: u32, p: u32) {
        self.set(x, y, p);
    }

    #[inline]
    fn set_raw_argb32(&mut self, x: u32, y: u32, p: u32, premul: bool) {
        // Native format is premultiplied, raw premul stores skip nothing here.
        let p = if premul { p } else { pixel::premultiply_argb32(p) };
        self.set(x, y, p);
    }

    fn duplicate(&self) -> Box<dyn PixelSink> {
        Box::new(self.clone())
    }

    fn storage_token(&self) -> usize {
        Arc::as_ptr(&self.data) as usize
    }
}
