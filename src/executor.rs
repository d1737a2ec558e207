use std::any::Any;
use std::num::NonZeroUsize;
use std::thread;

use once_cell::sync::Lazy;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// An external worker pool that can run independent tasks concurrently.
///
/// `submit` may run the task synchronously on the calling thread or hand it
/// to a worker; the chunk engine only assumes that every submitted task
/// eventually runs or is dropped. The engine never creates threads itself.
pub trait Executor: Sync {
    fn submit(&self, task: Box<dyn FnOnce() + Send>);
}

impl Executor for ThreadPool {
    fn submit(&self, task: Box<dyn FnOnce() + Send>) {
        self.spawn(task);
    }
}

/// Degenerate executor that runs every task inline on the submitting thread.
/// Mostly useful in tests; results are identical to pooled runs by design of
/// the chunk engine.
#[derive(Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn submit(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

// The "cores" term in the chunk-count cap.
pub(crate) fn worker_count() -> usize {
    static CORES: Lazy<usize> =
        Lazy::new(|| thread::available_parallelism().map_or(1, NonZeroUsize::get));
    *CORES
}

fn handle_panic(_e: Box<dyn Any + Send>) {
    // Chunk tasks catch their own unwinds; anything escaping to here is a bug
    // in an adapter, not a reason to take the process down.
    error!(
        "Unexpected panic in thread {}",
        thread::current().name().unwrap_or("unnamed")
    );
}

/// A lazily built process-wide pool for callers who don't carry their own.
/// Never used implicitly: `resize` with `executor: None` stays sequential.
pub fn default_pool() -> &'static ThreadPool {
    static POOL: Lazy<ThreadPool> = Lazy::new(|| {
        ThreadPoolBuilder::new()
            .thread_name(|u| format!("prescale-{u}"))
            .panic_handler(handle_panic)
            .num_threads(worker_count())
            .build()
            .expect("Error creating scaling threadpool")
    });
    &POOL
}
