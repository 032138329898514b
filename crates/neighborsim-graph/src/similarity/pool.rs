//! Worker pool abstraction over rayon.

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{GraphError, GraphResult};

/// Where batches of source nodes run.
///
/// A concurrency of one never spawns threads.
#[derive(Debug)]
pub enum WorkerPool {
    /// Everything runs on the calling thread.
    Sequential,
    /// A dedicated rayon pool.
    Parallel(ThreadPool),
}

impl WorkerPool {
    /// Create a pool with `concurrency` worker threads.
    pub fn new(concurrency: usize) -> GraphResult<Self> {
        if concurrency <= 1 {
            return Ok(Self::Sequential);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|index| format!("neighborsim-worker-{index}"))
            .build()
            .map_err(|e| GraphError::ThreadPool(e.to_string()))?;
        Ok(Self::Parallel(pool))
    }

    /// Number of threads work is spread over.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel(pool) => pool.current_num_threads(),
        }
    }

    /// Returns true if work runs on a dedicated pool.
    #[must_use]
    pub const fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel(_))
    }

    /// Run `op` inside the pool, so rayon parallel iterators it uses are
    /// scheduled on the pool's threads.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match self {
            Self::Sequential => op(),
            Self::Parallel(pool) => pool.install(op),
        }
    }
}
