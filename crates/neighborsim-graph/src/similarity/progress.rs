//! Cooperative cancellation and progress reporting.
//!
//! Long-running loops call [`ProgressTracker::check`] once per source node.
//! The call is a counter bump and a mask test for most nodes; every
//! `interval`-th call, starting with the first, polls the
//! [`CancellationToken`] and emits a progress event. The poll follows the
//! number of recorded nodes, not their ids, so sparse candidate ids are
//! polled just as often as dense ones.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use neighborsim_core::NodeId;
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};

/// Upper bound on the progress interval.
pub const MAX_LOG_INTERVAL: u32 = 1 << 13;

/// A token for cancelling a running computation.
///
/// Clones share the same flag; cancelling one cancels all.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Cancels the associated computation.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if cancellation was requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// The power of two closest to `value`, ties going up. Zero maps to zero.
#[must_use]
pub fn nearby_power_of_two(value: usize) -> usize {
    if value == 0 {
        return 0;
    }
    let Some(next) = value.checked_next_power_of_two() else {
        return 1 << (usize::BITS - 1);
    };
    let previous = next >> 1;
    if next - value <= value - previous {
        next
    } else {
        previous
    }
}

/// Interval between progress checks for `candidate_count` source nodes:
/// the power of two nearest to 1% of the candidates, clamped to
/// `1..=MAX_LOG_INTERVAL`.
#[must_use]
pub fn progress_interval(candidate_count: usize) -> u32 {
    let interval = nearby_power_of_two(candidate_count / 100).clamp(1, MAX_LOG_INTERVAL as usize);
    interval as u32
}

/// Tracks progress of one phase of a computation.
///
/// Shared by reference between worker threads.
#[derive(Debug)]
pub struct ProgressTracker {
    task: &'static str,
    total: usize,
    mask: u32,
    processed: AtomicUsize,
    token: CancellationToken,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a tracker for `total` source nodes.
    #[must_use]
    pub fn new(task: &'static str, total: usize, token: CancellationToken) -> Self {
        let interval = progress_interval(total);
        debug!(task, total, interval, "starting");
        Self {
            task,
            total,
            mask: interval - 1,
            processed: AtomicUsize::new(0),
            token,
            start_time: Instant::now(),
        }
    }

    /// The check interval in source nodes.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.mask + 1
    }

    /// Record that `node` is about to be processed.
    ///
    /// Fails with [`GraphError::Cancelled`] if this call falls on the
    /// interval and cancellation was requested. At most `interval` calls
    /// pass between a cancel and the error.
    #[inline]
    pub fn check(&self, node: NodeId) -> GraphResult<()> {
        let previous = self.processed.fetch_add(1, Ordering::Relaxed);
        if previous & self.mask as usize != 0 {
            return Ok(());
        }
        let processed = previous + 1;
        if self.token.is_cancelled() {
            debug!(task = self.task, node = node.as_u32(), "cancellation observed");
            return Err(GraphError::Cancelled);
        }
        debug!(task = self.task, processed, total = self.total, "progress");
        Ok(())
    }

    /// Poll the token without recording progress.
    #[inline]
    pub fn ensure_running(&self) -> GraphResult<()> {
        if self.token.is_cancelled() {
            Err(GraphError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Number of source nodes recorded so far.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Time since the tracker was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log completion of the phase.
    pub fn finish(&self) {
        info!(
            task = self.task,
            processed = self.processed(),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn nearby_powers() {
        assert_eq!(nearby_power_of_two(0), 0);
        assert_eq!(nearby_power_of_two(1), 1);
        assert_eq!(nearby_power_of_two(3), 4);
        assert_eq!(nearby_power_of_two(5), 4);
        assert_eq!(nearby_power_of_two(6), 8);
        assert_eq!(nearby_power_of_two(64), 64);
    }

    #[test]
    fn interval_bounds() {
        assert_eq!(progress_interval(0), 1);
        assert_eq!(progress_interval(99), 1);
        assert_eq!(progress_interval(1_000), 8);
        assert_eq!(progress_interval(100_000), 1024);
        assert_eq!(progress_interval(usize::MAX), MAX_LOG_INTERVAL);
    }

    #[test]
    fn check_polls_every_interval_calls() {
        let token = CancellationToken::new();
        let tracker = ProgressTracker::new("test", 1_000, token.clone());
        assert_eq!(tracker.interval(), 8);

        assert!(tracker.check(NodeId::new(0)).is_ok());
        token.cancel();
        for node in 1..8 {
            assert!(tracker.check(NodeId::new(node)).is_ok());
        }
        assert!(matches!(tracker.check(NodeId::new(8)), Err(GraphError::Cancelled)));
        assert!(matches!(tracker.ensure_running(), Err(GraphError::Cancelled)));
        assert_eq!(tracker.processed(), 9);
    }

    #[test]
    fn check_observes_cancel_with_off_grid_ids() {
        let token = CancellationToken::new();
        let tracker = ProgressTracker::new("test", 1_000, token.clone());
        token.cancel();

        // Odd ids never land on a multiple of the interval
        let first_error = (0..500u32)
            .map(|i| NodeId::new(2 * i + 1))
            .position(|node| tracker.check(node).is_err());
        assert_eq!(first_error, Some(0));

        let tracker = ProgressTracker::new("test", 1_000, CancellationToken::new());
        for i in 0..3u32 {
            assert!(tracker.check(NodeId::new(2 * i + 1)).is_ok());
        }
        tracker.token.cancel();
        let errors = (3..500u32)
            .map(|i| NodeId::new(2 * i + 1))
            .filter(|&node| tracker.check(node).is_err())
            .count();
        assert!(errors > 0);
        assert!(errors <= 497 / 8 + 1);
    }
}
