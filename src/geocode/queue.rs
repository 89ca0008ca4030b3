//! Serialized lookup queue enforcing the remote API rate limit
//!
//! All uncached lookups drain through a single worker task, so at most one
//! remote call is in flight at any time and consecutive calls start at least
//! [`MIN_REQUEST_INTERVAL`] apart, regardless of how many callers enqueue
//! concurrently. Tasks run strictly in enqueue order. The queue imposes no
//! per-task timeout: a hung task stalls everything behind it.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Minimum gap between the starts of two consecutive remote calls
pub(crate) const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1100);

/// An enqueued unit of work; opaque to the queue
type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Tracks when the last task started and how long the next one must wait
#[derive(Debug)]
struct RateGate {
    min_interval: Duration,
    last_start: Option<Instant>,
}

impl RateGate {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: None,
        }
    }

    /// Remaining wait before the next task may start
    fn pause_before_next(&self) -> Duration {
        match self.last_start {
            Some(started) => self.min_interval.saturating_sub(started.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Records that a task has just started its remote call
    fn mark_started(&mut self) {
        self.last_start = Some(Instant::now());
    }
}

/// FIFO queue draining lookups one at a time through a spawned worker
///
/// Cloning the handle shares the same queue. Dropping every handle closes
/// the channel and lets the worker finish its backlog and exit.
#[derive(Debug, Clone)]
pub(crate) struct LookupQueue {
    tx: mpsc::UnboundedSender<Task>,
}

impl LookupQueue {
    /// Spawns the drain-loop worker; requires a running tokio runtime
    pub(crate) fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();

        tokio::spawn(async move {
            let mut gate = RateGate::new(MIN_REQUEST_INTERVAL);
            while let Some(task) = rx.recv().await {
                let wait = gate.pause_before_next();
                if wait > Duration::ZERO {
                    tokio::time::sleep(wait).await;
                }
                gate.mark_started();
                // Awaiting here, not spawning, is what keeps a single task
                // in flight at a time.
                task.await;
            }
        });

        Self { tx }
    }

    /// Appends a task to the tail of the queue
    ///
    /// Returns `false` when the worker is gone (runtime shut down) and the
    /// task will never run.
    pub(crate) fn submit<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tx.send(Box::pin(task)).is_ok()
    }
}
