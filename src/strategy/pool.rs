//! Bounded worker-pool strategy
//!
//! A fixed number of long-lived worker threads share a FIFO submission
//! queue. A worker that finishes a unit immediately dequeues the next pending
//! unit if present; otherwise it parks on the empty channel awaiting new
//! submissions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::handle::{Outcome, TaskHandle};
use crate::strategy::{Strategy, StrategyKind};
use crate::work::WorkUnit;

/// Bounded pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads (0 = number of CPU cores)
    pub worker_count: usize,
    /// Thread name prefix
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            thread_name_prefix: "pool-worker".to_string(),
        }
    }
}

/// Counters tracking pool activity
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Number of units accepted by `submit`
    pub units_submitted: AtomicUsize,
    /// Number of units that reached a terminal state
    pub units_resolved: AtomicUsize,
}

/// A unit paired with the handle its worker resolves
struct Job<T> {
    unit: WorkUnit<T>,
    handle: TaskHandle<T>,
}

/// Fixed-size worker-pool strategy
///
/// At most `worker_count` units run concurrently; excess submissions queue in
/// arrival order. Completion order among queued units correlates with
/// submission order only up to contention for the fixed worker count.
pub struct BoundedPool<T> {
    worker_count: usize,
    /// Submission side of the FIFO queue; taken on shutdown so workers drain
    /// the queue and exit when the channel disconnects
    sender: Mutex<Option<Sender<Job<T>>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stats: Arc<PoolStats>,
}

impl<T: Send + 'static> BoundedPool<T> {
    /// Create a pool with the given configuration, spawning its workers
    pub fn new(config: PoolConfig) -> Result<Self> {
        let worker_count = if config.worker_count == 0 {
            num_cpus::get()
        } else {
            config.worker_count
        };

        let (sender, receiver) = unbounded::<Job<T>>();
        let stats = Arc::new(PoolStats::default());
        let mut workers = Vec::with_capacity(worker_count);

        for i in 0..worker_count {
            let receiver = receiver.clone();
            let stats = Arc::clone(&stats);
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix, i))
                .spawn(move || worker_loop(receiver, stats))
                .map_err(|e| Error::Spawn {
                    reason: format!("failed to spawn pool worker {}: {}", i, e),
                })?;
            workers.push(handle);
        }

        log::debug!("bounded pool created with {} workers", worker_count);

        Ok(Self {
            worker_count,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            stats,
        })
    }

    /// Create a pool with `worker_count` workers and default naming
    pub fn with_workers(worker_count: usize) -> Result<Self> {
        Self::new(PoolConfig {
            worker_count,
            ..Default::default()
        })
    }

    /// Number of worker threads
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Pool activity counters
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }
}

impl<T: Send + 'static> Strategy<T> for BoundedPool<T> {
    fn submit(&self, unit: WorkUnit<T>) -> Result<TaskHandle<T>> {
        let sender = self.sender.lock();
        let sender = sender.as_ref().ok_or(Error::Shutdown)?;

        let handle = TaskHandle::new();
        let job = Job {
            unit,
            handle: handle.clone(),
        };
        sender.send(job).map_err(|_| Error::Shutdown)?;

        self.stats.units_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Bounded {
            worker_count: self.worker_count,
        }
    }

    fn shutdown(&self) {
        // Dropping the sender disconnects the channel once the queue is
        // drained, so already-accepted work is honored before workers exit.
        let sender = self.sender.lock().take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let mut workers = self.workers.lock();
        for worker in workers.drain(..) {
            let _ = worker.join();
        }

        log::debug!(
            "bounded pool shut down after resolving {} units",
            self.stats.units_resolved.load(Ordering::Relaxed)
        );
    }
}

impl<T> Drop for BoundedPool<T> {
    fn drop(&mut self) {
        // Disconnect the queue so workers exit; threads not joined here
        // finish their in-flight unit and stop on their own.
        self.sender.lock().take();
    }
}

/// Main worker loop: dequeue, execute, resolve, repeat
///
/// Exits when the submission channel is disconnected and empty.
fn worker_loop<T>(receiver: Receiver<Job<T>>, stats: Arc<PoolStats>) {
    while let Ok(job) = receiver.recv() {
        if !job.handle.mark_started() {
            // Cancelled while still queued; never run the body
            job.handle.complete(Outcome::Cancelled);
            stats.units_resolved.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        let outcome = match job.unit.execute() {
            Ok(value) => Outcome::Completed(value),
            Err(error) => Outcome::Failed(error),
        };
        job.handle.complete(outcome);
        stats.units_resolved.fetch_add(1, Ordering::Relaxed);
    }
}
