//! Thread-per-task strategy
//!
//! Spawns a fresh execution thread for every submitted unit with no admission
//! limit. Intended for workloads dominated by blocking/waiting rather than
//! computation, where the cost of parking many concurrent threads is low.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::handle::{Outcome, TaskHandle};
use crate::strategy::{Strategy, StrategyKind};
use crate::work::WorkUnit;

/// Unbounded per-task strategy
///
/// Submission and execution start are effectively simultaneous: there is no
/// internal queue, every accepted unit gets its own thread immediately.
pub struct PerTaskSpawner {
    /// Handles of every spawned thread, joined on shutdown
    threads: Mutex<Vec<JoinHandle<()>>>,
    shutdown: AtomicBool,
    /// Counter used for thread naming
    spawned: AtomicUsize,
}

impl PerTaskSpawner {
    /// Create a new per-task spawner
    pub fn new() -> Self {
        Self {
            threads: Mutex::new(Vec::new()),
            shutdown: AtomicBool::new(false),
            spawned: AtomicUsize::new(0),
        }
    }

    /// Number of threads spawned so far
    pub fn spawned_count(&self) -> usize {
        self.spawned.load(Ordering::Relaxed)
    }

    /// Stop accepting submissions and join every spawned thread
    ///
    /// Inherent so callers holding a concrete spawner can shut it down
    /// without naming a result type.
    pub fn shutdown(&self) {
        // The flag is flipped under the threads lock so it is ordered with
        // every submit: a submission that was accepted has already pushed
        // its handle and gets joined here, one that loses the race observes
        // the flag and is refused.
        let drained: Vec<JoinHandle<()>> = {
            let mut threads = self.threads.lock();
            if self.shutdown.swap(true, Ordering::AcqRel) {
                return;
            }
            threads.drain(..).collect()
        };

        // Wait for every spawned thread to finish (or observe cancellation)
        let count = drained.len();
        for thread in drained {
            let _ = thread.join();
        }

        log::debug!("per-task spawner shut down after {} threads", count);
    }
}

impl Default for PerTaskSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Strategy<T> for PerTaskSpawner {
    fn submit(&self, unit: WorkUnit<T>) -> Result<TaskHandle<T>> {
        // Flag check, spawn and push happen under one lock so a concurrent
        // shutdown either refuses this submission or joins its thread.
        let mut threads = self.threads.lock();
        if self.shutdown.load(Ordering::Acquire) {
            return Err(Error::Shutdown);
        }

        let handle = TaskHandle::new();
        let task_handle = handle.clone();
        let index = self.spawned.fetch_add(1, Ordering::Relaxed);

        let thread = thread::Builder::new()
            .name(format!("per-task-{}", index))
            .spawn(move || {
                if !task_handle.mark_started() {
                    task_handle.complete(Outcome::Cancelled);
                    return;
                }
                let outcome = match unit.execute() {
                    Ok(value) => Outcome::Completed(value),
                    Err(error) => Outcome::Failed(error),
                };
                task_handle.complete(outcome);
            })
            .map_err(|e| Error::Spawn {
                reason: format!("failed to spawn task thread: {}", e),
            })?;

        threads.push(thread);
        Ok(handle)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Unbounded
    }

    fn shutdown(&self) {
        PerTaskSpawner::shutdown(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn test_submit_starts_immediately() {
        let spawner = PerTaskSpawner::new();
        let handle = spawner.submit(WorkUnit::from_value("fast")).unwrap();
        assert_eq!(
            handle.wait(Duration::from_secs(1)),
            Outcome::Completed("fast")
        );
        spawner.shutdown();
    }

    #[test]
    fn test_no_submission_side_queueing() {
        let spawner = PerTaskSpawner::new();
        let task_count = 20;
        let latency = Duration::from_millis(50);

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..task_count {
            let unit = WorkUnit::new(move || {
                std::thread::sleep(latency);
                Ok(())
            });
            handles.push(spawner.submit(unit).unwrap());
        }

        let outcomes = crate::handle::wait_all(&handles, Duration::from_secs(5));
        let elapsed = start.elapsed();

        assert!(outcomes.iter().all(|o| o.is_completed()));
        // All tasks ran concurrently, so total time is close to one latency,
        // not task_count of them
        assert!(elapsed < latency * (task_count / 2));
        spawner.shutdown();
    }

    #[test]
    fn test_submit_after_shutdown_is_refused() {
        let spawner = PerTaskSpawner::new();
        spawner.shutdown();
        assert_eq!(
            spawner.submit(WorkUnit::from_value(0)).unwrap_err(),
            Error::Shutdown
        );
    }

    #[test]
    fn test_shutdown_joins_submissions_racing_with_it() {
        // Submissions race against shutdown; every accepted unit must have
        // finished by the time shutdown returns, whatever the interleaving.
        for _ in 0..20 {
            let spawner = Arc::new(PerTaskSpawner::new());
            let finished = Arc::new(AtomicUsize::new(0));

            let stopper = {
                let spawner = Arc::clone(&spawner);
                thread::spawn(move || {
                    thread::sleep(Duration::from_micros(100));
                    spawner.shutdown();
                })
            };

            let mut accepted = Vec::new();
            loop {
                let finished = Arc::clone(&finished);
                let unit = WorkUnit::new(move || {
                    thread::sleep(Duration::from_millis(1));
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                match spawner.submit(unit) {
                    Ok(handle) => accepted.push(handle),
                    Err(Error::Shutdown) => break,
                    Err(other) => panic!("unexpected submit error: {:?}", other),
                }
            }
            stopper.join().unwrap();

            // Shutdown has returned, so every accepted thread was joined and
            // its body ran to completion.
            assert_eq!(finished.load(Ordering::SeqCst), accepted.len());
            assert!(accepted.iter().all(|h| h.is_finished()));
        }
    }

    #[test]
    fn test_failures_are_isolated_per_task() {
        let spawner = PerTaskSpawner::new();
        let failing: WorkUnit<i32> = WorkUnit::new(|| {
            Err(Error::TaskFailed {
                reason: "bad response".to_string(),
            })
        });
        let ok = Arc::new(AtomicUsize::new(0));
        let ok_clone = Arc::clone(&ok);

        let failed = spawner.submit(failing).unwrap();
        let succeeded = spawner
            .submit(WorkUnit::new(move || {
                ok_clone.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }))
            .unwrap();

        assert!(matches!(
            failed.wait(Duration::from_secs(1)),
            Outcome::Failed(_)
        ));
        assert_eq!(succeeded.wait(Duration::from_secs(1)), Outcome::Completed(1));
        assert_eq!(ok.load(Ordering::SeqCst), 1);
        spawner.shutdown();
    }
}
