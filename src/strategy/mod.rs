//! Scheduling strategies
//!
//! A [`Strategy`] maps submitted work units onto concurrent execution
//! contexts. Two variants are provided: [`BoundedPool`] runs work on a fixed
//! number of long-lived worker threads with a FIFO queue, while
//! [`PerTaskSpawner`] spawns one cheap thread per submission with no
//! admission limit.

mod per_task;
mod pool;

pub use per_task::PerTaskSpawner;
pub use pool::{BoundedPool, PoolConfig, PoolStats};

use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::handle::{wait_all, Outcome, TaskHandle};
use crate::work::WorkUnit;

/// Identifies a strategy variant and its fixed configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Fixed pool of worker threads; excess submissions queue in FIFO order
    Bounded {
        /// Number of long-lived worker threads
        worker_count: usize,
    },
    /// One execution thread per submission, no queueing
    Unbounded,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Bounded { worker_count } => {
                write!(f, "bounded-pool({})", worker_count)
            }
            StrategyKind::Unbounded => write!(f, "per-task"),
        }
    }
}

/// Policy for mapping work units onto concurrent execution contexts
///
/// Submission never blocks the caller beyond bounded bookkeeping. Every
/// per-task failure is captured into that task's handle and never propagates
/// into the strategy's own control flow or into sibling tasks.
pub trait Strategy<T>: Send + Sync {
    /// Submit a unit for execution, obtaining a handle to its outcome
    ///
    /// Returns [`crate::Error::Shutdown`] once the strategy has been told to
    /// stop accepting work.
    fn submit(&self, unit: WorkUnit<T>) -> Result<TaskHandle<T>>;

    /// The variant and configuration of this strategy
    fn kind(&self) -> StrategyKind;

    /// Stop accepting new submissions and release execution resources
    ///
    /// Work accepted before shutdown is honored: the bounded pool drains its
    /// queue, the per-task spawner joins every spawned thread.
    fn shutdown(&self);

    /// Block until every handle is terminal or the shared timeout elapses
    ///
    /// Outcomes are index-aligned with `handles`; any handle still pending at
    /// the deadline is reported as [`Outcome::TimedOut`].
    fn wait_all(&self, handles: &[TaskHandle<T>], timeout: Duration) -> Vec<Outcome<T>>
    where
        T: Clone,
    {
        wait_all(handles, timeout)
    }
}
