//! Task handles and outcomes
//!
//! A [`TaskHandle`] is the one-shot, shared-read handle to a submitted work
//! unit's eventual outcome. The executing strategy is the sole writer; any
//! number of waiters may block on the handle, each with its own timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::Error;

/// Terminal classification of a task or of a wait on one
///
/// `Completed`, `Failed` and `Cancelled` are task-terminal states recorded in
/// the handle. `TimedOut` is local to a wait call: it means the waiter's
/// deadline elapsed while the task was still pending, and the task itself is
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The work unit produced a value
    Completed(T),
    /// The work unit returned an error or panicked
    Failed(Error),
    /// The work unit was cancelled before it began executing
    Cancelled,
    /// The waiter's deadline elapsed before the task reached a terminal state
    TimedOut,
}

impl<T> Outcome<T> {
    /// Check whether this is a successful completion
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// Extract the completed value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Result slot shared between the executing worker and all waiters
enum Slot<T> {
    Pending,
    Terminal(Outcome<T>),
}

struct HandleInner<T> {
    /// Write-once outcome slot; readers never observe a partial write
    slot: Mutex<Slot<T>>,
    /// Broadcast to all waiters when the slot becomes terminal
    done: Condvar,
    /// Advisory cancellation flag, checked by the strategy before execution
    cancel_requested: AtomicBool,
    /// Set once by the worker that claims the unit for execution
    started: AtomicBool,
}

/// Handle to a submitted work unit
///
/// Cloning the handle is cheap and shares the same underlying slot; waiters
/// holding different clones all observe the same terminal outcome.
pub struct TaskHandle<T> {
    inner: Arc<HandleInner<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> TaskHandle<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                slot: Mutex::new(Slot::Pending),
                done: Condvar::new(),
                cancel_requested: AtomicBool::new(false),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Block until the task reaches a terminal state or `timeout` elapses
    ///
    /// Returns [`Outcome::TimedOut`] if the deadline passes first. A timed-out
    /// wait does not alter the task's own state; the task may still complete
    /// later, and subsequent waits may observe its real outcome. Once a
    /// terminal outcome has been observed, every later wait returns the same
    /// outcome.
    pub fn wait(&self, timeout: Duration) -> Outcome<T>
    where
        T: Clone,
    {
        let deadline = Instant::now() + timeout;
        let mut slot = self.inner.slot.lock();
        loop {
            if let Slot::Terminal(ref outcome) = *slot {
                return outcome.clone();
            }
            if self.inner.done.wait_until(&mut slot, deadline).timed_out() {
                return match *slot {
                    Slot::Terminal(ref outcome) => outcome.clone(),
                    Slot::Pending => Outcome::TimedOut,
                };
            }
        }
    }

    /// Request cancellation of the task
    ///
    /// Returns `true` only if the task had not yet started executing: such a
    /// task will be resolved to [`Outcome::Cancelled`] instead of running.
    /// A task that is already running or already terminal is unaffected and
    /// `false` is returned; its real outcome stands.
    pub fn cancel(&self) -> bool {
        self.inner.cancel_requested.store(true, Ordering::SeqCst);
        !self.inner.started.load(Ordering::SeqCst) && !self.is_finished()
    }

    /// Check whether the task has reached a terminal state
    pub fn is_finished(&self) -> bool {
        matches!(*self.inner.slot.lock(), Slot::Terminal(_))
    }

    /// Claim the unit for execution
    ///
    /// Returns `false` if cancellation was requested first, in which case the
    /// caller must resolve the handle to `Cancelled` instead of running the
    /// unit. The SeqCst ordering guarantees that a `cancel` call returning
    /// `true` is observed here.
    pub(crate) fn mark_started(&self) -> bool {
        self.inner.started.store(true, Ordering::SeqCst);
        !self.inner.cancel_requested.load(Ordering::SeqCst)
    }

    /// Record the terminal outcome; the first write wins
    ///
    /// Returns `false` if the handle was already terminal, in which case the
    /// new outcome is discarded.
    pub(crate) fn complete(&self, outcome: Outcome<T>) -> bool {
        let mut slot = self.inner.slot.lock();
        match *slot {
            Slot::Pending => {
                *slot = Slot::Terminal(outcome);
                drop(slot);
                self.inner.done.notify_all();
                true
            }
            Slot::Terminal(_) => false,
        }
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Block until every handle is terminal or the shared `timeout` elapses
///
/// Outcomes are index-aligned with `handles` (submission order), regardless of
/// actual completion order. Any handle still pending when the deadline passes
/// is reported as [`Outcome::TimedOut`]; the underlying task keeps running.
pub fn wait_all<T: Clone>(handles: &[TaskHandle<T>], timeout: Duration) -> Vec<Outcome<T>> {
    let deadline = Instant::now() + timeout;
    handles
        .iter()
        .map(|handle| {
            let remaining = deadline.saturating_duration_since(Instant::now());
            handle.wait(remaining)
        })
        .collect()
}
