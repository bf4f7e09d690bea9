//! Blocking work units
//!
//! A [`WorkUnit`] is a single schedulable, blocking computation that yields a
//! result or an error. Units are immutable once constructed and consumed on
//! execution; a strategy invokes each submitted unit at most once.

use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

static UNIT_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A single blocking computation producing a value of type `T`
///
/// The body may block its execution thread for an arbitrary duration
/// (simulating I/O latency). Everything the body needs is captured at
/// construction time; there are no inputs at execution time.
pub struct WorkUnit<T> {
    /// The actual work to be done
    body: Box<dyn FnOnce() -> Result<T> + Send + 'static>,
    /// Unit ID for logging
    id: usize,
}

impl<T> WorkUnit<T> {
    /// Create a new work unit from a blocking closure
    pub fn new(body: impl FnOnce() -> Result<T> + Send + 'static) -> Self {
        Self {
            body: Box::new(body),
            id: UNIT_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Create a work unit that is immediately ready with a value
    pub fn from_value(value: T) -> Self
    where
        T: Send + 'static,
    {
        Self::new(move || Ok(value))
    }

    /// Execute the unit, consuming it
    ///
    /// A panicking body is treated identically to one that returns an error:
    /// the panic is caught here and reported as [`Error::TaskFailed`], so a
    /// fault never unwinds into the executing worker.
    pub fn execute(self) -> Result<T> {
        match catch_unwind(AssertUnwindSafe(self.body)) {
            Ok(result) => result,
            Err(payload) => {
                let reason = if let Some(msg) = payload.downcast_ref::<&str>() {
                    (*msg).to_string()
                } else if let Some(msg) = payload.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "task panicked".to_string()
                };
                Err(Error::TaskFailed { reason })
            }
        }
    }

    /// Get the unit ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<T> Debug for WorkUnit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkUnit").field("id", &self.id).finish()
    }
}
