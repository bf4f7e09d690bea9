//! Racing alternative work units for the first successful result
//!
//! Models the "query several equivalent backends, take whichever answers
//! first" pattern: all candidates are submitted concurrently under a
//! strategy, the first success wins, and the rest are cancelled best-effort.
//! Losing results are discarded and never surfaced to the caller.

use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, RecvTimeoutError};

use crate::error::Error;
use crate::handle::Outcome;
use crate::strategy::Strategy;
use crate::work::WorkUnit;

/// Race `candidates` under `strategy`, returning the first success within `timeout`
///
/// Candidate order carries no priority; it is used for bookkeeping only. Ties
/// between concurrent successes are broken by arrival order at the
/// coordinating wait, so exactly one winner is reported.
///
/// Returns:
/// - `Completed(value)` from the first candidate to succeed; every other
///   outstanding candidate is cancelled (best-effort, failures ignored);
/// - `Failed(error)` carrying the last observed error once every candidate
///   has resolved without a success, without waiting out the deadline;
/// - `TimedOut` if the deadline passes before any candidate succeeds; the
///   still-running candidates are cancelled and otherwise left alone.
pub fn race_first<T>(
    strategy: &dyn Strategy<T>,
    candidates: Vec<WorkUnit<T>>,
    timeout: Duration,
) -> Outcome<T>
where
    T: Clone + Send + 'static,
{
    if candidates.is_empty() {
        return Outcome::Failed(Error::TaskFailed {
            reason: "no candidates to race".to_string(),
        });
    }

    let deadline = Instant::now() + timeout;
    let total = candidates.len();

    // Each candidate reports its (index, result) here as soon as its body
    // finishes, independent of when waiters get around to its handle.
    let (report_tx, report_rx) = bounded(total);

    let mut handles = Vec::with_capacity(total);
    let mut resolved = 0usize;
    let mut last_error = None;

    for (index, unit) in candidates.into_iter().enumerate() {
        let tx = report_tx.clone();
        let wrapped = WorkUnit::new(move || {
            let result = unit.execute();
            let _ = tx.send((index, result.clone()));
            result
        });

        match strategy.submit(wrapped) {
            // Paired with the candidate index: refusals leave gaps, so
            // positions in this vector do not line up with indices
            Ok(handle) => handles.push((index, handle)),
            Err(error) => {
                // A refused submission counts as a resolved failure
                resolved += 1;
                last_error = Some(error);
            }
        }
    }
    // Only the in-flight units hold senders now; the channel disconnects
    // once every remaining candidate has resolved without reporting.
    drop(report_tx);

    loop {
        if resolved == total {
            return Outcome::Failed(last_error.unwrap_or(Error::Cancelled));
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        match report_rx.recv_timeout(remaining) {
            Ok((index, Ok(value))) => {
                log::debug!("race won by candidate {}", index);
                for (candidate, handle) in &handles {
                    if *candidate != index {
                        handle.cancel();
                    }
                }
                return Outcome::Completed(value);
            }
            Ok((index, Err(error))) => {
                log::debug!("race candidate {} failed: {}", index, error);
                resolved += 1;
                last_error = Some(error);
            }
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("race timed out after {:?}", timeout);
                for (_, handle) in &handles {
                    handle.cancel();
                }
                return Outcome::TimedOut;
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Remaining candidates were cancelled or dropped without
                // executing; no success is coming.
                return Outcome::Failed(last_error.unwrap_or(Error::Cancelled));
            }
        }
    }
}
