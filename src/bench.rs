//! Benchmark runner for comparing scheduling strategies
//!
//! Drives identical workloads through each strategy under test, records
//! completion timestamps, and reports aggregate throughput/latency metrics.
//! Individual task failures never fail a run; they are recorded per task.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::handle::{wait_all, Outcome};
use crate::strategy::{Strategy, StrategyKind};
use crate::work::WorkUnit;

/// Sentinel stored in a completion slot whose body never finished
const UNSET: u64 = u64::MAX;

/// Terminal classification of a benchmarked task, without its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The task produced a value
    Completed,
    /// The task returned an error or panicked
    Failed,
    /// The task was cancelled before running
    Cancelled,
    /// The task was still pending when the run deadline passed
    TimedOut,
}

impl<T> From<&Outcome<T>> for OutcomeKind {
    fn from(outcome: &Outcome<T>) -> Self {
        match outcome {
            Outcome::Completed(_) => OutcomeKind::Completed,
            Outcome::Failed(_) => OutcomeKind::Failed,
            Outcome::Cancelled => OutcomeKind::Cancelled,
            Outcome::TimedOut => OutcomeKind::TimedOut,
        }
    }
}

/// Per-task record in a benchmark result
///
/// `latency` is the time from run start to the moment the task's body
/// finished. A cancelled task that never ran reports zero; a task still
/// pending at the deadline reports the full run duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    /// Submission-order index of the task
    pub index: usize,
    /// Terminal classification
    pub outcome: OutcomeKind,
    /// Time from run start until the task's body finished
    pub latency: Duration,
}

/// Aggregate record of one workload run under one strategy
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    kind: StrategyKind,
    task_count: usize,
    total_elapsed: Duration,
    outcomes: Vec<TaskReport>,
}

impl BenchmarkResult {
    /// The strategy variant this run used
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Number of tasks in the workload
    pub fn task_count(&self) -> usize {
        self.task_count
    }

    /// Wall-clock time from first submission to last terminal state
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Per-task outcomes, index-aligned with submission order
    pub fn outcomes(&self) -> &[TaskReport] {
        &self.outcomes
    }

    /// Number of tasks that completed successfully
    pub fn completed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome == OutcomeKind::Completed)
            .count()
    }

    /// Successfully completed tasks per second of total elapsed time
    pub fn throughput(&self) -> f64 {
        let secs = self.total_elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.completed_count() as f64 / secs
    }

    /// Mean latency across successfully completed tasks
    pub fn mean_latency(&self) -> Option<Duration> {
        let completed: Vec<_> = self
            .outcomes
            .iter()
            .filter(|r| r.outcome == OutcomeKind::Completed)
            .collect();
        if completed.is_empty() {
            return None;
        }
        let total: Duration = completed.iter().map(|r| r.latency).sum();
        Some(total / completed.len() as u32)
    }

    /// Largest latency across successfully completed tasks
    pub fn max_latency(&self) -> Option<Duration> {
        self.outcomes
            .iter()
            .filter(|r| r.outcome == OutcomeKind::Completed)
            .map(|r| r.latency)
            .max()
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} tasks completed in {:?} ({:.1} tasks/s)",
            self.kind,
            self.completed_count(),
            self.task_count,
            self.total_elapsed,
            self.throughput()
        )
    }
}

/// Drives workloads through strategies and aggregates the results
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    /// Shared deadline for waiting out a whole run
    timeout: Duration,
}

impl BenchmarkRunner {
    /// Create a runner with a generous default run deadline
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(3600),
        }
    }

    /// Create a runner that gives up on a run after `timeout`
    ///
    /// Tasks still pending at the deadline are reported as
    /// [`OutcomeKind::TimedOut`] and left running.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `workload` under `strategy` and record aggregate behavior
    ///
    /// The start timestamp is taken before the first submission and the end
    /// timestamp after the last handle reaches a terminal state. Work units
    /// are consumed; a fresh workload must be built for every run.
    pub fn run<T>(
        &self,
        strategy: &dyn Strategy<T>,
        workload: Vec<WorkUnit<T>>,
    ) -> Result<BenchmarkResult>
    where
        T: Clone + Send + 'static,
    {
        let kind = strategy.kind();
        let task_count = workload.len();
        log::debug!("benchmarking {} over {} tasks", kind, task_count);

        let mut completion_slots = Vec::with_capacity(task_count);
        let mut handles = Vec::with_capacity(task_count);

        let run_start = Instant::now();
        for unit in workload {
            let slot = Arc::new(AtomicU64::new(UNSET));
            let body_slot = Arc::clone(&slot);
            let wrapped = WorkUnit::new(move || {
                let result = unit.execute();
                body_slot.store(run_start.elapsed().as_micros() as u64, Ordering::Release);
                result
            });

            handles.push(strategy.submit(wrapped)?);
            completion_slots.push(slot);
        }

        let outcomes = wait_all(&handles, self.timeout);
        let total_elapsed = run_start.elapsed();

        let reports = outcomes
            .iter()
            .zip(completion_slots.iter())
            .enumerate()
            .map(|(index, (outcome, slot))| {
                let recorded = slot.load(Ordering::Acquire);
                let latency = if recorded != UNSET {
                    Duration::from_micros(recorded)
                } else if matches!(outcome, Outcome::TimedOut) {
                    total_elapsed
                } else {
                    Duration::ZERO
                };
                TaskReport {
                    index,
                    outcome: OutcomeKind::from(outcome),
                    latency,
                }
            })
            .collect();

        let result = BenchmarkResult {
            kind,
            task_count,
            total_elapsed,
            outcomes: reports,
        };
        log::info!("{}", result);
        Ok(result)
    }

    /// Run a freshly built workload against each strategy in turn
    ///
    /// The factory is invoked once per strategy because executed work units
    /// are not reusable.
    pub fn compare<T, F>(
        &self,
        mut workload: F,
        strategies: &[&dyn Strategy<T>],
    ) -> Result<Vec<BenchmarkResult>>
    where
        T: Clone + Send + 'static,
        F: FnMut() -> Vec<WorkUnit<T>>,
    {
        strategies
            .iter()
            .map(|strategy| self.run(*strategy, workload()))
            .collect()
    }
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::strategy::{BoundedPool, PerTaskSpawner};
    use std::thread;

    fn simulated_io(latency: Duration, count: usize) -> Vec<WorkUnit<()>> {
        (0..count)
            .map(|_| {
                WorkUnit::new(move || {
                    thread::sleep(latency);
                    Ok(())
                })
            })
            .collect()
    }

    #[test]
    fn test_run_records_every_task() {
        let pool = BoundedPool::with_workers(2).unwrap();
        let runner = BenchmarkRunner::new();

        let result = runner
            .run(&pool, simulated_io(Duration::from_millis(5), 10))
            .unwrap();

        assert_eq!(result.task_count(), 10);
        assert_eq!(result.completed_count(), 10);
        for (i, report) in result.outcomes().iter().enumerate() {
            assert_eq!(report.index, i);
            assert_eq!(report.outcome, OutcomeKind::Completed);
        }
        pool.shutdown();
    }

    #[test]
    fn test_failures_are_recorded_not_fatal() {
        let pool = BoundedPool::with_workers(2).unwrap();
        let runner = BenchmarkRunner::new();

        let workload = vec![
            WorkUnit::from_value(()),
            WorkUnit::new(|| {
                Err(Error::TaskFailed {
                    reason: "flaky".to_string(),
                })
            }),
            WorkUnit::from_value(()),
        ];

        let result = runner.run(&pool, workload).unwrap();
        assert_eq!(result.task_count(), 3);
        assert_eq!(result.completed_count(), 2);
        assert_eq!(result.outcomes()[1].outcome, OutcomeKind::Failed);
        pool.shutdown();
    }

    #[test]
    fn test_pool_batches_while_per_task_parallelizes() {
        let latency = Duration::from_millis(40);
        let task_count = 20;
        let pool = BoundedPool::with_workers(4).unwrap();
        let spawner = PerTaskSpawner::new();
        let runner = BenchmarkRunner::new();

        let pooled = runner.run(&pool, simulated_io(latency, task_count)).unwrap();
        let per_task = runner
            .run(&spawner, simulated_io(latency, task_count))
            .unwrap();

        // 20 tasks on 4 workers need ceil(20/4) = 5 latency batches, while
        // thread-per-task runs them all at once
        assert!(pooled.total_elapsed() >= latency * 4);
        assert!(per_task.total_elapsed() < latency * 3);
        assert!(per_task.total_elapsed() < pooled.total_elapsed());

        pool.shutdown();
        spawner.shutdown();
    }

    #[test]
    fn test_run_deadline_reports_timed_out_tasks() {
        let pool = BoundedPool::with_workers(1).unwrap();
        let runner = BenchmarkRunner::with_timeout(Duration::from_millis(30));

        let result = runner
            .run(&pool, simulated_io(Duration::from_millis(200), 3))
            .unwrap();

        assert!(result
            .outcomes()
            .iter()
            .any(|r| r.outcome == OutcomeKind::TimedOut));
        pool.shutdown();
    }

    #[test]
    fn test_compare_builds_fresh_workloads() {
        let pool = BoundedPool::with_workers(2).unwrap();
        let spawner = PerTaskSpawner::new();
        let runner = BenchmarkRunner::new();

        let strategies: [&dyn Strategy<()>; 2] = [&pool, &spawner];
        let results = runner
            .compare(|| simulated_io(Duration::from_millis(5), 6), &strategies)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].kind(), StrategyKind::Bounded { worker_count: 2 });
        assert_eq!(results[1].kind(), StrategyKind::Unbounded);
        assert!(results.iter().all(|r| r.completed_count() == 6));

        pool.shutdown();
        spawner.shutdown();
    }

    #[test]
    fn test_metrics() {
        let pool = BoundedPool::with_workers(4).unwrap();
        let runner = BenchmarkRunner::new();

        let result = runner
            .run(&pool, simulated_io(Duration::from_millis(10), 8))
            .unwrap();

        assert!(result.throughput() > 0.0);
        let mean = result.mean_latency().unwrap();
        let max = result.max_latency().unwrap();
        assert!(mean >= Duration::from_millis(10));
        assert!(max >= mean);
        pool.shutdown();
    }
}
