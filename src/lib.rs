//! # taskbench
//!
//! A harness for executing large numbers of independent, blocking
//! (I/O-simulating) units of work under different concurrency strategies,
//! and for racing alternative work units against each other to obtain the
//! first successful result under a deadline.
//!
//! ## Features
//!
//! - **Work units**: typed blocking computations yielding a result or error
//! - **Strategies**: a bounded worker pool and an unbounded thread-per-task
//!   spawner behind one polymorphic interface
//! - **Racing**: deadline-bounded "first success wins" over a candidate set
//! - **Benchmarking**: identical workloads driven through each strategy with
//!   aggregate throughput/latency reporting
//!
//! ## Quick Start
//!
//! ```rust
//! use taskbench::prelude::*;
//! use std::time::Duration;
//!
//! let pool = BoundedPool::with_workers(5).unwrap();
//!
//! let handle = pool
//!     .submit(WorkUnit::new(|| {
//!         std::thread::sleep(Duration::from_millis(10));
//!         Ok("response")
//!     }))
//!     .unwrap();
//!
//! assert_eq!(
//!     handle.wait(Duration::from_secs(1)),
//!     Outcome::Completed("response")
//! );
//! pool.shutdown();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bench;
pub mod error;
pub mod handle;
pub mod race;
pub mod strategy;
pub mod work;

pub use bench::{BenchmarkResult, BenchmarkRunner, OutcomeKind, TaskReport};
pub use error::{Error, Result};
pub use handle::{wait_all, Outcome, TaskHandle};
pub use race::race_first;
pub use strategy::{BoundedPool, PerTaskSpawner, PoolConfig, Strategy, StrategyKind};
pub use work::WorkUnit;

/// Convenient re-exports for common functionality
pub mod prelude {
    pub use crate::bench::{BenchmarkResult, BenchmarkRunner, OutcomeKind, TaskReport};
    pub use crate::error::{Error, Result};
    pub use crate::handle::{wait_all, Outcome, TaskHandle};
    pub use crate::race::race_first;
    pub use crate::strategy::{BoundedPool, PerTaskSpawner, PoolConfig, Strategy, StrategyKind};
    pub use crate::work::WorkUnit;
}
