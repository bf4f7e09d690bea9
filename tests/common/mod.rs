/// Common test harness for taskbench tests
///
/// Provides shared workload builders and one-time logger setup so timing
/// output is visible when tests run with `RUST_LOG` set.
use std::sync::Once;
use std::thread;
use std::time::Duration;

use taskbench::prelude::*;

/// Initialize the test environment once
static INIT: Once = Once::new();

/// Initialize test environment (logger is a no-op if already set)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Build a workload of `count` units, each sleeping for `latency`
pub fn io_workload(latency: Duration, count: usize) -> Vec<WorkUnit<usize>> {
    (0..count)
        .map(|i| {
            WorkUnit::new(move || {
                thread::sleep(latency);
                Ok(i)
            })
        })
        .collect()
}

/// Build a candidate simulating a backend that answers after `latency`
pub fn backend(name: &str, latency: Duration) -> WorkUnit<String> {
    let name = name.to_string();
    WorkUnit::new(move || {
        thread::sleep(latency);
        Ok(name)
    })
}
