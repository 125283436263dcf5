//! Stress tests for LoginBridge.
//!
//! These helpers hammer the server from many threads at once: callers parked
//! on a closed vault, and receivers registering while broadcasts run.

use crate::fixtures::{sample_entries, TestServer};
use loginbridge_core::{MemoryStore, ReopenLastUsed, ThreadDispatcher};
use loginbridge_protocol::{ClientIdentity, Request, Response, SearchQuery};
use loginbridge_server::{LoginServer, ServerConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 8,
        }
    }
}

/// Runs `op` `config.operations` times on each of `config.threads` threads.
///
/// `op` gets the thread and iteration index and reports success.
pub fn run_concurrent<F>(server: Arc<LoginServer>, config: &StressConfig, op: F) -> StressTestResult
where
    F: Fn(&LoginServer, usize, usize) -> bool + Send + Sync + 'static,
{
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let op = Arc::new(op);
    let operations = config.operations;

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let server = Arc::clone(&server);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let op = Arc::clone(&op);

            thread::spawn(move || {
                for i in 0..operations {
                    if op(&server, t, i) {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Many callers search a closed vault that a UI thread reopens.
///
/// Every search must come back with the sample logins, never the sentinel.
pub fn stress_waiters_on_closed_vault(config: &StressConfig) -> StressTestResult {
    let dispatcher = ThreadDispatcher::spawn("stress-ui").expect("Failed to spawn UI thread");
    let server = TestServer::build(
        ServerConfig::default(),
        Arc::new(MemoryStore::with_entries("Stress", sample_entries())),
        Arc::new(dispatcher),
        Arc::new(ReopenLastUsed),
    );
    let server = Arc::new(server.server);

    run_concurrent(server, config, |server, _, i| {
        let query = SearchQuery::new("https://example.com");
        let response = if i % 2 == 0 {
            server.handle_message(Request::FindLogins { query })
        } else {
            server.handle_message(Request::CountLogins { query })
        };
        match response {
            Response::Logins(list) => !list.is_closed() && list.entries().len() == 2,
            Response::Count(count) => count == 2,
            _ => false,
        }
    })
}

/// Receivers register from many threads while broadcasts run.
pub fn stress_register_and_broadcast(config: &StressConfig) -> StressTestResult {
    let server = Arc::new(TestServer::open(Vec::new()).server);

    run_concurrent(server, config, |server, t, i| {
        if i % 4 == 0 {
            server.notify_subscribers();
            true
        } else {
            let identity = ClientIdentity::new(format!("client-{t}-{}", i % 8));
            server.handle_message(Request::AddClient { identity }) == Response::Done
        }
    })
}
