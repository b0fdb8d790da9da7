//! Bounded waiting for the renderer's output file.
//!
//! Chrome occasionally returns before the PDF is visible on disk, so the
//! converter checks for the file immediately and then re-checks on a fixed
//! interval until a deadline passes.

use std::path::Path;
use std::time::{Duration, Instant};

/// Shortest delay between two checks; a zero interval would spin on `stat`.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// How long, and how often, to look for an expected file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive checks, never shorter than [`MIN_INTERVAL`].
    pub interval: Duration,
    /// Total time budget, measured from the first check.
    pub timeout: Duration,
}
impl Default for PollPolicy {
    /// One immediate check followed by three checks 100ms apart.
    fn default() -> Self {
        Self { interval: Duration::from_millis(100), timeout: Duration::from_millis(300) }
    }
}
impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval: interval.max(MIN_INTERVAL), timeout }
    }

    /// Time to sleep before the next check, or `None` once the deadline has
    /// passed. Never sleeps past the deadline.
    fn next_delay(&self, started: Instant) -> Option<Duration> {
        let remaining = self.timeout.checked_sub(started.elapsed())?;
        if remaining.is_zero() {
            return None;
        }
        Some(self.interval.max(MIN_INTERVAL).min(remaining))
    }
}

/// Blocks the current thread until `path` exists or the policy's timeout
/// elapses. Returns whether the file appeared.
pub fn wait_for_file(path: &Path, policy: &PollPolicy) -> bool {
    let started = Instant::now();
    loop {
        if path.is_file() {
            return true;
        }
        match policy.next_delay(started) {
            Some(delay) => std::thread::sleep(delay),
            None => return false,
        }
    }
}

/// Async counterpart of [`wait_for_file`]; yields to the runtime between checks.
pub async fn wait_for_file_async(path: &Path, policy: &PollPolicy) -> bool {
    let started = Instant::now();
    loop {
        if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
            return true;
        }
        match policy.next_delay(started) {
            Some(delay) => tokio::time::sleep(delay).await,
            None => return false,
        }
    }
}
