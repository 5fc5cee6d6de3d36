//! # Rescan cadence after terminal injection.
//!
//! After a command line is typed into a terminal the shell still has to fork and exec it,
//! so the first table scan can miss the new process. [`RescanPolicy`] bounds how long the
//! restart worker keeps looking.

use std::time::Duration;

/// Bounded retry of the post-injection table scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RescanPolicy {
    /// Number of scans (min 1).
    pub attempts: u32,
    /// Pause between scans.
    pub delay: Duration,
}

impl Default for RescanPolicy {
    /// 20 scans, 50ms apart.
    fn default() -> Self {
        Self {
            attempts: 20,
            delay: Duration::from_millis(50),
        }
    }
}

impl RescanPolicy {
    /// Attempt count clamped to a minimum of 1.
    #[inline]
    pub fn attempts_clamped(&self) -> u32 {
        self.attempts.max(1)
    }
}
