//! # Supervisor configuration.
//!
//! Provides [`Config`] centralized settings for a supervising run.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]
//! - `interval = 0s` → clamped to 1ms by [`Config::interval_clamped`]
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use procbeat::{Config, HookCommand, RestartPolicy};
//!
//! let mut cfg = Config::default();
//! cfg.interval = Duration::from_millis(50);
//! cfg.hook = HookCommand::parse("notify-send died");
//! cfg.restart = RestartPolicy::OnDeath;
//!
//! assert_eq!(cfg.hook.unwrap().program(), "notify-send");
//! ```

use std::time::Duration;

use crate::policies::{DetachPolicy, RescanPolicy, RestartPolicy};
use crate::restart::{HookCommand, Streams};

/// Settings for one supervising run.
///
/// ## Field semantics
/// - `interval`: liveness poll period
/// - `hook`: command run after every detected death, before any restart decision
/// - `restart`: restart the target, or end the run after the hook
/// - `detach`: placement of replacements and whether terminal injection is used
/// - `streams`: stdio wiring of the hook and of directly re-spawned replacements
/// - `rescan`: how long to look for the pid of an injected command
/// - `bus_capacity`: event bus ring buffer size
#[derive(Clone, Debug)]
pub struct Config {
    /// Poll period of the liveness probe.
    pub interval: Duration,

    /// Command run once per death episode.
    ///
    /// A non-zero or abnormal exit ends the whole run.
    pub hook: Option<HookCommand>,

    /// Whether the target is restarted after it dies.
    pub restart: RestartPolicy,

    /// Session / process-group placement of replacements.
    pub detach: DetachPolicy,

    /// Stdio of hook and replacement processes.
    pub streams: Streams,

    /// Rescan cadence after terminal injection.
    pub rescan: RescanPolicy,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn interval_clamped(&self) -> Duration {
        self.interval.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `interval = 100ms`
    /// - `hook = None`
    /// - `restart = RestartPolicy::OnDeath`
    /// - `detach = DetachPolicy::default()` (detach, inject into terminals)
    /// - `streams = Streams::Inherit`
    /// - `rescan = RescanPolicy::default()` (20 × 50ms)
    /// - `bus_capacity = 64`
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            hook: None,
            restart: RestartPolicy::default(),
            detach: DetachPolicy::default(),
            streams: Streams::default(),
            rescan: RescanPolicy::default(),
            bus_capacity: 64,
        }
    }
}
