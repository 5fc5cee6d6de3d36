//! # Events emitted while supervising a process.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Target events**: resolution, death, restart, replacement exit
//! - **Hook events**: hook started / finished
//! - **Run events**: restart disabled, shutdown, subscriber trouble
//!
//! The [`Event`] struct carries the optional metadata (pid, command line, strategy, reason).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use nix::unistd::Pid;
//! use procbeat::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DeathDetected)
//!     .with_pid(Pid::from_raw(4242))
//!     .with_command("sleep 5");
//!
//! assert_eq!(ev.kind, EventKind::DeathDetected);
//! assert_eq!(ev.pid, Some(Pid::from_raw(4242)));
//! assert_eq!(ev.command.as_deref(), Some("sleep 5"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use nix::unistd::Pid;

use crate::process::ProcessDescriptor;
use crate::restart::Strategy;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Target events ===
    /// The target was resolved and supervision begins.
    ///
    /// Sets:
    /// - `pid`, `command`
    /// - `descriptor`: full descriptor
    TargetResolved,

    /// The liveness probe failed; a restart cycle was signalled.
    ///
    /// Sets:
    /// - `pid`: pid that failed the probe
    DeathDetected,

    /// A restart completed.
    ///
    /// Sets:
    /// - `pid`: pid of the replacement
    /// - `command`: full command line
    /// - `strategy`: strategy used
    /// - `descriptor`: replacement descriptor
    Restarted,

    /// A directly re-spawned replacement exited (it was reaped by the supervisor).
    ///
    /// Sets:
    /// - `pid`: pid of the replacement
    /// - `reason`: exit status
    ReplacementExited,

    // === Hook events ===
    /// The hook command is starting.
    ///
    /// Sets:
    /// - `command`: hook command line
    HookStarting,

    /// The hook command exited successfully.
    ///
    /// Sets:
    /// - `command`: hook command line
    HookFinished,

    // === Run events ===
    /// Restart policy is `Never`; the run ends after the hook.
    RestartDisabled,

    /// Hook or restart failed; the run ends with an error.
    ///
    /// Sets:
    /// - `reason`: error message
    RestartFailed,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,
}

/// Supervisor event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Pid the event is about.
    pub pid: Option<Pid>,
    /// Target or hook command line.
    pub command: Option<Arc<str>>,
    /// Restart strategy used.
    pub strategy: Option<Strategy>,
    /// Human-readable reason (errors, exit statuses, overflow details).
    pub reason: Option<Arc<str>>,
    /// Full descriptor, for events that introduce a new identity.
    pub descriptor: Option<Arc<ProcessDescriptor>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pid: None,
            command: None,
            strategy: None,
            reason: None,
            descriptor: None,
        }
    }

    /// Attaches a pid.
    #[inline]
    pub fn with_pid(mut self, pid: Pid) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a command line.
    #[inline]
    pub fn with_command(mut self, command: impl Into<Arc<str>>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attaches a restart strategy.
    #[inline]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a descriptor, along with its pid and command line.
    #[inline]
    pub fn with_descriptor(self, descriptor: &ProcessDescriptor) -> Self {
        let mut ev = self
            .with_pid(descriptor.pid)
            .with_command(descriptor.full_command_line());
        ev.descriptor = Some(Arc::new(descriptor.clone()));
        ev
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Terminal;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::HookStarting);
        let b = Event::new(EventKind::HookFinished);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn descriptor_sets_pid_and_command() {
        let d = ProcessDescriptor {
            pid: Pid::from_raw(12),
            executable: "sleep".into(),
            arguments: vec!["5".into()],
            working_dir: None,
            terminal: Terminal::Detached,
        };
        let ev = Event::new(EventKind::Restarted).with_descriptor(&d);
        assert_eq!(ev.pid, Some(Pid::from_raw(12)));
        assert_eq!(ev.command.as_deref(), Some("sleep 5"));
        assert_eq!(ev.descriptor.as_deref(), Some(&d));
    }
}
