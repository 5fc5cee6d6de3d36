//! # Liveness probe.
//!
//! [`SignalProbe`] sends the null signal (`kill(pid, 0)`) to a pid. Any failure to deliver,
//! including `EPERM`, counts as [`Liveness::Dead`]. One call, no retries: the poll cadence
//! belongs to the supervisor.

use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Result of a liveness probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
}

impl Liveness {
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, Liveness::Alive)
    }
}

/// Existence check against a pid.
pub trait Probe: Send + Sync + 'static {
    /// Reports whether `pid` still names a process this supervisor may signal.
    fn probe(&self, pid: Pid) -> Liveness;
}

/// Probe backed by `kill(pid, 0)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalProbe;

impl Probe for SignalProbe {
    fn probe(&self, pid: Pid) -> Liveness {
        match kill(pid, None) {
            Ok(()) => Liveness::Alive,
            Err(errno) => {
                tracing::trace!(%pid, %errno, "null signal not delivered");
                Liveness::Dead
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn own_pid_is_alive() {
        assert_eq!(SignalProbe.probe(Pid::this()), Liveness::Alive);
    }

    #[test]
    fn reaped_child_is_dead() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = Pid::from_raw(child.id() as i32);
        assert!(SignalProbe.probe(pid).is_alive());

        child.kill().unwrap();
        child.wait().unwrap();
        assert_eq!(SignalProbe.probe(pid), Liveness::Dead);
    }
}
