//! # Restart strategy selection.
//!
//! ```text
//! in terminal ∧ detach.enabled ∧ detach.inject
//!     ├─ elevated      → TerminalInjection
//!     └─ not elevated  → PermissionError (never a silent fallback)
//! otherwise            → Respawn(placement)
//!     ├─ !detach.enabled → Inherit          (supervisor's process group)
//!     ├─ in terminal     → NewProcessGroup
//!     └─ detached        → NewSession
//! ```

use std::fmt;

use crate::error::RestartError;
use crate::policies::DetachPolicy;
use crate::process::ProcessDescriptor;

/// Process-group placement of a directly re-spawned replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// `setsid()`: new session, no controlling terminal.
    NewSession,
    /// `setpgid(0, 0)`: new process group in the supervisor's session.
    NewProcessGroup,
    /// Stay in the supervisor's process group.
    Inherit,
}

/// How a dead target is brought back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Replay the command line into the original terminal.
    TerminalInjection,
    /// Start a fresh child process directly.
    Respawn(Placement),
}

impl Strategy {
    /// Picks the strategy for `target`.
    pub fn choose(
        target: &ProcessDescriptor,
        detach: DetachPolicy,
        elevated: bool,
    ) -> Result<Self, RestartError> {
        if target.in_terminal() && detach.enabled && detach.inject {
            if !elevated {
                return Err(RestartError::Permission {
                    terminal: target.terminal.to_string(),
                });
            }
            return Ok(Strategy::TerminalInjection);
        }

        let placement = if !detach.enabled {
            Placement::Inherit
        } else if target.in_terminal() {
            Placement::NewProcessGroup
        } else {
            Placement::NewSession
        };
        Ok(Strategy::Respawn(placement))
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Strategy::TerminalInjection => "terminal-injection",
            Strategy::Respawn(Placement::NewSession) => "respawn-new-session",
            Strategy::Respawn(Placement::NewProcessGroup) => "respawn-new-group",
            Strategy::Respawn(Placement::Inherit) => "respawn",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Terminal;
    use nix::unistd::Pid;

    fn target(tty: &str) -> ProcessDescriptor {
        ProcessDescriptor {
            pid: Pid::from_raw(99),
            executable: "top".into(),
            arguments: vec![],
            working_dir: None,
            terminal: Terminal::parse(tty),
        }
    }

    #[test]
    fn terminal_target_needs_elevation() {
        let t = target("pts/2");
        let detach = DetachPolicy::default();
        assert_eq!(
            Strategy::choose(&t, detach, true).unwrap(),
            Strategy::TerminalInjection
        );
        let err = Strategy::choose(&t, detach, false).unwrap_err();
        assert_eq!(err.as_label(), "restart_permission");
    }

    #[test]
    fn respawn_placement() {
        let no_inject = DetachPolicy {
            enabled: true,
            inject: false,
        };
        assert_eq!(
            Strategy::choose(&target("pts/2"), no_inject, false).unwrap(),
            Strategy::Respawn(Placement::NewProcessGroup)
        );
        assert_eq!(
            Strategy::choose(&target("??"), DetachPolicy::default(), false).unwrap(),
            Strategy::Respawn(Placement::NewSession)
        );
        // Attached: even a terminal target with root is re-spawned in our group.
        assert_eq!(
            Strategy::choose(&target("pts/2"), DetachPolicy::attached(), true).unwrap(),
            Strategy::Respawn(Placement::Inherit)
        );
    }
}
