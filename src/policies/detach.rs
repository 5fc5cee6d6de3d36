//! # Detach policy for restarted processes.
//!
//! [`DetachPolicy`] decides how far a replacement is separated from the supervisor:
//!
//! ```text
//!                      enabled = true                    enabled = false
//! target in terminal   inject into the terminal          re-spawn, supervisor's group
//!                      (or new process group if
//!                       inject = false)
//! target detached      re-spawn in a new session         re-spawn, supervisor's group
//! ```

/// Placement of restarted processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetachPolicy {
    /// Detach replacements from the supervisor's session / process group.
    pub enabled: bool,
    /// Replay the command line into the original terminal when the target had one.
    ///
    /// With `false`, terminal-launched targets are re-spawned directly instead.
    pub inject: bool,
}

impl Default for DetachPolicy {
    /// `enabled = true`, `inject = true`.
    fn default() -> Self {
        Self {
            enabled: true,
            inject: true,
        }
    }
}

impl DetachPolicy {
    /// Keeps replacements in the supervisor's process group.
    pub fn attached() -> Self {
        Self {
            enabled: false,
            inject: false,
        }
    }
}
