//! Error types used by the resolver, the restart strategies and the supervisor.
//!
//! This module defines three error enums:
//!
//! - [`ResolveError`]: failures while reconstructing a process identity from the process table.
//! - [`RestartError`]: failures of the hook command or of a restart strategy.
//! - [`WatchError`]: errors that end a supervising run.
//!
//! All of them provide `as_label` (stable snake_case) for logs, and `as_message`
//! for a short human-readable description.

use std::path::PathBuf;
use std::process::ExitStatus;

use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

/// # Errors produced while resolving a process identity.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No process (or no candidate line) matched.
    #[error("no process found: {what}")]
    NotFound {
        /// What was looked for (pid, name pattern, terminal + command line).
        what: String,
    },

    /// The interactive selection did not name one of the presented candidates.
    #[error("invalid selection {index}; expected 0..{candidates}")]
    Ambiguous {
        /// The index returned by the selector.
        index: i64,
        /// Number of candidates that were offered.
        candidates: usize,
    },

    /// A rescan of the process table matched several processes.
    #[error("{} processes on {terminal} match {command:?}: {pids:?}", pids.len())]
    AmbiguousMatch {
        /// Terminal that was searched.
        terminal: String,
        /// Command line that was searched for.
        command: String,
        /// Every matching pid, in table order.
        pids: Vec<Pid>,
    },

    /// An inspection query failed or returned data that could not be parsed.
    #[error("{query} failed: {reason}")]
    Inspection {
        /// The query that was issued (e.g. `ps -o comm=`, `/proc/42/stat`).
        query: String,
        /// Why it failed.
        reason: String,
    },
}

impl ResolveError {
    pub(crate) fn inspection(query: impl Into<String>, reason: impl ToString) -> Self {
        ResolveError::Inspection {
            query: query.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        ResolveError::NotFound { what: what.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ResolveError::NotFound { .. } => "resolve_not_found",
            ResolveError::Ambiguous { .. } => "resolve_ambiguous",
            ResolveError::AmbiguousMatch { .. } => "resolve_ambiguous_match",
            ResolveError::Inspection { .. } => "resolve_inspection",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by the hook command or a restart strategy.
///
/// A terminal-injection failure is reported distinctly from an ordinary spawn failure
/// so a half-typed command line can be told apart from a crash.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RestartError {
    /// Terminal injection was requested but the supervisor is not running as root.
    #[error("injecting into {terminal} requires root (uid 0 and gid 0)")]
    Permission {
        /// Terminal the target was launched from.
        terminal: String,
    },

    /// A keystroke was rejected part-way through the command line.
    #[error("keystroke injection into {terminal} failed at byte {offset}: {errno}")]
    TerminalInjection {
        /// Terminal device name.
        terminal: String,
        /// Offset of the rejected byte within the injected line.
        offset: usize,
        /// Low-level error code returned by the ioctl.
        errno: Errno,
    },

    /// The terminal device could not be opened.
    #[error("cannot open terminal /dev/{terminal}: {source}")]
    TerminalOpen {
        /// Terminal device name.
        terminal: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The replacement process could not be started.
    #[error("cannot start {command:?}: {source}")]
    Spawn {
        /// Command that was executed.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The hook command could not be started or exited abnormally.
    #[error("hook {command:?} failed: {reason}")]
    Hook {
        /// Hook command line.
        command: String,
        /// Exit status or start error.
        reason: String,
    },

    /// The working directory exists but could not be used.
    #[error("working directory {}: {source}", path.display())]
    WorkingDir {
        /// The offending directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The identity of the replacement process could not be reacquired.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl RestartError {
    pub(crate) fn hook_status(command: &str, status: ExitStatus) -> Self {
        RestartError::Hook {
            command: command.to_string(),
            reason: status.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RestartError::Permission { .. } => "restart_permission",
            RestartError::TerminalInjection { .. } => "restart_terminal_injection",
            RestartError::TerminalOpen { .. } => "restart_terminal_open",
            RestartError::Spawn { .. } => "restart_spawn",
            RestartError::Hook { .. } => "restart_hook",
            RestartError::WorkingDir { .. } => "restart_working_dir",
            RestartError::Resolve(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors that end a supervising run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WatchError {
    /// The target was not alive when supervision started.
    #[error("process {pid} is not running")]
    NotRunning {
        /// The pid that failed the initial probe.
        pid: Pid,
    },

    /// Resolution of the target failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Hook or restart failed; the watchdog does not retry.
    #[error(transparent)]
    Restart(#[from] RestartError),

    /// Shutdown signal handlers could not be installed.
    #[error("signal handling: {0}")]
    Signal(#[source] std::io::Error),
}

impl WatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use nix::unistd::Pid;
    /// use procbeat::WatchError;
    ///
    /// let err = WatchError::NotRunning { pid: Pid::from_raw(42) };
    /// assert_eq!(err.as_label(), "watch_not_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchError::NotRunning { .. } => "watch_not_running",
            WatchError::Resolve(e) => e.as_label(),
            WatchError::Restart(e) => e.as_label(),
            WatchError::Signal(_) => "watch_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }

    /// True when the run ended because a keystroke injection was rejected mid-line.
    pub fn is_injection_failure(&self) -> bool {
        matches!(
            self,
            WatchError::Restart(RestartError::TerminalInjection { .. })
        )
    }
}
