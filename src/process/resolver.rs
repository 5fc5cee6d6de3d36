//! # Process identity resolution.
//!
//! [`Resolver`] turns a pid or a name pattern into a complete [`ProcessDescriptor`] using
//! only read-only queries issued through an [`Inspect`] implementation.
//!
//! ## Argument extraction
//! The argument vector is recovered from the full command line by locating the first
//! occurrence of the bare executable name and splitting what follows on whitespace:
//! ```text
//! comm    = "vim"
//! command = "/usr/bin/vim main.go -R"
//!                        ^^^ split here → ["main.go", "-R"]
//! ```
//! This misfires when the executable name recurs inside an earlier path component
//! (e.g. `/opt/vim/bin/vim x`). The heuristic lives in [`split_arguments`] only, so a
//! per-OS argv query can replace it without touching callers.
//!
//! ## Reacquiring a pid after terminal injection
//! There is no handle on the process a shell spawns for an injected line, so
//! [`Resolver::find_injected`] rescans the table for a line carrying both the terminal
//! name and the full command line. Zero matches and several matches are different errors.

use std::sync::Arc;

use nix::unistd::Pid;

use super::{ProcessDescriptor, Select, Terminal};
use crate::error::ResolveError;
use crate::inspect::Inspect;

/// Builds process descriptors from process-table data.
#[derive(Clone)]
pub struct Resolver {
    inspector: Arc<dyn Inspect>,
}

impl Resolver {
    pub fn new(inspector: Arc<dyn Inspect>) -> Self {
        Self { inspector }
    }

    /// Controlling terminal of `pid`, as the inspector reports it now.
    pub fn terminal(&self, pid: Pid) -> Result<Terminal, ResolveError> {
        self.inspector.terminal(pid)
    }

    /// Resolves every descriptor field for `pid`.
    ///
    /// Fails as a whole if any query fails; never returns a partial descriptor.
    pub fn resolve_by_pid(&self, pid: Pid) -> Result<ProcessDescriptor, ResolveError> {
        let executable = self.inspector.executable(pid)?;
        let command_line = self.inspector.command_line(pid)?;
        let terminal = self.inspector.terminal(pid)?;
        let working_dir = self.inspector.working_dir(pid)?;

        let arguments = split_arguments(&executable, &command_line).ok_or_else(|| {
            ResolveError::inspection(
                format!("command line of {pid}"),
                format!("{executable:?} does not occur in {command_line:?}"),
            )
        })?;

        Ok(ProcessDescriptor {
            pid,
            executable,
            arguments,
            working_dir,
            terminal,
        })
    }

    /// Finds processes whose table line contains `pattern` (case-insensitive), lets
    /// `selector` choose one, and resolves it by pid.
    pub fn resolve_by_name(
        &self,
        pattern: &str,
        selector: &dyn Select,
    ) -> Result<ProcessDescriptor, ResolveError> {
        let table = self.inspector.table()?;
        let mut found = candidates(pattern, &table);
        // our own command line contains the pattern too
        found.retain(|line| leading_pid(line).map_or(true, |pid| pid != Pid::this()));
        if found.is_empty() {
            return Err(ResolveError::not_found(format!("name {pattern:?}")));
        }

        let index = selector.select(&found)?;
        let line = usize::try_from(index)
            .ok()
            .and_then(|i| found.get(i))
            .ok_or(ResolveError::Ambiguous {
                index,
                candidates: found.len(),
            })?;

        self.resolve_by_pid(leading_pid(line)?)
    }

    /// Rescans the process table for the process a shell started for `command_line`
    /// on `terminal`, ignoring the pids in `exclude`.
    pub fn find_injected(
        &self,
        terminal: &Terminal,
        command_line: &str,
        exclude: &[Pid],
    ) -> Result<Pid, ResolveError> {
        let device = terminal.device().ok_or_else(|| {
            ResolveError::not_found(format!("{command_line:?} without a terminal"))
        })?;

        let mut pids = Vec::new();
        for line in self.inspector.table()? {
            let on_device = line.split_whitespace().nth(1) == Some(device);
            if !(on_device && line.contains(command_line)) {
                continue;
            }
            let pid = leading_pid(&line)?;
            if !exclude.contains(&pid) {
                pids.push(pid);
            }
        }

        match pids.as_slice() {
            [] => Err(ResolveError::not_found(format!(
                "{command_line:?} on {device}"
            ))),
            [pid] => Ok(*pid),
            _ => Err(ResolveError::AmbiguousMatch {
                terminal: device.to_string(),
                command: command_line.to_string(),
                pids,
            }),
        }
    }
}

/// Everything after the first occurrence of `executable` in `command_line`, split on
/// whitespace. `None` if the executable name does not occur at all.
pub fn split_arguments(executable: &str, command_line: &str) -> Option<Vec<String>> {
    let at = command_line.find(executable)?;
    let rest = &command_line[at + executable.len()..];
    Some(rest.split_whitespace().map(str::to_string).collect())
}

/// Lowercased table lines containing the lowercased `pattern`.
pub fn candidates(pattern: &str, table: &[String]) -> Vec<String> {
    let pattern = pattern.to_lowercase();
    table
        .iter()
        .map(|line| line.to_lowercase())
        .filter(|line| line.contains(&pattern))
        .collect()
}

/// Parses the first whitespace-delimited token of a table line as a pid.
pub fn leading_pid(line: &str) -> Result<Pid, ResolveError> {
    line.split_whitespace()
        .next()
        .and_then(|token| token.parse::<i32>().ok())
        .filter(|raw| *raw > 0)
        .map(Pid::from_raw)
        .ok_or_else(|| ResolveError::inspection("process table", format!("no pid in {line:?}")))
}
