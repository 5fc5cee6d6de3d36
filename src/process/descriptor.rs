//! # Resolved identity of a supervised process.
//!
//! [`ProcessDescriptor`] holds only plain data: the numeric pid, never an OS handle.
//! Signalling and waiting go through [`Probe`](crate::Probe) and the restart strategies,
//! so descriptors can be cloned, logged and compared freely.

use std::fmt;
use std::path::PathBuf;

use nix::unistd::Pid;

/// Marker used by process-listing tools for "no controlling terminal".
pub const NO_TERMINAL: &str = "??";

/// Controlling terminal of a process.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// No controlling terminal (printed as `??`).
    Detached,
    /// Terminal device name relative to `/dev` (e.g. `pts/3`, `ttys002`).
    Device(String),
}

impl Terminal {
    /// Parses a terminal column as printed by `ps -o tty=`.
    ///
    /// Linux `ps` prints `?`, BSD/macOS print `??`; both (and an empty column) mean detached.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "?" | NO_TERMINAL | "-" => Terminal::Detached,
            name => Terminal::Device(name.trim_start_matches("/dev/").to_string()),
        }
    }

    /// Device name, or `None` when detached.
    pub fn device(&self) -> Option<&str> {
        match self {
            Terminal::Detached => None,
            Terminal::Device(name) => Some(name),
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Detached => f.pad(NO_TERMINAL),
            Terminal::Device(name) => f.pad(name),
        }
    }
}

/// Identity and launch metadata of the supervised process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessDescriptor {
    /// Process id; replaced after every successful restart.
    pub pid: Pid,
    /// Short command name as reported by the process table.
    pub executable: String,
    /// Argument vector without the executable itself.
    pub arguments: Vec<String>,
    /// Directory the process was started from (`None` if it could not be determined).
    pub working_dir: Option<PathBuf>,
    /// Controlling terminal.
    pub terminal: Terminal,
}

impl ProcessDescriptor {
    /// True when the process has a controlling terminal.
    pub fn in_terminal(&self) -> bool {
        self.terminal != Terminal::Detached
    }

    /// Executable followed by the arguments, single-space separated.
    ///
    /// This is the exact text typed into the terminal on an injected restart.
    pub fn full_command_line(&self) -> String {
        let mut line = self.executable.clone();
        for arg in &self.arguments {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Returns a copy of this descriptor bound to another pid.
    pub fn with_pid(&self, pid: Pid) -> Self {
        Self {
            pid,
            ..self.clone()
        }
    }
}

impl fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Pid]: {}", self.pid)?;
        writeln!(f, "[Command]: {}", self.executable)?;
        writeln!(f, "[Args]: {}", self.arguments.join(", "))?;
        match &self.working_dir {
            Some(dir) => writeln!(f, "[Cwd]: {}", dir.display())?,
            None => writeln!(f, "[Cwd]:")?,
        }
        write!(f, "[Tty]: {}", self.terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vim() -> ProcessDescriptor {
        ProcessDescriptor {
            pid: Pid::from_raw(4242),
            executable: "vim".into(),
            arguments: vec!["main.go".into(), "-R".into()],
            working_dir: Some(PathBuf::from("/home/dev/project")),
            terminal: Terminal::parse("ttys002"),
        }
    }

    #[test]
    fn terminal_sentinels() {
        assert_eq!(Terminal::parse("??"), Terminal::Detached);
        assert_eq!(Terminal::parse("?"), Terminal::Detached);
        assert_eq!(Terminal::parse("  \n"), Terminal::Detached);
        assert_eq!(Terminal::parse("pts/3\n"), Terminal::Device("pts/3".into()));
        assert_eq!(Terminal::parse("/dev/tty1").device(), Some("tty1"));
        assert_eq!(Terminal::Detached.to_string(), "??");
    }

    #[test]
    fn full_command_line_joins_with_single_spaces() {
        let d = vim();
        assert_eq!(d.full_command_line(), "vim main.go -R");
        assert!(d.in_terminal());

        let bare = ProcessDescriptor {
            arguments: vec![],
            terminal: Terminal::Detached,
            ..d
        };
        assert_eq!(bare.full_command_line(), "vim");
        assert!(!bare.in_terminal());
    }

    #[test]
    fn display_lists_every_field() {
        let text = vim().to_string();
        assert!(text.contains("[Pid]: 4242"));
        assert!(text.contains("[Args]: main.go, -R"));
        assert!(text.contains("[Cwd]: /home/dev/project"));
        assert!(text.ends_with("[Tty]: ttys002"));
    }
}
