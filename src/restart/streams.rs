//! # Stdio wiring for hook and replacement processes.

use std::process::Stdio;

use tokio::process::Command;

/// Where the three standard streams of a started process go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Streams {
    /// Share the supervisor's stdin/stdout/stderr (default), so interactive
    /// non-terminal programs keep working through the supervisor.
    #[default]
    Inherit,
    /// Connect all three to `/dev/null`.
    Null,
}

impl Streams {
    fn stdio(self) -> Stdio {
        match self {
            Streams::Inherit => Stdio::inherit(),
            Streams::Null => Stdio::null(),
        }
    }

    pub(crate) fn apply(self, cmd: &mut Command) {
        cmd.stdin(self.stdio())
            .stdout(self.stdio())
            .stderr(self.stdio());
    }
}
