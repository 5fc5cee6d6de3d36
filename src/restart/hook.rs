//! # Hook command.
//!
//! The operator-supplied command that runs once per detected death, before the restart
//! decision. The command string is split on plain spaces: there is no quoting, so
//! `notify "a b"` becomes `["notify", "\"a", "b\""]`.

use std::fmt;

use tokio::process::Command;

use super::Streams;
use crate::error::RestartError;

/// A parsed hook command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookCommand {
    line: String,
    argv: Vec<String>,
}

impl HookCommand {
    /// Splits `line` on spaces. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let argv: Vec<String> = line
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            line: line.to_string(),
            argv,
        })
    }

    /// The program to execute.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// The command line as configured.
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Runs the hook to completion.
    ///
    /// Failing to start it, or any exit other than status 0, is an error.
    pub async fn run(&self, streams: Streams) -> Result<(), RestartError> {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args());
        streams.apply(&mut cmd);

        let status = cmd.status().await.map_err(|e| RestartError::Hook {
            command: self.line.clone(),
            reason: e.to_string(),
        })?;
        if !status.success() {
            return Err(RestartError::hook_status(&self.line, status));
        }
        Ok(())
    }
}

impl fmt::Display for HookCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_plain_spaces_only() {
        let hook = HookCommand::parse("notify-send  \"target died\"").unwrap();
        assert_eq!(hook.program(), "notify-send");
        assert_eq!(hook.args(), ["\"target", "died\""]);
        assert!(HookCommand::parse("   ").is_none());
    }

    #[tokio::test]
    async fn exit_status_decides_success() {
        let ok = HookCommand::parse("true").unwrap();
        ok.run(Streams::Null).await.unwrap();

        let failing = HookCommand::parse("false").unwrap();
        let err = failing.run(Streams::Null).await.unwrap_err();
        assert_eq!(err.as_label(), "restart_hook");

        let missing = HookCommand::parse("/nonexistent/hook --now").unwrap();
        assert!(matches!(
            missing.run(Streams::Null).await,
            Err(RestartError::Hook { .. })
        ));
    }
}
