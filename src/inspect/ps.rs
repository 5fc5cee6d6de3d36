//! # `ps` / `lsof` backed inspector.
//!
//! Issues one command per query:
//! ```text
//! executable   ps -o comm=    -p PID
//! command_line ps -o command= -p PID
//! terminal     ps -o tty=     -p PID
//! working_dir  lsof -p PID          (record whose FD column is "cwd", NAME column)
//! table        ps -e -o pid=,tty=,command=
//! ```
//! `ps` exits non-zero with no output when the pid does not exist; that maps to
//! [`ResolveError::NotFound`]. Any other failure, or a successful run with no data,
//! is an inspection error.

use std::path::{Path, PathBuf};
use std::process::Command;

use nix::unistd::Pid;

use super::{widen_comm, Inspect, COMM_MAX};
use crate::error::ResolveError;
use crate::process::Terminal;

/// Inspector that shells out to `ps` and `lsof`.
#[derive(Clone, Debug)]
pub struct PsInspector {
    ps: PathBuf,
    lsof: PathBuf,
}

impl Default for PsInspector {
    fn default() -> Self {
        Self {
            ps: PathBuf::from("ps"),
            lsof: PathBuf::from("lsof"),
        }
    }
}

impl PsInspector {
    /// Uses explicit paths for the two tools.
    pub fn with_tools(ps: impl Into<PathBuf>, lsof: impl Into<PathBuf>) -> Self {
        Self {
            ps: ps.into(),
            lsof: lsof.into(),
        }
    }

    fn ps_field(&self, field: &str, pid: Pid) -> Result<String, ResolveError> {
        let pid_arg = pid.to_string();
        let query = format!("ps -o {field} -p {pid}");
        let out = run(&self.ps, &["-o", field, "-p", &pid_arg], &query)?;
        if !out.success && out.stdout.trim().is_empty() {
            return Err(ResolveError::not_found(format!("pid {pid}")));
        }
        if !out.success {
            return Err(ResolveError::inspection(query, out.stderr.trim()));
        }
        let value = out.stdout.trim();
        if value.is_empty() {
            return Err(ResolveError::inspection(query, "no data"));
        }
        Ok(value.to_string())
    }
}

impl Inspect for PsInspector {
    fn executable(&self, pid: Pid) -> Result<String, ResolveError> {
        let comm = self.ps_field("comm=", pid)?;
        if comm.len() != COMM_MAX {
            return Ok(comm);
        }
        let command = self.ps_field("command=", pid)?;
        Ok(widen_comm(&comm, command.split_whitespace().next()))
    }

    fn command_line(&self, pid: Pid) -> Result<String, ResolveError> {
        self.ps_field("command=", pid)
    }

    fn terminal(&self, pid: Pid) -> Result<Terminal, ResolveError> {
        self.ps_field("tty=", pid).map(|raw| Terminal::parse(&raw))
    }

    fn working_dir(&self, pid: Pid) -> Result<Option<PathBuf>, ResolveError> {
        let pid_arg = pid.to_string();
        let query = format!("lsof -p {pid}");
        let out = run(&self.lsof, &["-p", &pid_arg], &query)?;
        // lsof exits 1 when some records could not be read; judge by the output.
        if out.stdout.trim().is_empty() {
            return Err(ResolveError::inspection(query, "no data"));
        }
        Ok(parse_lsof_cwd(&out.stdout))
    }

    fn table(&self) -> Result<Vec<String>, ResolveError> {
        let query = "ps -e -o pid=,tty=,command=";
        let out = run(&self.ps, &["-e", "-o", "pid=,tty=,command="], query)?;
        if !out.success {
            return Err(ResolveError::inspection(query, out.stderr.trim()));
        }
        let lines: Vec<String> = out
            .stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            return Err(ResolveError::inspection(query, "no data"));
        }
        Ok(lines)
    }
}

struct Output {
    success: bool,
    stdout: String,
    stderr: String,
}

fn run(program: &Path, args: &[&str], query: &str) -> Result<Output, ResolveError> {
    let out = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| ResolveError::inspection(query, e))?;
    Ok(Output {
        success: out.status.success(),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    })
}

/// Picks the NAME column of the `cwd` record from `lsof -p` output.
///
/// Columns: `COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME`; NAME may contain spaces.
pub(crate) fn parse_lsof_cwd(output: &str) -> Option<PathBuf> {
    let mut cwd = None;
    for line in output.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() > 8 && words[3] == "cwd" {
            cwd = Some(PathBuf::from(words[8..].join(" ")));
        }
    }
    cwd
}
