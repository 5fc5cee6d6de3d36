//! Process-table inspection.
//!
//! The [`Inspect`] trait is the only place that talks to the OS about other processes.
//! Every query is read-only and independent; the resolver combines them into a
//! [`ProcessDescriptor`](crate::ProcessDescriptor).
//!
//! ## Implementations
//! - [`ProcfsInspector`] (Linux): reads `/proc/<pid>/{stat,cmdline,cwd}` through the `procfs` crate.
//! - [`PsInspector`] (any Unix): shells out to `ps` and `lsof`.
//!
//! [`SystemInspector`] names the default for the current platform.
//!
//! ## Table lines
//! [`Inspect::table`] returns one line per process, `PID TTY COMMAND-LINE`, with the pid as the
//! first whitespace-delimited token. Name lookup and post-injection rescans match on these lines.

use std::path::{Path, PathBuf};

use nix::unistd::Pid;

use crate::error::ResolveError;
use crate::process::Terminal;

#[cfg(target_os = "linux")]
mod procfs;
mod ps;

#[cfg(target_os = "linux")]
pub use self::procfs::ProcfsInspector;
pub use ps::PsInspector;

/// Longest task name the kernel keeps (`TASK_COMM_LEN - 1`).
pub(crate) const COMM_MAX: usize = 15;

/// Default inspector for this platform.
#[cfg(target_os = "linux")]
pub type SystemInspector = ProcfsInspector;
/// Default inspector for this platform.
#[cfg(not(target_os = "linux"))]
pub type SystemInspector = PsInspector;

/// Read-only queries against the OS process table.
pub trait Inspect: Send + Sync + 'static {
    /// Bare executable name (`ps -o comm=`).
    fn executable(&self, pid: Pid) -> Result<String, ResolveError>;

    /// Full command line, arguments separated by spaces (`ps -o command=`).
    fn command_line(&self, pid: Pid) -> Result<String, ResolveError>;

    /// Controlling terminal (`ps -o tty=`).
    fn terminal(&self, pid: Pid) -> Result<Terminal, ResolveError>;

    /// Current working directory taken from the open-file records, if one is reported.
    fn working_dir(&self, pid: Pid) -> Result<Option<PathBuf>, ResolveError>;

    /// Every process as a `PID TTY COMMAND-LINE` line.
    fn table(&self) -> Result<Vec<String>, ResolveError>;
}

/// Recovers a task name cut to [`COMM_MAX`] bytes from the basename of `argv0`.
///
/// The comm is kept unless it is exactly [`COMM_MAX`] long and the basename extends it.
pub(crate) fn widen_comm(comm: &str, argv0: Option<&str>) -> String {
    if comm.len() == COMM_MAX {
        let base = argv0
            .and_then(|arg| Path::new(arg).file_name())
            .and_then(|name| name.to_str());
        if let Some(base) = base {
            if base.len() > COMM_MAX && base.starts_with(comm) {
                return base.to_string();
            }
        }
    }
    comm.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_kept() {
        assert_eq!(widen_comm("sleep", Some("/bin/sleep")), "sleep");
        assert_eq!(widen_comm("vim", None), "vim");
    }

    #[test]
    fn truncated_name_takes_the_argv0_basename() {
        assert_eq!(
            widen_comm("averyveryverylo", Some("/opt/bin/averyveryverylongsleepname")),
            "averyveryverylongsleepname"
        );
        assert_eq!(
            widen_comm("averyveryverylo", Some("averyveryverylongsleepname")),
            "averyveryverylongsleepname"
        );
    }

    #[test]
    fn renamed_task_keeps_its_comm() {
        assert_eq!(
            widen_comm("worker-pool-thr", Some("/usr/bin/python3")),
            "worker-pool-thr"
        );
        assert_eq!(widen_comm("averyveryverylo", None), "averyveryverylo");
    }
}
