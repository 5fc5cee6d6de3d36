//! # `/proc` backed inspector (Linux).
//!
//! ```text
//! executable   stat comm, widened from cmdline argv[0] when truncated
//! command_line cmdline            (joined with spaces)
//! terminal     stat tty_nr        (major, minor)
//! working_dir  cwd                (fd-table link)
//! table        every process under the root
//! ```
//! A missing `/proc/PID` directory maps to [`ResolveError::NotFound`].

use std::fs;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::PathBuf;

use nix::sys::stat::makedev;
use nix::unistd::Pid;
use ::procfs::process::{all_processes_with_root, Process};
use ::procfs::ProcError;

use super::{widen_comm, Inspect};
use crate::error::ResolveError;
use crate::process::Terminal;

/// Unix98 pty slaves use majors 136..=143.
const PTS_MAJOR_FIRST: i32 = 136;
const PTS_MAJOR_LAST: i32 = 143;
/// Virtual consoles (`ttyN`, minor < 64) and serial ports (`ttySN`, minor >= 64).
const TTY_MAJOR: i32 = 4;

/// Inspector reading the Linux `/proc` filesystem.
#[derive(Clone, Debug)]
pub struct ProcfsInspector {
    proc_root: PathBuf,
    dev_root: PathBuf,
}

impl Default for ProcfsInspector {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            dev_root: PathBuf::from("/dev"),
        }
    }
}

impl ProcfsInspector {
    /// Reads from alternative `/proc` and `/dev` roots.
    pub fn with_roots(proc_root: impl Into<PathBuf>, dev_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            dev_root: dev_root.into(),
        }
    }

    fn open(&self, pid: Pid) -> Result<Process, ResolveError> {
        Process::new_with_root(self.proc_root.join(pid.to_string()))
            .map_err(|e| self.failure(pid.as_raw(), "", e))
    }

    fn failure(&self, pid: i32, entry: &str, e: ProcError) -> ResolveError {
        let dir = self.proc_root.join(pid.to_string());
        if !dir.exists() {
            ResolveError::not_found(format!("pid {pid}"))
        } else {
            ResolveError::inspection(dir.join(entry).display().to_string(), e)
        }
    }

    /// Maps a (major, minor) pair to a device name under `/dev`.
    fn device_name(&self, (major, minor): (i32, i32)) -> Option<String> {
        match major {
            PTS_MAJOR_FIRST..=PTS_MAJOR_LAST => {
                Some(format!("pts/{}", (major - PTS_MAJOR_FIRST) * 256 + minor))
            }
            TTY_MAJOR if minor < 64 => Some(format!("tty{minor}")),
            TTY_MAJOR => Some(format!("ttyS{}", minor - 64)),
            _ => self.scan_dev(major, minor),
        }
    }

    /// Looks for a character device with a matching rdev in `/dev`.
    fn scan_dev(&self, major: i32, minor: i32) -> Option<String> {
        let rdev = makedev(u64::try_from(major).ok()?, u64::try_from(minor).ok()?);
        let entries = fs::read_dir(&self.dev_root).ok()?;
        entries.flatten().find_map(|entry| {
            let meta = entry.metadata().ok()?;
            if meta.file_type().is_char_device() && meta.rdev() == rdev {
                Some(entry.file_name().to_string_lossy().into_owned())
            } else {
                None
            }
        })
    }

    fn executable_of(&self, process: &Process) -> Result<String, ResolveError> {
        let pid = process.pid();
        let comm = process
            .stat()
            .map_err(|e| self.failure(pid, "stat", e))?
            .comm;
        if comm.is_empty() {
            return Err(self.failure(pid, "stat", ProcError::Other("no data".into())));
        }
        let argv = process.cmdline().unwrap_or_default();
        Ok(widen_comm(&comm, argv.first().map(String::as_str)))
    }

    fn command_line_of(&self, process: &Process) -> Result<String, ResolveError> {
        let pid = process.pid();
        let argv = process
            .cmdline()
            .map_err(|e| self.failure(pid, "cmdline", e))?;
        let line = argv
            .iter()
            .filter(|arg| !arg.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if line.is_empty() {
            return Err(self.failure(pid, "cmdline", ProcError::Other("no data".into())));
        }
        Ok(line)
    }

    fn terminal_of(&self, process: &Process) -> Result<Terminal, ResolveError> {
        let pid = process.pid();
        let stat = process.stat().map_err(|e| self.failure(pid, "stat", e))?;
        if stat.tty_nr == 0 {
            return Ok(Terminal::Detached);
        }
        let (major, minor) = stat.tty_nr();
        self.device_name((major, minor))
            .map(Terminal::Device)
            .ok_or_else(|| {
                self.failure(
                    pid,
                    "stat",
                    ProcError::Other(format!("no device for tty {major}:{minor}")),
                )
            })
    }

    fn table_line(&self, process: &Process) -> Result<String, ResolveError> {
        let terminal = self.terminal_of(process)?;
        let args = match self.command_line_of(process) {
            Ok(line) => line,
            Err(ResolveError::Inspection { .. }) => format!("[{}]", self.executable_of(process)?),
            Err(e) => return Err(e),
        };
        Ok(format!("{:>7} {:<8} {}", process.pid(), terminal, args))
    }
}

impl Inspect for ProcfsInspector {
    fn executable(&self, pid: Pid) -> Result<String, ResolveError> {
        self.executable_of(&self.open(pid)?)
    }

    fn command_line(&self, pid: Pid) -> Result<String, ResolveError> {
        self.command_line_of(&self.open(pid)?)
    }

    fn terminal(&self, pid: Pid) -> Result<Terminal, ResolveError> {
        self.terminal_of(&self.open(pid)?)
    }

    fn working_dir(&self, pid: Pid) -> Result<Option<PathBuf>, ResolveError> {
        match self.open(pid)?.cwd() {
            Ok(dir) => Ok(Some(dir)),
            Err(ProcError::PermissionDenied(_)) => {
                tracing::debug!(%pid, "cwd link not readable");
                Ok(None)
            }
            Err(e) => Err(self.failure(pid.as_raw(), "cwd", e)),
        }
    }

    fn table(&self) -> Result<Vec<String>, ResolveError> {
        let query = self.proc_root.display().to_string();
        let mut processes: Vec<Process> = all_processes_with_root(&self.proc_root)
            .map_err(|e| ResolveError::inspection(&query, e))?
            // Processes exit while we walk the table.
            .filter_map(Result::ok)
            .collect();
        processes.sort_unstable_by_key(Process::pid);

        let lines: Vec<String> = processes
            .iter()
            .filter_map(|process| self.table_line(process).ok())
            .collect();
        if lines.is_empty() {
            return Err(ResolveError::inspection(query, "no data"));
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Resolver;
    use std::process::Command;
    use std::sync::Arc;

    /// Writes a full 52-field stat line; fields after tty_nr are zero.
    fn stat_line(pid: i32, comm: &str, tty_nr: i32) -> String {
        let tail = vec!["0"; 45].join(" ");
        format!("{pid} ({comm}) S 1 {pid} {pid} {tty_nr} {tail}\n")
    }

    fn fake_proc(pid: i32, comm: &str, cmdline: &[u8], tty_nr: i32) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(pid.to_string());
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("comm"), format!("{comm}\n")).unwrap();
        fs::write(dir.join("cmdline"), cmdline).unwrap();
        fs::write(dir.join("stat"), stat_line(pid, comm, tty_nr)).unwrap();
        std::os::unix::fs::symlink(root.path(), dir.join("cwd")).unwrap();
        root
    }

    #[test]
    fn tty_decoding() {
        let inspector = ProcfsInspector::default();
        assert_eq!(inspector.device_name((136, 3)).as_deref(), Some("pts/3"));
        assert_eq!(inspector.device_name((137, 1)).as_deref(), Some("pts/257"));
        assert_eq!(inspector.device_name((4, 2)).as_deref(), Some("tty2"));
        assert_eq!(inspector.device_name((4, 65)).as_deref(), Some("ttyS1"));
    }

    #[test]
    fn reads_fake_tree() {
        let root = fake_proc(900, "vim", b"vim\0main.go\0-R\0", (136 << 8) | 5);
        let inspector = ProcfsInspector::with_roots(root.path(), root.path());
        let pid = Pid::from_raw(900);

        assert_eq!(inspector.executable(pid).unwrap(), "vim");
        assert_eq!(inspector.command_line(pid).unwrap(), "vim main.go -R");
        assert_eq!(
            inspector.terminal(pid).unwrap(),
            Terminal::Device("pts/5".into())
        );
        assert_eq!(
            inspector.working_dir(pid).unwrap(),
            Some(root.path().to_path_buf())
        );
        let table = inspector.table().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table[0].trim_start().starts_with("900 pts/5"));
        assert!(table[0].ends_with("vim main.go -R"));
    }

    #[test]
    fn stat_with_odd_comm_still_yields_the_terminal() {
        let root = fake_proc(77, "we ird) (x", b"weird\0", (136 << 8) | 9);
        let inspector = ProcfsInspector::with_roots(root.path(), root.path());
        assert_eq!(
            inspector.terminal(Pid::from_raw(77)).unwrap(),
            Terminal::Device("pts/9".into())
        );
    }

    #[test]
    fn truncated_comm_is_widened_from_argv0() {
        let root = fake_proc(
            901,
            "averyveryverylo",
            b"/opt/bin/averyveryverylongsleepname\x0030\0",
            0,
        );
        let inspector = ProcfsInspector::with_roots(root.path(), root.path());
        let pid = Pid::from_raw(901);
        assert_eq!(
            inspector.executable(pid).unwrap(),
            "averyveryverylongsleepname"
        );

        let target = Resolver::new(Arc::new(inspector)).resolve_by_pid(pid).unwrap();
        assert_eq!(target.executable, "averyveryverylongsleepname");
        assert_eq!(target.arguments, vec!["30".to_string()]);
    }

    #[test]
    fn missing_pid_is_not_found_and_kernel_threads_are_bracketed() {
        let root = fake_proc(2, "kthreadd", b"", 0);
        let inspector = ProcfsInspector::with_roots(root.path(), root.path());

        let err = inspector.executable(Pid::from_raw(31337)).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));

        let err = inspector.command_line(Pid::from_raw(2)).unwrap_err();
        assert!(matches!(err, ResolveError::Inspection { .. }));
        assert_eq!(inspector.terminal(Pid::from_raw(2)).unwrap(), Terminal::Detached);
        assert!(inspector.table().unwrap()[0].ends_with("[kthreadd]"));
    }

    #[test]
    fn live_child_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut child = Command::new("sleep")
            .arg("30")
            .current_dir(dir.path())
            .spawn()
            .unwrap();
        let pid = Pid::from_raw(child.id() as i32);

        let inspector = ProcfsInspector::default();
        let cwd = inspector.working_dir(pid).unwrap().unwrap();
        assert_eq!(
            cwd.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );

        child.kill().unwrap();
        child.wait().unwrap();
    }
}
