//! # Keystroke injection into a terminal.
//!
//! [`TiocstiInjector`] opens `/dev/<terminal>` and pushes the line into the terminal's
//! input queue one byte at a time with the `TIOCSTI` ioctl, exactly as if it had been
//! typed. The first rejected byte aborts the whole line: the shell is then left with a
//! partial command, which is reported as [`RestartError::TerminalInjection`].
//!
//! Linux kernels built with `CONFIG_LEGACY_TIOCSTI=n` (or `dev.tty.legacy_tiocsti = 0`)
//! reject every byte with `EIO`.

use std::fs::File;
use std::os::fd::AsRawFd;
use std::path::Path;

use crate::error::RestartError;

nix::ioctl_write_ptr_bad!(tiocsti, libc::TIOCSTI, libc::c_char);

/// Simulates typed input on a terminal.
pub trait Inject: Send + Sync + 'static {
    /// Injects every byte of `line`, in order. `terminal` is relative to `/dev`.
    fn inject(&self, terminal: &str, line: &[u8]) -> Result<(), RestartError>;
}

/// `TIOCSTI` based injector.
#[derive(Clone, Copy, Debug, Default)]
pub struct TiocstiInjector;

impl Inject for TiocstiInjector {
    fn inject(&self, terminal: &str, line: &[u8]) -> Result<(), RestartError> {
        let path = Path::new("/dev").join(terminal);
        let tty = File::open(&path).map_err(|source| RestartError::TerminalOpen {
            terminal: terminal.to_string(),
            source,
        })?;

        for (offset, byte) in line.iter().enumerate() {
            let ch = *byte as libc::c_char;
            // SAFETY: `tty` is an open descriptor for the lifetime of the call and `ch`
            // outlives it; TIOCSTI only reads one byte through the pointer.
            unsafe { tiocsti(tty.as_raw_fd(), &ch) }.map_err(|errno| {
                RestartError::TerminalInjection {
                    terminal: terminal.to_string(),
                    offset,
                    errno,
                }
            })?;
        }
        tracing::debug!(terminal, bytes = line.len(), "line injected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_terminal_fails_before_injecting() {
        let err = TiocstiInjector
            .inject("procbeat-no-such-tty", b"echo hi\n")
            .unwrap_err();
        assert_eq!(err.as_label(), "restart_terminal_open");
    }

    #[test]
    fn non_terminal_device_rejects_first_byte() {
        // /dev/null opens fine but is not a tty, so the ioctl fails with ENOTTY.
        let err = TiocstiInjector.inject("null", b"ls\n").unwrap_err();
        match err {
            RestartError::TerminalInjection { offset, .. } => assert_eq!(offset, 0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
