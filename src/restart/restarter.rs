//! # Restarter: runs the chosen strategy and reacquires the new identity.
//!
//! ## Terminal injection
//! ```text
//! full_command_line() + "\n" ──► Inject (byte by byte)
//!          └─► rescan table for "<tty> … <command line>" (RescanPolicy)
//!                 └─► resolve_by_pid(new pid)   (fresh descriptor, terminal included)
//! ```
//! Runs on the blocking pool: the ioctls, the table scans and the pauses between them
//! are all synchronous.
//!
//! ## Direct re-spawn
//! ```text
//! usable_dir(working_dir) ──► Command(executable, arguments)
//!                               + streams + placement (setsid / setpgid)
//!                               └─► spawn → descriptor.pid = child pid
//!                                      └─► terminal of the child (inspector)
//! ```
//! The child handle is returned with the descriptor so the caller owns reaping.
//! The terminal is looked up again for the new pid; a `setsid` child has none.

use std::io;
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use nix::unistd::{setpgid, setsid, Pid};
use tokio::process::{Child, Command};

use super::{usable_dir, Inject, Placement, Strategy, Streams, TiocstiInjector};
use crate::core::Config;
use crate::error::{ResolveError, RestartError};
use crate::inspect::Inspect;
use crate::policies::{DetachPolicy, RescanPolicy};
use crate::process::{ProcessDescriptor, Resolver};

/// Outcome of a successful restart.
#[derive(Debug)]
pub struct Restarted {
    /// Identity of the replacement.
    pub descriptor: ProcessDescriptor,
    /// Strategy that produced it.
    pub strategy: Strategy,
    /// Child handle when the replacement is our own child (direct re-spawn).
    pub child: Option<Child>,
}

/// Brings a dead target back.
#[async_trait]
pub trait Restart: Send + Sync + 'static {
    /// Restarts `target`, returning the identity of the replacement.
    async fn restart(&self, target: &ProcessDescriptor) -> Result<Restarted, RestartError>;
}

/// Default [`Restart`] implementation: strategy selection, injection, re-spawn.
pub struct Restarter {
    resolver: Resolver,
    injector: Arc<dyn Inject>,
    detach: DetachPolicy,
    rescan: RescanPolicy,
    streams: Streams,
    elevated: bool,
}

impl Restarter {
    /// Creates a restarter using the configuration's detach, rescan and stream settings.
    pub fn new(inspector: Arc<dyn Inspect>, cfg: &Config) -> Self {
        Self {
            resolver: Resolver::new(inspector),
            injector: Arc::new(TiocstiInjector),
            detach: cfg.detach,
            rescan: cfg.rescan,
            streams: cfg.streams,
            elevated: super::is_elevated(),
        }
    }

    /// Replaces the keystroke injector.
    pub fn with_injector(mut self, injector: Arc<dyn Inject>) -> Self {
        self.injector = injector;
        self
    }

    /// Overrides the elevation check made at construction.
    pub fn with_elevation(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }

    async fn inject(&self, target: &ProcessDescriptor) -> Result<Restarted, RestartError> {
        let resolver = self.resolver.clone();
        let injector = Arc::clone(&self.injector);
        let rescan = self.rescan;
        let target = target.clone();

        blocking("terminal injection", move || {
            inject_and_reacquire(&resolver, injector.as_ref(), rescan, &target)
        })
        .await
    }

    async fn respawn(
        &self,
        target: &ProcessDescriptor,
        placement: Placement,
    ) -> Result<Restarted, RestartError> {
        let dir = usable_dir(target.working_dir.as_deref())?;

        let mut cmd = Command::new(&target.executable);
        cmd.args(&target.arguments);
        self.streams.apply(&mut cmd);
        if let Some(dir) = &dir {
            cmd.current_dir(dir);
        }
        match placement {
            // SAFETY: setsid/setpgid are async-signal-safe and touch no shared state.
            Placement::NewSession => unsafe {
                cmd.pre_exec(|| setsid().map(drop).map_err(io::Error::from));
            },
            Placement::NewProcessGroup => unsafe {
                cmd.pre_exec(|| {
                    setpgid(Pid::from_raw(0), Pid::from_raw(0)).map_err(io::Error::from)
                });
            },
            Placement::Inherit => {}
        }

        let spawn_err = |source: io::Error| RestartError::Spawn {
            command: target.full_command_line(),
            source,
        };
        let mut child = cmd.spawn().map_err(spawn_err)?;
        let raw = child
            .id()
            .ok_or_else(|| spawn_err(io::Error::other("child exited before its pid was read")))?;
        let pid = Pid::from_raw(raw as i32);

        let resolver = self.resolver.clone();
        let looked_up = blocking("terminal lookup", move || Ok(resolver.terminal(pid)?)).await;
        let terminal = match looked_up {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = child.start_kill();
                return Err(e);
            }
        };

        let descriptor = ProcessDescriptor {
            pid,
            executable: target.executable.clone(),
            arguments: target.arguments.clone(),
            working_dir: dir.or_else(|| std::env::current_dir().ok()),
            terminal,
        };
        Ok(Restarted {
            descriptor,
            strategy: Strategy::Respawn(placement),
            child: Some(child),
        })
    }
}

#[async_trait]
impl Restart for Restarter {
    async fn restart(&self, target: &ProcessDescriptor) -> Result<Restarted, RestartError> {
        match Strategy::choose(target, self.detach, self.elevated)? {
            Strategy::TerminalInjection => self.inject(target).await,
            Strategy::Respawn(placement) => self.respawn(target, placement).await,
        }
    }
}

/// Runs `f` on the blocking pool, re-raising its panics.
async fn blocking<T, F>(what: &str, f: F) -> Result<T, RestartError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, RestartError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(RestartError::Spawn {
            command: what.into(),
            source: io::Error::other(e),
        }),
    }
}

fn inject_and_reacquire(
    resolver: &Resolver,
    injector: &dyn Inject,
    rescan: RescanPolicy,
    target: &ProcessDescriptor,
) -> Result<Restarted, RestartError> {
    let device = target
        .terminal
        .device()
        .ok_or_else(|| ResolveError::not_found(format!("terminal of {}", target.pid)))?;
    let line = target.full_command_line();
    let mut typed = line.clone().into_bytes();
    typed.push(b'\n');

    injector.inject(device, &typed)?;

    let exclude = [target.pid, Pid::this()];
    let attempts = rescan.attempts_clamped();
    let mut attempt = 1;
    loop {
        match resolver.find_injected(&target.terminal, &line, &exclude) {
            Ok(pid) => {
                let descriptor = resolver.resolve_by_pid(pid)?;
                return Ok(Restarted {
                    descriptor,
                    strategy: Strategy::TerminalInjection,
                    child: None,
                });
            }
            Err(e @ ResolveError::NotFound { .. }) if attempt < attempts => {
                tracing::debug!(attempt, error = %e, "injected command not in table yet");
                attempt += 1;
                thread::sleep(rescan.delay);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::SystemInspector;
    use crate::process::{FakeInspector, Liveness, Probe, SignalProbe, Terminal};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records injected bytes; optionally rejects the byte at `fail_at`.
    #[derive(Default)]
    struct RecordingInjector {
        typed: Mutex<Vec<u8>>,
        fail_at: Option<usize>,
    }

    impl Inject for RecordingInjector {
        fn inject(&self, terminal: &str, line: &[u8]) -> Result<(), RestartError> {
            for (offset, byte) in line.iter().enumerate() {
                if Some(offset) == self.fail_at {
                    return Err(RestartError::TerminalInjection {
                        terminal: terminal.to_string(),
                        offset,
                        errno: nix::errno::Errno::EIO,
                    });
                }
                self.typed.lock().unwrap().push(*byte);
            }
            Ok(())
        }
    }

    fn cfg(detach: DetachPolicy) -> Config {
        Config {
            detach,
            streams: Streams::Null,
            rescan: RescanPolicy {
                attempts: 2,
                delay: Duration::from_millis(1),
            },
            ..Config::default()
        }
    }

    fn vim_on_pts3() -> ProcessDescriptor {
        ProcessDescriptor {
            pid: Pid::from_raw(500),
            executable: "vim".into(),
            arguments: vec!["main.go".into()],
            working_dir: None,
            terminal: Terminal::parse("pts/3"),
        }
    }

    #[tokio::test]
    async fn injection_types_line_and_reacquires_pid() {
        let fake = FakeInspector::default()
            .with(500, "vim", "vim main.go", "pts/3")
            .with(501, "vim", "vim main.go", "pts/3");
        let injector = Arc::new(RecordingInjector::default());
        let restarter = Restarter::new(Arc::new(fake), &cfg(DetachPolicy::default()))
            .with_injector(injector.clone())
            .with_elevation(true);

        let restarted = restarter.restart(&vim_on_pts3()).await.unwrap();
        assert_eq!(restarted.strategy, Strategy::TerminalInjection);
        assert_eq!(restarted.descriptor.pid, Pid::from_raw(501));
        assert_eq!(restarted.descriptor.terminal, Terminal::parse("pts/3"));
        assert!(restarted.child.is_none());
        assert_eq!(injector.typed.lock().unwrap().as_slice(), b"vim main.go\n");
    }

    #[tokio::test]
    async fn rejected_keystroke_aborts_restart() {
        let fake = FakeInspector::default().with(501, "vim", "vim main.go", "pts/3");
        let injector = Arc::new(RecordingInjector {
            fail_at: Some(3),
            ..Default::default()
        });
        let restarter = Restarter::new(Arc::new(fake), &cfg(DetachPolicy::default()))
            .with_injector(injector.clone())
            .with_elevation(true);

        let err = restarter.restart(&vim_on_pts3()).await.unwrap_err();
        assert!(matches!(
            err,
            RestartError::TerminalInjection { offset: 3, .. }
        ));
        assert_eq!(injector.typed.lock().unwrap().as_slice(), b"vim");
    }

    #[tokio::test]
    async fn injection_without_root_is_refused() {
        let injector = Arc::new(RecordingInjector::default());
        let restarter = Restarter::new(
            Arc::new(FakeInspector::default()),
            &cfg(DetachPolicy::default()),
        )
        .with_injector(injector.clone())
        .with_elevation(false);

        let err = restarter.restart(&vim_on_pts3()).await.unwrap_err();
        assert_eq!(err.as_label(), "restart_permission");
        assert!(injector.typed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_process_never_showing_up_is_not_found() {
        let fake = FakeInspector::default().with(500, "vim", "vim main.go", "pts/3");
        let restarter = Restarter::new(Arc::new(fake), &cfg(DetachPolicy::default()))
            .with_injector(Arc::new(RecordingInjector::default()))
            .with_elevation(true);

        let err = restarter.restart(&vim_on_pts3()).await.unwrap_err();
        assert_eq!(err.as_label(), "resolve_not_found");
    }

    #[tokio::test]
    async fn respawn_detached_target() {
        let dir = tempfile::tempdir().unwrap();
        let old = ProcessDescriptor {
            pid: Pid::from_raw(i32::MAX - 1),
            executable: "sleep".into(),
            arguments: vec!["5".into()],
            working_dir: Some(dir.path().to_path_buf()),
            terminal: Terminal::Detached,
        };
        let restarter = Restarter::new(
            Arc::new(SystemInspector::default()),
            &cfg(DetachPolicy::default()),
        );

        let mut restarted = restarter.restart(&old).await.unwrap();
        assert_eq!(
            restarted.strategy,
            Strategy::Respawn(Placement::NewSession)
        );
        let new = &restarted.descriptor;
        assert_ne!(new.pid, old.pid);
        assert_eq!(SignalProbe.probe(new.pid), Liveness::Alive);
        assert_eq!(new.full_command_line(), "sleep 5");
        assert_eq!(new.working_dir.as_deref(), Some(dir.path()));
        assert_eq!(new.terminal, Terminal::Detached);

        #[cfg(target_os = "linux")]
        {
            let cwd = std::fs::read_link(format!("/proc/{}/cwd", new.pid)).unwrap();
            assert_eq!(cwd.canonicalize().unwrap(), dir.path().canonicalize().unwrap());
            // New session: the child leads its own session.
            assert_eq!(nix::unistd::getsid(Some(new.pid)).unwrap(), new.pid);
        }

        let mut child = restarted.child.take().unwrap();
        child.kill().await.unwrap();
    }

    #[tokio::test]
    async fn respawned_replacement_reports_its_own_terminal() {
        let old = ProcessDescriptor {
            pid: Pid::from_raw(i32::MAX - 2),
            executable: "sleep".into(),
            arguments: vec!["5".into()],
            working_dir: None,
            terminal: Terminal::parse("pts/99"),
        };
        let no_inject = DetachPolicy {
            enabled: true,
            inject: false,
        };
        let restarter = Restarter::new(Arc::new(SystemInspector::default()), &cfg(no_inject));

        let mut restarted = restarter.restart(&old).await.unwrap();
        assert_eq!(
            restarted.strategy,
            Strategy::Respawn(Placement::NewProcessGroup)
        );
        let new = &restarted.descriptor;
        assert_ne!(new.terminal, old.terminal);
        assert_eq!(
            new.terminal,
            SystemInspector::default().terminal(new.pid).unwrap()
        );

        let mut child = restarted.child.take().unwrap();
        child.kill().await.unwrap();
    }

    #[tokio::test]
    async fn respawn_missing_executable_is_spawn_error() {
        let old = ProcessDescriptor {
            pid: Pid::from_raw(7),
            executable: "/nonexistent/procbeat-target".into(),
            arguments: vec![],
            working_dir: None,
            terminal: Terminal::Detached,
        };
        let restarter = Restarter::new(
            Arc::new(FakeInspector::default()),
            &cfg(DetachPolicy::attached()),
        );
        let err = restarter.restart(&old).await.unwrap_err();
        assert_eq!(err.as_label(), "restart_spawn");
    }
}
