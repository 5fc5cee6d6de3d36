//! # RestartWorker: one hook + restart cycle per death signal.
//!
//! ```text
//! deaths.recv() ──► in_flight += 1
//!                     ├─► hook (if any)          non-zero exit ──► fatal
//!                     ├─► restart policy Never   ──► RestartDisabled, run ends
//!                     ├─► Restart::restart       error ──► fatal
//!                     ├─► current.send(new pid), publish Restarted
//!                     └─► reaper task (re-spawned children only)
//!                   drain stale signals
//!                   in_flight -= 1
//! ```
//!
//! When the run ends (restart disabled or fatal error) the gate stays closed.
//!
//! A re-spawned replacement is supervised from the moment it starts: the reaper
//! collects its exit status so the poller sees it die instead of a zombie.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nix::unistd::Pid;
use tokio::process::Child;
use tokio::sync::{mpsc, watch};

use super::supervisor::Exit;
use crate::error::WatchError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::RestartPolicy;
use crate::process::ProcessDescriptor;
use crate::restart::{HookCommand, Restart, Restarted, Streams};

enum Step {
    Supervising,
    Finished,
}

pub(crate) struct RestartWorker {
    pub(crate) hook: Option<HookCommand>,
    pub(crate) restart: RestartPolicy,
    pub(crate) streams: Streams,
    pub(crate) restarter: Arc<dyn Restart>,
    pub(crate) in_flight: Arc<AtomicUsize>,
    pub(crate) bus: Bus,
}

impl RestartWorker {
    /// Consumes death signals until the run ends.
    ///
    /// Returns [`Exit::Interrupted`] when the poller goes away first.
    pub(crate) async fn run(
        self,
        mut deaths: mpsc::Receiver<Pid>,
        mut target: ProcessDescriptor,
        current: watch::Sender<Pid>,
    ) -> Result<Exit, WatchError> {
        while let Some(pid) = deaths.recv().await {
            if pid != target.pid {
                tracing::debug!(pid = pid.as_raw(), "ignoring signal for a replaced pid");
                continue;
            }
            self.in_flight.fetch_add(1, Ordering::AcqRel);
            match self.cycle(&mut target, &current).await {
                Ok(Step::Supervising) => {
                    while deaths.try_recv().is_ok() {}
                    self.in_flight.fetch_sub(1, Ordering::AcqRel);
                }
                Ok(Step::Finished) => return Ok(Exit::RestartDisabled),
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::RestartFailed)
                            .with_pid(pid)
                            .with_reason(e.to_string()),
                    );
                    return Err(e);
                }
            }
        }
        Ok(Exit::Interrupted)
    }

    async fn cycle(
        &self,
        target: &mut ProcessDescriptor,
        current: &watch::Sender<Pid>,
    ) -> Result<Step, WatchError> {
        if let Some(hook) = &self.hook {
            self.bus
                .publish(Event::new(EventKind::HookStarting).with_command(hook.as_str()));
            hook.run(self.streams).await?;
            self.bus
                .publish(Event::new(EventKind::HookFinished).with_command(hook.as_str()));
        }

        if !self.restart.restarts() {
            self.bus.publish(Event::new(EventKind::RestartDisabled));
            return Ok(Step::Finished);
        }

        let Restarted {
            descriptor,
            strategy,
            child,
        } = self.restarter.restart(target).await?;

        current.send_replace(descriptor.pid);
        self.bus.publish(
            Event::new(EventKind::Restarted)
                .with_descriptor(&descriptor)
                .with_strategy(strategy),
        );
        if let Some(child) = child {
            reap(child, descriptor.pid, self.bus.clone());
        }
        *target = descriptor;
        Ok(Step::Supervising)
    }
}

fn reap(mut child: Child, pid: Pid, bus: Bus) {
    tokio::spawn(async move {
        let status = match child.wait().await {
            Ok(status) => status.to_string(),
            Err(e) => format!("wait failed: {e}"),
        };
        tracing::debug!(pid = pid.as_raw(), %status, "replacement exited");
        bus.publish(
            Event::new(EventKind::ReplacementExited)
                .with_pid(pid)
                .with_reason(status),
        );
    });
}
