//! # Supervisor: watches one target, runs hooks, restarts it.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the liveness
//! [`Probe`] and the [`Restart`] implementation. It wires three workers:
//!
//! ```text
//! run(target):
//!   probe(target) ── Dead ──► Err(NotRunning)
//!        │ Alive
//!   publish(TargetResolved)
//!
//!   Poller ── deaths (mpsc, 1 slot) ──► RestartWorker ── publish ──► Bus
//!     ▲                                     │                          │
//!     └──── current pid (watch) ◄───────────┘                          ▼
//!                                                       notifier ──► SubscriberSet
//!
//! Ends when:
//!   - RestartWorker returns (restart disabled → Exit::RestartDisabled, fatal error → Err)
//!   - SIGINT/SIGTERM/SIGQUIT → publish(ShutdownRequested) → Exit::Interrupted
//! then: cancel poller ─► stop worker ─► drain notifier ─► SubscriberSet::shutdown()
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use procbeat::{Config, LogWriter, Resolver, Subscribe, Supervisor, SystemInspector};
//! use nix::unistd::Pid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::new(Arc::new(SystemInspector::default()));
//!     let target = resolver.resolve_by_pid(Pid::from_raw(4242))?;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = Supervisor::new(Config::default(), subs);
//!     let exit = sup.run(target).await?;
//!     println!("{exit:?}");
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::io;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::builder::SupervisorBuilder;
use super::poller::Poller;
use super::shutdown;
use super::worker::RestartWorker;
use crate::core::Config;
use crate::error::WatchError;
use crate::events::{Bus, Event, EventKind};
use crate::process::{Probe, ProcessDescriptor};
use crate::restart::Restart;
use crate::subscribers::{Subscribe, SubscriberSet};

/// How a supervising run ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// The target died, the hook ran and restarting is disabled.
    RestartDisabled,
    /// A termination signal (or the caller's shutdown future) stopped the run.
    Interrupted,
}

/// Supervises a single target process.
pub struct Supervisor {
    pub(super) cfg: Config,
    pub(super) bus: Bus,
    pub(super) subs: SubscriberSet,
    pub(super) prober: Arc<dyn Probe>,
    pub(super) restarter: Arc<dyn Restart>,
}

impl Supervisor {
    /// Creates a supervisor with the default probe, inspector and restarter.
    ///
    /// Must be called inside a Tokio runtime (subscriber workers are spawned here).
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self::builder(cfg).with_subscribers(subscribers).build()
    }

    /// Returns a builder for replacing individual collaborators.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// Supervises `target` until restarting is disabled, a fatal error occurs or an OS
    /// termination signal arrives.
    pub async fn run(self, target: ProcessDescriptor) -> Result<Exit, WatchError> {
        self.drive(target, shutdown::wait_for_shutdown_signal()).await
    }

    /// Like [`run`](Self::run), but stops when `shutdown` completes instead of on OS signals.
    pub async fn drive<F>(self, target: ProcessDescriptor, shutdown: F) -> Result<Exit, WatchError>
    where
        F: Future<Output = io::Result<()>>,
    {
        let Self {
            cfg,
            bus,
            subs,
            prober,
            restarter,
        } = self;

        if !prober.probe(target.pid).is_alive() {
            subs.shutdown().await;
            return Err(WatchError::NotRunning { pid: target.pid });
        }

        let token = CancellationToken::new();
        let notifier = notifier(bus.subscribe(), subs, token.clone());
        bus.publish(Event::new(EventKind::TargetResolved).with_descriptor(&target));

        let in_flight = Arc::new(AtomicUsize::new(0));
        let (pid_tx, pid_rx) = watch::channel(target.pid);
        let (death_tx, death_rx) = mpsc::channel(1);

        let poller = Poller {
            interval: cfg.interval_clamped(),
            prober,
            in_flight: Arc::clone(&in_flight),
            current: pid_rx,
            deaths: death_tx,
            bus: bus.clone(),
        };
        let poller = tokio::spawn(poller.run(token.child_token()));

        let worker = RestartWorker {
            hook: cfg.hook.clone(),
            restart: cfg.restart,
            streams: cfg.streams,
            restarter,
            in_flight,
            bus: bus.clone(),
        };
        let mut worker = tokio::spawn(worker.run(death_rx, target, pid_tx));

        let outcome = tokio::select! {
            res = &mut worker => match res {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => Ok(Exit::Interrupted),
            },
            sig = shutdown => match sig {
                Ok(()) => {
                    bus.publish(Event::new(EventKind::ShutdownRequested));
                    Ok(Exit::Interrupted)
                }
                Err(e) => Err(WatchError::Signal(e)),
            },
        };

        token.cancel();
        let _ = poller.await;
        if !worker.is_finished() {
            worker.abort();
        }
        let _ = notifier.await;
        outcome
    }
}

/// Forwards bus events to the subscriber set until cancelled, then drains and flushes it.
fn notifier(
    mut rx: tokio::sync::broadcast::Receiver<Event>,
    subs: SubscriberSet,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "notifier lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }
        while let Ok(ev) = rx.try_recv() {
            subs.emit(&ev);
        }
        subs.shutdown().await;
    })
}
