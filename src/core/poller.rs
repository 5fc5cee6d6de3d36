//! # Poller: the only place liveness is checked.
//!
//! ```text
//! every interval:
//!   in_flight != 0 ? ──yes──► skip (a cycle is underway)
//!        │ no
//!   probe(current pid) ──Alive──► skip
//!        │ Dead
//!   deaths.try_reserve() ──Full──► skip (a signal is already pending)
//!        │ Ok
//!   publish(DeathDetected), send(pid)
//! ```
//!
//! The death channel has a single slot and the worker raises `in_flight` as soon as it
//! takes a signal, so one death episode yields one cycle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nix::unistd::Pid;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::process::Probe;

pub(crate) struct Poller {
    pub(crate) interval: Duration,
    pub(crate) prober: Arc<dyn Probe>,
    pub(crate) in_flight: Arc<AtomicUsize>,
    pub(crate) current: watch::Receiver<Pid>,
    pub(crate) deaths: mpsc::Sender<Pid>,
    pub(crate) bus: Bus,
}

impl Poller {
    /// Polls until cancelled or until the restart worker goes away.
    pub(crate) async fn run(self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if self.in_flight.load(Ordering::Acquire) != 0 {
                continue;
            }

            let pid = *self.current.borrow();
            if self.prober.probe(pid).is_alive() {
                continue;
            }
            match self.deaths.try_reserve() {
                Ok(permit) => {
                    tracing::debug!(pid = pid.as_raw(), "target failed liveness probe");
                    self.bus
                        .publish(Event::new(EventKind::DeathDetected).with_pid(pid));
                    permit.send(pid);
                }
                Err(mpsc::error::TrySendError::Full(())) => {}
                Err(mpsc::error::TrySendError::Closed(())) => break,
            }
        }
    }
}
