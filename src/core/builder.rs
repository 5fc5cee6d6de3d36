use std::sync::Arc;

use super::supervisor::Supervisor;
use crate::core::Config;
use crate::events::Bus;
use crate::inspect::{Inspect, SystemInspector};
use crate::process::{Probe, SignalProbe};
use crate::restart::{Restart, Restarter};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Supervisor`] with replaced collaborators.
///
/// Anything not set falls back to the system implementation: [`SystemInspector`],
/// [`SignalProbe`] and a [`Restarter`] built from the configuration.
pub struct SupervisorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    inspector: Option<Arc<dyn Inspect>>,
    prober: Option<Arc<dyn Probe>>,
    restarter: Option<Arc<dyn Restart>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            inspector: None,
            prober: None,
            restarter: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive supervisor events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the process-table facility used by the default restarter.
    pub fn with_inspector(mut self, inspector: Arc<dyn Inspect>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    /// Sets the liveness probe.
    pub fn with_prober(mut self, prober: Arc<dyn Probe>) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Sets the restart implementation (the inspector is then unused).
    pub fn with_restarter(mut self, restarter: Arc<dyn Restart>) -> Self {
        self.restarter = Some(restarter);
        self
    }

    /// Builds the supervisor and starts the subscriber workers.
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());

        let restarter = match self.restarter {
            Some(restarter) => restarter,
            None => {
                let inspector = self
                    .inspector
                    .unwrap_or_else(|| Arc::new(SystemInspector::default()));
                Arc::new(Restarter::new(inspector, &self.cfg))
            }
        };
        let prober = self.prober.unwrap_or_else(|| Arc::new(SignalProbe));

        Supervisor {
            cfg: self.cfg,
            bus,
            subs,
            prober,
            restarter,
        }
    }
}
