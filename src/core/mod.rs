//! Runtime core: configuration, orchestration and lifecycle.
//!
//! The public API from this module is [`Supervisor`] (with its [`SupervisorBuilder`]),
//! the run outcome [`Exit`] and the [`Config`].
//!
//! Internal modules:
//! - [`poller`]: probes the current pid at a fixed interval and signals deaths;
//! - [`worker`]: runs the hook and the restart for each death signal;
//! - [`supervisor`]: wires poller, worker and notifier, handles shutdown;
//! - [`shutdown`]: OS termination signal handling.

mod builder;
mod config;
mod poller;
mod shutdown;
mod supervisor;
mod worker;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::{Exit, Supervisor};
