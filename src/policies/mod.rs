//! Restart, detach and rescan policies.
//!
//! ## Contents
//! - [`RestartPolicy`] restart the target on death, or stop after the hook
//! - [`DetachPolicy`]  session / process-group placement and terminal injection
//! - [`RescanPolicy`]  how long to look for the process an injected line started
//!
//! ## Quick wiring
//! ```text
//! Config { restart, detach, rescan, .. }
//!      └─► core::worker::RestartWorker uses restart after the hook
//!      └─► restart::Restarter uses detach to pick a strategy, rescan after injection
//! ```

mod detach;
mod rescan;
mod restart;

pub use detach::DetachPolicy;
pub use rescan::RescanPolicy;
pub use restart::RestartPolicy;
