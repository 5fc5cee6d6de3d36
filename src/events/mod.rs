//! Supervisor events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to publish
//! notifications from the poller and the restart worker.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` (target resolved, shutdown), the poller (death detected),
//!   the restart worker (hook, restart, replacement exit), `SubscriberSet` workers.
//! - **Consumers**: the supervisor's notifier task, which fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
