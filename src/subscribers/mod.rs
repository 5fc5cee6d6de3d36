//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and the
//! built-in [`LogWriter`] for events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Poller / RestartWorker ── publish(Event) ──► Bus ──► notifier ──► SubscriberSet::emit
//!                                                                          │
//!                                                              ┌───────────┼──────────┐
//!                                                              ▼           ▼          ▼
//!                                                          LogWriter     Pager      Custom
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
