//! Restart path: hook command, strategy selection, injection, re-spawn.
//!
//! ## Contents
//! - [`HookCommand`] the command run once per detected death
//! - [`Strategy`], [`Placement`] terminal injection vs. direct re-spawn
//! - [`Restart`], [`Restarter`] runs the strategy and reacquires the new identity
//! - [`Inject`], [`TiocstiInjector`] simulated keystrokes on a terminal
//! - [`Streams`] stdio wiring of started processes
//!
//! ## Flow
//! ```text
//! RestartWorker ──► HookCommand::run ──► RestartPolicy? ──► Restart::restart
//!                                                              ├─ Strategy::choose
//!                                                              ├─ inject + rescan
//!                                                              └─ respawn
//! ```

mod hook;
mod inject;
mod privilege;
mod restarter;
mod strategy;
mod streams;
mod workdir;

pub use hook::HookCommand;
pub use inject::{Inject, TiocstiInjector};
pub use privilege::is_elevated;
pub use restarter::{Restart, Restarted, Restarter};
pub use strategy::{Placement, Strategy};
pub use streams::Streams;

pub(crate) use workdir::usable_dir;
