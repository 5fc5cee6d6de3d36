//! # procbeat
//!
//! **procbeat** is a process-level watchdog for Unix.
//!
//! It attaches to an already running process (by pid, or by a name resolved
//! interactively), polls its liveness at a fixed interval and, when it dies, runs an
//! optional hook command and restarts it the way it was originally started: by
//! replaying the command line into its controlling terminal, or by re-spawning it
//! in its original working directory.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   --pid / --name ──► Resolver (Inspect: /proc or ps+lsof) ──► ProcessDescriptor
//!                                                                     │
//! ┌───────────────────────────────────────────────────────────────────▼─────┐
//! │  Supervisor                                                             │
//! │  - Poller        (Probe every interval, gated by in_flight)             │
//! │  - RestartWorker (hook, RestartPolicy, Restart::restart)                │
//! │  - Bus + SubscriberSet (LogWriter, custom subscribers)                  │
//! └──────┬──────────────────────────┬──────────────────────────┬────────────┘
//!        │ death signal (1 slot)    │ new pid (watch)          │ events
//!        ▼                          ▼                          ▼
//!   RestartWorker               Poller                 notifier ─► subscribers
//! ```
//!
//! ### Restart cycle
//! ```text
//! probe(pid) == Dead
//!   ├─► in_flight += 1
//!   ├─► hook (non-zero exit ─► fatal)
//!   ├─► RestartPolicy::Never ─► Exit::RestartDisabled
//!   ├─► Strategy::choose(descriptor, DetachPolicy, elevated)
//!   │      ├─ TerminalInjection ─► TIOCSTI per byte ─► rescan table ─► new pid
//!   │      └─ Respawn(placement) ─► spawn in working dir ─► child pid (+ reaper)
//!   ├─► publish Restarted, replace descriptor
//!   └─► in_flight -= 1
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                          |
//! |-----------------|----------------------------------------------------------|---------------------------------------------|
//! | **Resolution**  | Build a descriptor from the process table.               | [`Resolver`], [`Inspect`], [`Select`]       |
//! | **Liveness**    | Non-destructive existence probe.                         | [`Probe`], [`SignalProbe`]                  |
//! | **Restart**     | Terminal injection or direct re-spawn.                   | [`Restart`], [`Restarter`], [`Strategy`]    |
//! | **Policies**    | Restart on death, detach, rescan cadence.                | [`RestartPolicy`], [`DetachPolicy`]         |
//! | **Events**      | Status lines and custom notification sinks.              | [`Subscribe`], [`LogWriter`], [`Event`]     |
//! | **Errors**      | Typed errors for resolution, restart and the run.        | [`ResolveError`], [`RestartError`], [`WatchError`] |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use nix::unistd::Pid;
//! use procbeat::{Config, HookCommand, LogWriter, Resolver, Subscribe, Supervisor, SystemInspector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.interval = Duration::from_millis(250);
//!     cfg.hook = HookCommand::parse("logger target died");
//!
//!     let resolver = Resolver::new(Arc::new(SystemInspector::default()));
//!     let target = resolver.resolve_by_pid(Pid::from_raw(4242))?;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let exit = Supervisor::builder(cfg)
//!         .with_subscribers(subs)
//!         .build()
//!         .run(target)
//!         .await?;
//!     println!("{exit:?}");
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod inspect;
mod policies;
mod process;
mod restart;
mod subscribers;

pub use crate::core::{wait_for_shutdown_signal, Config, Exit, Supervisor, SupervisorBuilder};
pub use error::{ResolveError, RestartError, WatchError};
pub use events::{Bus, Event, EventKind};
#[cfg(target_os = "linux")]
pub use inspect::ProcfsInspector;
pub use inspect::{Inspect, PsInspector, SystemInspector};
pub use policies::{DetachPolicy, RescanPolicy, RestartPolicy};
pub use process::{
    candidates, leading_pid, split_arguments, FixedSelection, Liveness, Probe,
    ProcessDescriptor, PromptSelector, Resolver, Select, SignalProbe, Terminal, NO_TERMINAL,
};
pub use restart::{
    is_elevated, HookCommand, Inject, Placement, Restart, Restarted, Restarter, Strategy,
    Streams, TiocstiInjector,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
