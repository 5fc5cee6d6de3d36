//! Process identity: descriptors, resolution, liveness.
//!
//! ## Contents
//! - [`ProcessDescriptor`], [`Terminal`] the resolved identity of the target
//! - [`Resolver`] builds descriptors from an [`Inspect`](crate::Inspect) implementation
//! - [`Probe`], [`SignalProbe`] the single source of truth for "is the target alive"
//! - [`Select`] the interactive choice used by name lookup

mod descriptor;
mod probe;
mod resolver;
mod select;

pub use descriptor::{ProcessDescriptor, Terminal, NO_TERMINAL};
pub use probe::{Liveness, Probe, SignalProbe};
pub use resolver::{candidates, leading_pid, split_arguments, Resolver};
pub use select::{FixedSelection, PromptSelector, Select};

#[cfg(test)]
pub(crate) use resolver::tests::{wait_for_exec, FakeInspector};
