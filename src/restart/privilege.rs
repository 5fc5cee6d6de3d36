//! Elevation check for terminal injection.

use nix::unistd::{getegid, geteuid};

/// True when both the effective user and the effective group are root.
pub fn is_elevated() -> bool {
    geteuid().is_root() && getegid().as_raw() == 0
}
