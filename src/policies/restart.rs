//! # What to do when the target dies.
//!
//! [`RestartPolicy`] is consulted once per death episode, after the hook command ran.
//!
//! ```text
//! RestartPolicy::OnDeath  → run the restart strategy, keep supervising (default)
//! RestartPolicy::Never    → hook only, then end the run cleanly (exit code 0)
//! ```

/// Policy controlling whether a dead target is started again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Run the hook (if any), then stop supervising.
    Never,
    /// Restart the target every time it dies (default).
    #[default]
    OnDeath,
}

impl RestartPolicy {
    /// `true` → [`RestartPolicy::OnDeath`], `false` → [`RestartPolicy::Never`].
    pub fn from_flag(restart: bool) -> Self {
        if restart {
            RestartPolicy::OnDeath
        } else {
            RestartPolicy::Never
        }
    }

    #[inline]
    pub fn restarts(self) -> bool {
        matches!(self, RestartPolicy::OnDeath)
    }
}
