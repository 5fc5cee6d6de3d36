//! # Interactive candidate selection.
//!
//! Name lookup can match several processes. A [`Select`] implementation is shown the
//! candidate lines and returns the chosen index; the resolver validates the index.

use std::io::{self, BufRead, Write};

use crate::error::ResolveError;

/// Picks one of several process-table lines.
pub trait Select {
    /// Returns the index of the chosen candidate (may be negative or out of range;
    /// the caller rejects those).
    fn select(&self, candidates: &[String]) -> Result<i64, ResolveError>;
}

/// Prints a numbered list on stdout and reads the choice from stdin.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptSelector;

impl Select for PromptSelector {
    fn select(&self, candidates: &[String]) -> Result<i64, ResolveError> {
        let mut out = io::stdout().lock();
        let io_err = |e: io::Error| ResolveError::inspection("selection prompt", e);

        for (i, line) in candidates.iter().enumerate() {
            writeln!(out, "{i}: {line}").map_err(io_err)?;
        }
        writeln!(
            out,
            "\nWhich number above represents the correct process (enter the number):"
        )
        .map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer).map_err(io_err)?;
        // Unparseable input counts as "no valid choice".
        Ok(answer.trim().parse().unwrap_or(-1))
    }
}

/// Always returns the same index.
#[derive(Clone, Copy, Debug)]
pub struct FixedSelection(pub i64);

impl Select for FixedSelection {
    fn select(&self, _candidates: &[String]) -> Result<i64, ResolveError> {
        Ok(self.0)
    }
}
