//! Notifications for proven positions.

use std::fmt;

use crate::core::PositionRecord;
use crate::search::history::PathEntry;

/// Called once each time a position is proven, descendants before ancestors.
///
/// `path` runs from the root to the proven position (its last entry). Listeners observe the
/// search; they cannot change it, but may hold an [`AbortHandle`](crate::search::AbortHandle)
/// to stop it.
pub trait SolveListener<M> {
    fn state_solved(&mut self, path: &[PathEntry<M>], record: &PositionRecord<M>);
}

#[derive(Debug, Clone, Copy, Default)]
/// Logs every proven position at `debug` level.
pub struct LogListener;

impl<M: fmt::Debug> SolveListener<M> for LogListener {
    fn state_solved(&mut self, path: &[PathEntry<M>], record: &PositionRecord<M>) {
        let Some(entry) = path.last() else {
            return;
        };
        let verdict = if record.bounds.is_winning() { "win" } else { "loss" };
        log::debug!(
            "solved {:016x} at depth {} via {:?}: {verdict} for the side to move (best {:?}, work {})",
            entry.hash,
            path.len() - 1,
            entry.via,
            record.best_move,
            record.work
        );
    }
}
