//! Bounds correction for transpositions.
//!
//! When one descendant is reachable from an ancestor along two paths, its bound can be summed
//! into the ancestor's `delta` twice. A [`TranspositionRecord`] remembers both paths (as
//! `(hash, move)` steps starting at the ancestor) and, each time the ancestor aggregates its
//! children, removes the duplicate contribution if it is still provably there.
//!
//! Only `delta` is corrected: `phi` is a minimum over child deltas, so any descendant is counted
//! in it at most once. The duplicate is provably present only if, on both paths, every node
//! where a minimum is taken (odd distance from the ancestor) still has the path's move recorded
//! as its best move. Any failed check means "no correction this round", which can only leave the
//! bound too large, never too small.

use crate::core::Bounds;
use crate::search::stats::SearchStatistics;
use crate::store::PositionStore;

/// Longest path (in search units) recorded between ancestor and descendant.
pub const MAX_LENGTH: usize = 4;

/// Most records kept per ancestor.
pub const MAX_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A position on a recorded path and the move played from it.
pub struct PathStep<M> {
    pub hash: u64,
    pub mv: M,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Two equally long paths from one ancestor to one shared descendant.
pub struct TranspositionRecord<M> {
    descendant: u64,
    left: Vec<PathStep<M>>,
    right: Vec<PathStep<M>>,
}

impl<M: Copy + Eq> TranspositionRecord<M> {
    pub fn new(descendant: u64, left: Vec<PathStep<M>>, right: Vec<PathStep<M>>) -> Self {
        debug_assert!(!left.is_empty() && left.len() == right.len());
        debug_assert_eq!(left[0].hash, right[0].hash);
        Self {
            descendant,
            left,
            right,
        }
    }

    #[inline]
    pub fn descendant(&self) -> u64 {
        self.descendant
    }

    #[inline]
    pub fn ancestor(&self) -> u64 {
        self.left[0].hash
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// The live path, from the ancestor down.
    pub fn left(&self) -> &[PathStep<M>] {
        &self.left
    }

    /// The descendant's stored-parent chain, from the ancestor down.
    pub fn right(&self) -> &[PathStep<M>] {
        &self.right
    }

    /// Amount to remove from the ancestor's delta, or `None` if the duplicate is not provably
    /// present right now.
    pub fn correction<T: PositionStore<M>>(&self, store: &T) -> Option<u64> {
        let descendant = store.get(self.descendant)?;
        if descendant.is_solved() {
            return None;
        }
        if !is_min_path(store, &self.left) || !is_min_path(store, &self.right) {
            return None;
        }
        // Odd distance: the descendant sits at a child level of a sum, contributing its phi.
        Some(if self.len() % 2 == 1 {
            descendant.bounds.phi
        } else {
            descendant.bounds.delta
        })
    }
}

/// Every node at odd distance from the ancestor must record the path's move as its best move.
///
/// Step 0 (the ancestor) is skipped: it is a sum level, and it may not be stored yet on its
/// first visit.
fn is_min_path<M: Copy + Eq, T: PositionStore<M>>(store: &T, steps: &[PathStep<M>]) -> bool {
    for (i, step) in steps.iter().enumerate().skip(1) {
        let Some(record) = store.get(step.hash) else {
            return false;
        };
        if i % 2 == 1 && record.best_move != Some(step.mv) {
            return false;
        }
    }
    true
}

#[derive(Debug, Clone)]
/// Records attached to one ancestor on the live path.
pub struct TranspositionSlots<M> {
    records: Vec<TranspositionRecord<M>>,
}

impl<M> Default for TranspositionSlots<M> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<M: Copy + Eq> TranspositionSlots<M> {
    /// Attaches `record` unless the slots are full or already track its descendant.
    pub fn add(&mut self, record: TranspositionRecord<M>) -> bool {
        if self.records.len() >= MAX_SLOTS {
            return false;
        }
        if self
            .records
            .iter()
            .any(|r| r.descendant == record.descendant)
        {
            return false;
        }
        self.records.push(record);
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranspositionRecord<M>> + '_ {
        self.records.iter()
    }

    /// Applies every valid record to `bounds.delta` and returns how many applied.
    ///
    /// `floor` is the largest child phi: the corrected delta never drops below it (nor below 1).
    /// A correction stopped by the floor removes less than `amount` and is counted in
    /// [`SearchStatistics::clamped_corrections`].
    pub fn modify_bounds<T: PositionStore<M>>(
        &self,
        current_hash: u64,
        bounds: &mut Bounds,
        floor: u64,
        store: &T,
        stats: &mut SearchStatistics,
    ) -> u64 {
        if self.records.is_empty() || bounds.is_solved() {
            return 0;
        }
        stats.slots.add(self.records.len() as u64);

        let mut applied = 0;
        for record in &self.records {
            debug_assert_eq!(record.ancestor(), current_hash);
            let Some(amount) = record.correction(store) else {
                continue;
            };
            let before = bounds.delta;
            let exact = bounds.delta.saturating_sub(amount);
            bounds.delta = exact.max(floor).max(1);
            if bounds.delta != exact {
                stats.clamped_corrections += 1;
                log::trace!(
                    "bounds correction at {current_hash:016x}: delta {before} - {amount} clamped to {} (descendant {:016x})",
                    bounds.delta,
                    record.descendant
                );
            } else {
                log::trace!(
                    "bounds correction at {current_hash:016x}: delta {before} -> {} (descendant {:016x})",
                    bounds.delta,
                    record.descendant
                );
            }
            applied += 1;
        }
        applied
    }
}
