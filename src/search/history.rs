//! The live search path.
//!
//! One entry per search unit currently being searched, root first. Each entry also owns the
//! transposition records attached to that position; they live exactly as long as the position
//! stays on the path.

use crate::core::{Bounds, PositionRecord};
use crate::search::stats::SearchStatistics;
use crate::search::transposition::{PathStep, TranspositionRecord, TranspositionSlots, MAX_LENGTH};
use crate::store::PositionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A position on the live path and the first move of the group that reached it.
pub struct PathEntry<M> {
    pub hash: u64,
    /// `None` at the root.
    pub via: Option<M>,
}

#[derive(Debug, Clone)]
pub struct History<M> {
    path: Vec<PathEntry<M>>,
    slots: Vec<TranspositionSlots<M>>,
}

impl<M> Default for History<M> {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            slots: Vec::new(),
        }
    }
}

impl<M: Copy + Eq> History<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hash: u64, via: Option<M>) {
        self.path.push(PathEntry { hash, via });
        self.slots.push(TranspositionSlots::default());
    }

    pub fn pop(&mut self) {
        self.path.pop();
        self.slots.pop();
    }

    /// Depth of the current position (root = 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    #[inline]
    pub fn path(&self) -> &[PathEntry<M>] {
        &self.path
    }

    /// Hash of the live parent of the current position.
    #[inline]
    pub fn parent_hash(&self) -> Option<u64> {
        let n = self.path.len();
        if n >= 2 {
            Some(self.path[n - 2].hash)
        } else {
            None
        }
    }

    #[inline]
    pub fn last_move(&self) -> Option<M> {
        self.path.last().and_then(|e| e.via)
    }

    /// Records attached to the current position.
    pub fn transpositions(&self) -> &TranspositionSlots<M> {
        &self.slots[self.slots.len() - 1]
    }

    /// The current position (`hash`, stored as `record`) was last reached through a different
    /// parent. Walks the stored-parent chain up to [`MAX_LENGTH`] steps looking for a position
    /// that is also on the live path, and attaches a [`TranspositionRecord`] there.
    ///
    /// Returns whether a record was attached.
    pub fn notify_common_ancestor<T: PositionStore<M>>(
        &mut self,
        store: &T,
        record: &PositionRecord<M>,
        hash: u64,
        stats: &mut SearchStatistics,
    ) -> bool {
        let Some(current) = self.path.len().checked_sub(1) else {
            return false;
        };

        let mut chain: Vec<PathStep<M>> = Vec::with_capacity(MAX_LENGTH);
        let mut parent = record.parent;
        let mut via = record.move_from_parent;

        for length in 1..=MAX_LENGTH {
            let (Some(p), Some(mv)) = (parent, via) else {
                return false;
            };
            chain.push(PathStep { hash: p, mv });

            if let Some(ancestor) = self.path[..current].iter().rposition(|e| e.hash == p) {
                // Unequal lengths put the descendant at different parities below the ancestor.
                if current - ancestor != length {
                    log::debug!(
                        "transposition of {hash:016x}: paths from depth {ancestor} differ in length"
                    );
                    return false;
                }
                let left: Option<Vec<PathStep<M>>> = (ancestor..current)
                    .map(|k| {
                        self.path[k + 1].via.map(|mv| PathStep {
                            hash: self.path[k].hash,
                            mv,
                        })
                    })
                    .collect();
                let Some(left) = left else {
                    return false;
                };
                chain.reverse();

                stats.transposition_lengths.add(length as u64);
                let attached =
                    self.slots[ancestor].add(TranspositionRecord::new(hash, left, chain));
                if attached {
                    log::debug!(
                        "transposition of {hash:016x}: common ancestor at depth {ancestor}, length {length}"
                    );
                }
                return attached;
            }

            let Some(up) = store.get(p) else {
                return false;
            };
            parent = up.parent;
            via = up.move_from_parent;
        }
        false
    }

    /// Applies the current position's transposition records to `bounds`.
    pub fn modify_bounds<T: PositionStore<M>>(
        &self,
        current_hash: u64,
        bounds: &mut Bounds,
        floor: u64,
        store: &T,
        stats: &mut SearchStatistics,
    ) -> u64 {
        self.transpositions()
            .modify_bounds(current_hash, bounds, floor, store, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bounds, ChildSet};
    use crate::store::MemoryStore;

    const R: u64 = 100;
    const A: u64 = 200;
    const B: u64 = 300;
    const X: u64 = 400;

    fn rec(
        bounds: Bounds,
        best: Option<u32>,
        parent: Option<u64>,
        via: Option<u32>,
    ) -> PositionRecord<u32> {
        PositionRecord {
            bounds,
            children: ChildSet::default(),
            best_move: best,
            work: 1,
            parent,
            move_from_parent: via,
        }
    }

    /// R -a-> A -x-> X stored; live path R -b-> B -y-> X.
    fn diamond() -> (MemoryStore<u32>, History<u32>) {
        let mut store = MemoryStore::new();
        store.put(R, rec(Bounds::new(3, 10), Some(1), None, None));
        store.put(A, rec(Bounds::new(5, 3), Some(11), Some(R), Some(1)));
        store.put(B, rec(Bounds::new(5, 3), Some(21), Some(R), Some(2)));
        store.put(X, rec(Bounds::new(3, 5), None, Some(A), Some(11)));

        let mut history = History::new();
        history.push(R, None);
        history.push(B, Some(2));
        history.push(X, Some(21));
        (store, history)
    }

    #[test]
    fn common_ancestor_gets_both_paths() {
        let (store, mut history) = diamond();
        let mut stats = SearchStatistics::default();
        let x = store.get(X).cloned().unwrap();

        assert!(history.notify_common_ancestor(&store, &x, X, &mut stats));
        assert_eq!(stats.transposition_lengths.count, 1);

        history.pop();
        history.pop();
        let slots = history.transpositions();
        assert_eq!(slots.len(), 1);
        let t = slots.iter().next().unwrap();
        assert_eq!(t.descendant(), X);
        assert_eq!(
            t.left(),
            &[PathStep { hash: R, mv: 2 }, PathStep { hash: B, mv: 21 }]
        );
        assert_eq!(
            t.right(),
            &[PathStep { hash: R, mv: 1 }, PathStep { hash: A, mv: 11 }]
        );
    }

    #[test]
    fn duplicate_detection_is_dropped() {
        let (store, mut history) = diamond();
        let mut stats = SearchStatistics::default();
        let x = store.get(X).cloned().unwrap();

        assert!(history.notify_common_ancestor(&store, &x, X, &mut stats));
        assert!(!history.notify_common_ancestor(&store, &x, X, &mut stats));
    }

    #[test]
    fn correction_removes_exactly_the_double_counted_delta() {
        let (store, mut history) = diamond();
        let mut stats = SearchStatistics::default();
        let x = store.get(X).cloned().unwrap();
        history.notify_common_ancestor(&store, &x, X, &mut stats);
        history.pop();
        history.pop();

        // Both A and B take their phi as the min over X's delta (5); R sums both.
        let uncorrected = Bounds::new(3, 5 + 5);
        let mut corrected = uncorrected;
        let applied = history.modify_bounds(R, &mut corrected, 5, &store, &mut stats);

        assert_eq!(applied, 1);
        assert_eq!(uncorrected.delta - corrected.delta, 5);
        assert_eq!(corrected.phi, uncorrected.phi);
        assert_eq!(stats.clamped_corrections, 0);
    }

    #[test]
    fn correction_stops_at_the_largest_child_phi() {
        let (store, mut history) = diamond();
        let mut stats = SearchStatistics::default();
        let x = store.get(X).cloned().unwrap();
        history.notify_common_ancestor(&store, &x, X, &mut stats);
        history.pop();
        history.pop();

        // A stale sibling keeps the sum at 9; removing X's 5 would undercut B's phi of 7.
        let mut bounds = Bounds::new(3, 9);
        let applied = history.modify_bounds(R, &mut bounds, 7, &store, &mut stats);

        assert_eq!(applied, 1);
        assert_eq!(bounds.delta, 7);
        assert_eq!(stats.clamped_corrections, 1);
    }

    #[test]
    fn stale_best_move_refuses_correction() {
        let (mut store, mut history) = diamond();
        let mut stats = SearchStatistics::default();
        let x = store.get(X).cloned().unwrap();
        history.notify_common_ancestor(&store, &x, X, &mut stats);
        history.pop();
        history.pop();

        store.put(B, rec(Bounds::new(4, 3), Some(22), Some(R), Some(2)));
        let mut bounds = Bounds::new(3, 10);
        assert_eq!(history.modify_bounds(R, &mut bounds, 5, &store, &mut stats), 0);
        assert_eq!(bounds.delta, 10);
    }

    #[test]
    fn solved_descendant_refuses_correction() {
        let (mut store, mut history) = diamond();
        let mut stats = SearchStatistics::default();
        let x = store.get(X).cloned().unwrap();
        history.notify_common_ancestor(&store, &x, X, &mut stats);
        history.pop();
        history.pop();

        store.put(X, rec(Bounds::winning(), None, Some(B), Some(21)));
        let mut bounds = Bounds::new(3, 10);
        assert_eq!(history.modify_bounds(R, &mut bounds, 1, &store, &mut stats), 0);
        assert_eq!(bounds.delta, 10);
    }

    #[test]
    fn paths_of_different_length_are_not_recorded() {
        let mut store = MemoryStore::new();
        store.put(R, rec(Bounds::new(3, 10), Some(1), None, None));
        store.put(X, rec(Bounds::new(3, 5), None, Some(R), Some(1)));

        let mut history = History::new();
        history.push(R, None);
        history.push(B, Some(2));
        history.push(X, Some(21));

        let mut stats = SearchStatistics::default();
        let x = store.get(X).cloned().unwrap();
        assert!(!history.notify_common_ancestor(&store, &x, X, &mut stats));
    }
}
