use crate::core::bounds::Bounds;

/// Ordered move groups of a position.
///
/// Each group is one search unit: a candidate move, optionally followed by a forced
/// continuation (reply, move, ...). Groups always have odd length so the position reached after
/// a group has the opponent to move, exactly as after a single move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSet<M> {
    groups: Vec<Vec<M>>,
}

impl<M> Default for ChildSet<M> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<M: Copy> ChildSet<M> {
    /// One singleton group per move, in the given order.
    pub fn from_moves(moves: impl IntoIterator<Item = M>) -> Self {
        Self {
            groups: moves.into_iter().map(|m| vec![m]).collect(),
        }
    }

    pub fn from_groups(groups: Vec<Vec<M>>) -> Self {
        debug_assert!(
            groups.iter().all(|g| g.len() % 2 == 1),
            "move groups must be non-empty with odd length"
        );
        Self { groups }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[inline]
    pub fn group(&self, index: usize) -> &[M] {
        &self.groups[index]
    }

    #[inline]
    pub fn first_move(&self, index: usize) -> M {
        self.groups[index][0]
    }

    pub fn groups(&self) -> impl Iterator<Item = &[M]> + '_ {
        self.groups.iter().map(|g| g.as_slice())
    }
}

impl<M: Copy + PartialEq> ChildSet<M> {
    /// Index of the group whose first move is `mv`.
    pub fn index_of(&self, mv: M) -> Option<usize> {
        self.groups.iter().position(|g| g[0] == mv)
    }
}

/// Memoized search state of one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord<M> {
    pub bounds: Bounds,
    /// Empty for terminal positions.
    pub children: ChildSet<M>,
    /// First move of the group steering toward the proof (or the last group searched when
    /// unsolved).
    pub best_move: Option<M>,
    /// MID invocations rooted here, accumulated over the last visit.
    pub work: u64,
    /// Position the record was last reached from (`None` at the root).
    pub parent: Option<u64>,
    /// First move of the group the parent played to get here.
    pub move_from_parent: Option<M>,
}

impl<M> PositionRecord<M> {
    #[inline]
    pub fn is_solved(&self) -> bool {
        self.bounds.is_solved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_keep_order_and_expose_first_moves() {
        let set = ChildSet::from_groups(vec![vec![4u32], vec![7, 8, 9]]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.first_move(1), 7);
        assert_eq!(set.group(1), &[7, 8, 9]);
        assert_eq!(set.index_of(7), Some(1));
        assert_eq!(set.index_of(8), None);
    }
}
