//! Multi-heap Nim under normal play: a player who cannot move loses.
//!
//! The value of a Nim position does not depend on who is to move, so the side to move is not
//! part of the hash; heap order is.

use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use rustc_hash::FxHasher;

use crate::error::SolverError;
use crate::game::{Evaluator, GameState, Outcome, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Remove `take` objects from heap `heap`.
pub struct NimMove {
    pub heap: u8,
    pub take: u8,
}

impl fmt::Display for NimMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.heap, self.take)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NimState {
    heaps: Vec<u8>,
    to_move: Side,
}

/// Heap indices travel in a `u8`.
pub const MAX_HEAPS: usize = u8::MAX as usize;

impl NimState {
    /// Black moves first.
    ///
    /// # Panics
    ///
    /// If there are more than [`MAX_HEAPS`] heaps.
    pub fn new(heaps: Vec<u8>) -> Self {
        assert!(
            heaps.len() <= MAX_HEAPS,
            "{} heaps, at most {MAX_HEAPS} supported",
            heaps.len()
        );
        Self {
            heaps,
            to_move: Side::Black,
        }
    }

    pub fn heaps(&self) -> &[u8] {
        &self.heaps
    }

    /// The side to move wins iff the XOR of the heap sizes is non-zero.
    pub fn nim_sum(&self) -> u8 {
        self.heaps.iter().fold(0, |acc, &h| acc ^ h)
    }
}

impl FromStr for NimState {
    type Err = SolverError;

    /// Comma-separated heap sizes, e.g. `3,4,5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let heaps = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u8>()
                    .map_err(|e| SolverError::parse("heap list", s, format!("`{}`: {e}", part.trim())))
            })
            .collect::<Result<Vec<u8>, _>>()?;
        if heaps.len() > MAX_HEAPS {
            return Err(SolverError::parse("heap list", s, "too many heaps"));
        }
        Ok(Self::new(heaps))
    }
}

impl GameState for NimState {
    type Move = NimMove;

    fn hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_usize(self.heaps.len());
        for &h in &self.heaps {
            hasher.write_u8(h);
        }
        hasher.finish()
    }

    #[inline]
    fn to_move(&self) -> Side {
        self.to_move
    }

    fn play(&mut self, mv: NimMove) {
        let heap = &mut self.heaps[usize::from(mv.heap)];
        debug_assert!(mv.take >= 1 && mv.take <= *heap, "illegal move {mv}");
        *heap -= mv.take;
        self.to_move = self.to_move.opponent();
    }

    fn undo(&mut self, mv: NimMove) {
        self.heaps[usize::from(mv.heap)] += mv.take;
        self.to_move = self.to_move.opponent();
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Every legal move is a candidate; larger takes are tried first.
pub struct Nim;

impl Evaluator<NimState> for Nim {
    fn classify(&self, state: &NimState) -> Outcome {
        if state.heaps.iter().all(|&h| h == 0) {
            Outcome::Decided(state.to_move.opponent())
        } else {
            Outcome::Undetermined
        }
    }

    fn candidate_moves(&self, state: &NimState) -> Vec<NimMove> {
        let mut moves = Vec::new();
        for (heap, &size) in (0..=u8::MAX).zip(&state.heaps) {
            for take in 1..=size {
                moves.push(NimMove { heap, take });
            }
        }
        moves
    }

    #[inline]
    fn score(&self, _state: &NimState, mv: NimMove) -> i64 {
        i64::from(mv.take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_heap_lists() {
        let state: NimState = " 3, 4 ,5".parse().unwrap();
        assert_eq!(state.heaps(), &[3, 4, 5]);
        assert_eq!(state.nim_sum(), 2);
        assert!("3,x".parse::<NimState>().is_err());
        assert!("".parse::<NimState>().is_err());
    }

    #[test]
    fn heap_count_is_limited_to_what_a_move_can_address() {
        let widest = vec!["1"; MAX_HEAPS].join(",");
        let state: NimState = widest.parse().unwrap();
        let moves = Nim.candidate_moves(&state);
        assert_eq!(moves.len(), MAX_HEAPS);
        assert_eq!(moves[MAX_HEAPS - 1], NimMove { heap: 254, take: 1 });

        let too_wide = vec!["1"; MAX_HEAPS + 1].join(",");
        assert!(too_wide.parse::<NimState>().is_err());
    }

    #[test]
    #[should_panic(expected = "at most 255 supported")]
    fn constructor_rejects_too_many_heaps() {
        NimState::new(vec![1; MAX_HEAPS + 1]);
    }

    #[test]
    fn play_and_undo_restore_hash_and_side() {
        let mut state = NimState::new(vec![2, 3]);
        let before = state.hash();
        let mv = NimMove { heap: 1, take: 2 };
        state.play(mv);
        assert_eq!(state.heaps(), &[2, 1]);
        assert_eq!(state.to_move(), Side::White);
        state.undo(mv);
        assert_eq!(state.hash(), before);
        assert_eq!(state.to_move(), Side::Black);
    }
}
