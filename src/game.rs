//! Contracts between the solver and the game being solved.
//!
//! The solver never inspects positions directly. It needs:
//! - a mutable board ([`GameState`]): hashing, side to move, play / undo,
//! - an immutable domain evaluator ([`Evaluator`]): terminal classification, candidate moves,
//!   heuristic ordering and an optional unique-reply oracle.
//!
//! The evaluator is built once by the caller and only ever borrowed immutably during search.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// One of the two players.
pub enum Side {
    Black,
    White,
}

impl Side {
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Black => write!(f, "black"),
            Side::White => write!(f, "white"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Terminal classification of a position.
pub enum Outcome {
    Undetermined,
    Decided(Side),
}

/// A position that is mutated in place by the search.
///
/// `play` / `undo` must nest strictly: `undo(m)` restores exactly the state before `play(m)`.
pub trait GameState {
    type Move: Copy + Eq + fmt::Debug;

    /// Key of the current position in the position store.
    fn hash(&self) -> u64;

    fn to_move(&self) -> Side;

    fn play(&mut self, mv: Self::Move);

    fn undo(&mut self, mv: Self::Move);
}

/// Default scale for provisional disproof numbers of unvisited children.
pub const DEFAULT_DELTA_SCALE: u64 = 8;

/// Domain knowledge used by the solver.
pub trait Evaluator<S: GameState> {
    fn classify(&self, state: &S) -> Outcome;

    /// Moves worth considering in an undetermined position. Must be non-empty.
    fn candidate_moves(&self, state: &S) -> Vec<S::Move>;

    /// Heuristic value of `mv`; higher scores are visited first. Only affects ordering.
    fn score(&self, state: &S, mv: S::Move) -> i64;

    /// Forced continuation played together with `mv` as one search unit.
    ///
    /// Must have even length (reply, move, ...), every move legal in sequence.
    #[inline]
    fn forced_line(&self, _state: &S, _mv: S::Move) -> Vec<S::Move> {
        Vec::new()
    }

    /// Certifies that `winning_reply` refuting `losing_move` implies the position is lost.
    ///
    /// A false positive is unsound; a false negative only costs search.
    #[inline]
    fn unique_reply(&self, _state: &S, _losing_move: S::Move, _winning_reply: S::Move) -> bool {
        false
    }

    /// Scale of the provisional disproof number given to poorly ranked unvisited children.
    #[inline]
    fn delta_scale(&self, _state: &S) -> u64 {
        DEFAULT_DELTA_SCALE
    }
}

/// A move group played on a state, undone when dropped.
///
/// Every descent goes through this guard so early returns cannot leave the board modified.
pub struct Played<'a, S: GameState> {
    state: &'a mut S,
    moves: &'a [S::Move],
}

impl<'a, S: GameState> Played<'a, S> {
    pub fn new(state: &'a mut S, moves: &'a [S::Move]) -> Self {
        for &mv in moves {
            state.play(mv);
        }
        Self { state, moves }
    }
}

impl<S: GameState> Deref for Played<'_, S> {
    type Target = S;

    #[inline]
    fn deref(&self) -> &S {
        self.state
    }
}

impl<S: GameState> DerefMut for Played<'_, S> {
    #[inline]
    fn deref_mut(&mut self) -> &mut S {
        self.state
    }
}

impl<S: GameState> Drop for Played<'_, S> {
    fn drop(&mut self) {
        for &mv in self.moves.iter().rev() {
            self.state.undo(mv);
        }
    }
}
