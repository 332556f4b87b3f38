//! Driver: runs MID from the root and interprets the result.

use std::fmt;
use std::time::Duration;

use rustc_hash::FxHashSet;

use crate::config::SolverConfig;
use crate::game::{Evaluator, GameState, Side};
use crate::search::control::{AbortControl, AbortHandle, AbortReason};
use crate::search::listener::SolveListener;
use crate::search::mid::Search;
use crate::search::progress::{ProgressSink, RootProgress};
use crate::search::stats::SearchStatistics;
use crate::store::PositionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome<M> {
    Solved {
        winner: Side,
        /// Best moves from the root, forced groups expanded.
        principal_variation: Vec<M>,
    },
    /// Stopped by the abort flag or the time limit; the root is unknown.
    Aborted,
}

impl<M> SolveOutcome<M> {
    pub fn winner(&self) -> Option<Side> {
        match self {
            SolveOutcome::Solved { winner, .. } => Some(*winner),
            SolveOutcome::Aborted => None,
        }
    }
}

/// Depth-first proof-number solver.
///
/// A solver can be reused: every [`solve`](Solver::solve) call starts from the given store, so
/// results proven earlier are picked up again.
pub struct Solver<M> {
    config: SolverConfig,
    listeners: Vec<Box<dyn SolveListener<M>>>,
    progress: Option<Box<dyn ProgressSink<M>>>,
    abort: AbortHandle,
    abort_reason: Option<AbortReason>,
    stats: SearchStatistics,
}

impl<M: Copy + Eq + fmt::Debug> Solver<M> {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
            progress: None,
            abort: AbortHandle::new(),
            abort_reason: None,
            stats: SearchStatistics::default(),
        }
    }

    pub fn with_listener(mut self, listener: impl SolveListener<M> + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn with_progress(mut self, sink: impl ProgressSink<M> + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Handle that stops a running [`solve`](Solver::solve) at its next check.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Why the last solve returned [`SolveOutcome::Aborted`]; `None` if it finished.
    pub fn abort_reason(&self) -> Option<AbortReason> {
        self.abort_reason
    }

    /// Counters of the last solve.
    pub fn statistics(&self) -> &SearchStatistics {
        &self.stats
    }

    /// Solves `state` (left unchanged on return) using and updating `store`.
    pub fn solve<S, E, T>(&mut self, state: &mut S, evaluator: &E, store: &mut T) -> SolveOutcome<M>
    where
        S: GameState<Move = M>,
        E: Evaluator<S>,
        T: PositionStore<M>,
    {
        let root = GameState::hash(&*state);
        let to_move = state.to_move();
        self.stats = SearchStatistics::default();
        self.abort_reason = None;
        log::info!("solving {root:016x}, {to_move} to move");

        if store.get(root).is_some_and(|r| r.is_solved()) {
            log::info!("root already solved; skipping search");
        } else {
            let control = AbortControl::new(self.abort.clone(), self.config.time_limit_secs);
            let delay = Duration::from_millis(self.config.progress_interval_ms);
            let progress = self
                .progress
                .as_deref_mut()
                .map(|sink| RootProgress::new(sink, delay));
            let mut search: Search<'_, S, E, T> = Search::new(
                evaluator,
                &mut *store,
                &self.config,
                control,
                self.listeners.as_mut_slice(),
                progress,
            );
            search.run(state);
            self.abort_reason = search.abort_reason();
            self.stats = search.finish();
            self.stats.log_summary(
                self.config.use_bounds_correction,
                self.config.use_unique_probes,
                store.stats(),
            );
            if let Some(reason) = self.abort_reason {
                log::info!(
                    "search aborted ({reason:?}) after {} MID calls",
                    self.stats.mid_calls
                );
                return SolveOutcome::Aborted;
            }
        }

        let Some(record) = store.get(root) else {
            debug_assert!(false, "root missing from the store after a complete search");
            return SolveOutcome::Aborted;
        };
        debug_assert!(record.is_solved());
        let winner = if record.bounds.is_winning() {
            to_move
        } else {
            to_move.opponent()
        };
        let principal_variation = principal_variation(state, &*store);
        log::info!("{winner} wins");
        log::info!("principal variation: {principal_variation:?}");
        SolveOutcome::Solved {
            winner,
            principal_variation,
        }
    }
}

/// Follows stored best moves from `state` through solved records.
///
/// Stops at a missing or unsolved record, a record without a best move, or a repeated
/// position. `state` is restored before returning.
pub fn principal_variation<S, T>(state: &mut S, store: &T) -> Vec<S::Move>
where
    S: GameState,
    T: PositionStore<S::Move>,
{
    let mut line = Vec::new();
    let mut seen = FxHashSet::default();
    loop {
        let hash = GameState::hash(&*state);
        if !seen.insert(hash) {
            break;
        }
        let Some(record) = store.get(hash).filter(|r| r.is_solved()) else {
            break;
        };
        let Some(index) = record.best_move.and_then(|mv| record.children.index_of(mv)) else {
            break;
        };
        for &mv in record.children.group(index) {
            state.play(mv);
            line.push(mv);
        }
    }
    for &mv in line.iter().rev() {
        state.undo(mv);
    }
    line
}
