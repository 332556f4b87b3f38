//! The recursive MID engine.
//!
//! Every position is an OR-node from the point of view of its side to move: one child that is
//! lost for the opponent proves the position, and the position is lost only once every child is
//! won for the opponent. With child bounds given from the child's own point of view:
//! - `phi = min(child.delta)`,
//! - `delta = sum(child.phi)`.
//!
//! A call refines the current position until its bounds reach one of the thresholds, descending
//! into the most-proving child each round, then stores the result. Aborted calls store nothing.

use std::cmp::Reverse;

use crate::config::SolverConfig;
use crate::core::{Bounds, ChildSet, PositionRecord, INFTY};
use crate::game::{Evaluator, GameState, Outcome, Played, Side};
use crate::search::control::{AbortControl, AbortReason};
use crate::search::history::History;
use crate::search::listener::SolveListener;
use crate::search::progress::RootProgress;
use crate::search::stats::SearchStatistics;
use crate::store::PositionStore;

/// State of one solve: everything MID needs besides the board.
pub(crate) struct Search<'a, S: GameState, E, T> {
    evaluator: &'a E,
    store: &'a mut T,
    config: &'a SolverConfig,
    history: History<S::Move>,
    control: AbortControl,
    stats: SearchStatistics,
    listeners: &'a mut [Box<dyn SolveListener<S::Move>>],
    progress: Option<RootProgress<'a, S::Move>>,
}

impl<'a, S, E, T> Search<'a, S, E, T>
where
    S: GameState,
    E: Evaluator<S>,
    T: PositionStore<S::Move>,
{
    pub fn new(
        evaluator: &'a E,
        store: &'a mut T,
        config: &'a SolverConfig,
        control: AbortControl,
        listeners: &'a mut [Box<dyn SolveListener<S::Move>>],
        progress: Option<RootProgress<'a, S::Move>>,
    ) -> Self {
        Self {
            evaluator,
            store,
            config,
            history: History::new(),
            control,
            stats: SearchStatistics::default(),
            listeners,
            progress,
        }
    }

    /// Searches from `root` until it is solved or the search is aborted.
    pub fn run(&mut self, root: &mut S) {
        self.history.push(GameState::hash(&*root), None);
        self.mid(root, Bounds::unbounded());
        self.history.pop();
    }

    /// Why the search stopped early, if it did.
    #[inline]
    pub fn abort_reason(&self) -> Option<AbortReason> {
        self.control.reason()
    }

    pub fn finish(mut self) -> SearchStatistics {
        self.stats.elapsed_secs = self.control.elapsed().as_secs_f64();
        self.stats
    }

    /// Refines the current position (the top of the history) until its bounds reach
    /// `thresholds` and returns the number of MID invocations spent.
    fn mid(&mut self, state: &mut S, thresholds: Bounds) -> u64 {
        debug_assert!(
            thresholds.phi > 1 && thresholds.delta > 1,
            "thresholds too small: {thresholds}"
        );
        if self.control.check(self.stats.mid_calls) {
            return 0;
        }

        let depth = self.history.depth();
        let hash = GameState::hash(&*state);
        let parent = self.history.parent_hash();
        let via = self.history.last_move();

        let children = match self.store.get(hash) {
            Some(record) => {
                debug_assert!(
                    thresholds.phi > record.bounds.phi && thresholds.delta > record.bounds.delta,
                    "thresholds {thresholds} do not exceed stored bounds {}",
                    record.bounds
                );
                if record.parent != parent {
                    self.stats.transpositions += 1;
                    log::debug!("transposition at {hash:016x} (depth {depth})");
                    if self.config.use_bounds_correction {
                        self.history
                            .notify_common_ancestor(&*self.store, record, hash, &mut self.stats);
                    }
                }
                record.children.clone()
            }
            None => match self.evaluator.classify(state) {
                Outcome::Decided(winner) => {
                    return self.terminal(state.to_move(), winner, hash, parent, via, depth)
                }
                Outcome::Undetermined => self.expand(state),
            },
        };

        self.stats.mid_calls += 1;
        let mut work = 1;

        let n = children.len();
        let scale = self.evaluator.delta_scale(state);
        let hashes: Vec<u64> = (0..n)
            .map(|i| {
                let played = Played::new(&mut *state, children.group(i));
                GameState::hash(&*played)
            })
            .collect();
        let mut child_bounds: Vec<Bounds> = (0..n)
            .map(|i| Bounds::new(1, initial_delta(i, n, scale)))
            .collect();
        let mut child_work = vec![0u64; n];

        if depth == 0 {
            if let Some(progress) = self.progress.as_mut() {
                progress.set_children(&children, child_bounds.clone());
            }
        }

        let mut bounds;
        loop {
            self.refresh(&hashes, &mut child_bounds, &mut child_work);
            bounds = aggregate(&child_bounds);

            if self.config.use_bounds_correction && !bounds.is_solved() {
                let floor = child_bounds.iter().map(|b| b.phi).max().unwrap_or(1);
                let applied = self.history.modify_bounds(
                    hash,
                    &mut bounds,
                    floor,
                    &*self.store,
                    &mut self.stats,
                );
                self.stats.bounds_corrections += applied;
            }
            bounds.check();

            if let Some(progress) = self.progress.as_mut() {
                match depth {
                    0 => {
                        progress.set_bounds(&child_bounds);
                        progress.write();
                    }
                    1 => {
                        progress.update_current(bounds);
                        progress.write();
                    }
                    _ => {}
                }
            }

            if bounds.phi >= thresholds.phi || bounds.delta >= thresholds.delta {
                break;
            }

            let (best, delta2) = select_child(&child_bounds);
            let child = child_bounds[best];
            debug_assert!(bounds.delta >= child.phi);
            let child_thresholds = Bounds::new(
                thresholds.delta - (bounds.delta - child.phi),
                thresholds.phi.min(delta2 + 1),
            );
            debug_assert!(
                child_thresholds.phi > child.phi && child_thresholds.delta > child.delta,
                "child thresholds {child_thresholds} do not exceed child bounds {child}"
            );

            let first = children.first_move(best);
            if depth == 0 {
                if let Some(progress) = self.progress.as_mut() {
                    progress.play(best);
                }
            }
            {
                let mut played = Played::new(&mut *state, children.group(best));
                self.history.push(hashes[best], Some(first));
                work += self.mid(&mut *played, child_thresholds);
                self.history.pop();
            }
            if depth == 0 {
                if let Some(progress) = self.progress.as_mut() {
                    progress.undo();
                }
            }

            if self.control.check(self.stats.mid_calls) {
                break;
            }

            let reply = match self.store.get(hashes[best]) {
                Some(record) => {
                    child_bounds[best] = record.bounds;
                    child_work[best] = record.work;
                    record.best_move
                }
                None => {
                    child_bounds[best] = Bounds::new(1, 1);
                    None
                }
            };

            if self.config.use_unique_probes && child_bounds[best].is_winning() {
                self.stats.probe_checks += 1;
                if let Some(reply) = reply {
                    if self.evaluator.unique_reply(state, first, reply) {
                        self.stats.unique_probes += 1;
                        log::debug!(
                            "unique reply {reply:?} to {first:?} at {hash:016x}: position lost"
                        );
                        bounds = Bounds::losing();
                        break;
                    }
                }
            }
        }

        if depth == 0 {
            if let Some(progress) = self.progress.as_mut() {
                progress.write_forced();
            }
        }
        if self.control.aborted() {
            return 0;
        }

        let best = if bounds.is_losing() {
            most_resistant(&child_bounds, &child_work)
        } else if bounds.is_winning() {
            cheapest_win(&child_bounds, &child_work)
        } else {
            Some(select_child(&child_bounds).0)
        };
        let best_move = best.map(|i| children.first_move(i));

        self.store.put(
            hash,
            PositionRecord {
                bounds,
                children,
                best_move,
                work,
                parent,
                move_from_parent: via,
            },
        );
        if bounds.is_solved() {
            self.notify(hash);
        }
        work
    }

    fn terminal(
        &mut self,
        to_move: Side,
        winner: Side,
        hash: u64,
        parent: Option<u64>,
        via: Option<S::Move>,
        depth: usize,
    ) -> u64 {
        self.stats.terminal_nodes += 1;
        let bounds = if winner == to_move {
            Bounds::winning()
        } else {
            Bounds::losing()
        };
        if depth == 1 {
            if let Some(progress) = self.progress.as_mut() {
                progress.update_current(bounds);
                progress.write();
            }
        }
        self.store.put(
            hash,
            PositionRecord {
                bounds,
                children: ChildSet::default(),
                best_move: None,
                work: 1,
                parent,
                move_from_parent: via,
            },
        );
        self.notify(hash);
        1
    }

    /// Candidate moves, best score first (stable), each extended by its forced line.
    fn expand(&self, state: &S) -> ChildSet<S::Move> {
        let mut moves = self.evaluator.candidate_moves(state);
        debug_assert!(
            !moves.is_empty(),
            "no candidate moves in an undetermined position"
        );
        moves.sort_by_key(|&mv| Reverse(self.evaluator.score(state, mv)));
        let groups = moves
            .into_iter()
            .map(|mv| {
                let mut group = vec![mv];
                group.extend(self.evaluator.forced_line(state, mv));
                group
            })
            .collect();
        ChildSet::from_groups(groups)
    }

    /// Overwrites cached child bounds with stored ones; misses keep their current value.
    fn refresh(&self, hashes: &[u64], bounds: &mut [Bounds], work: &mut [u64]) {
        for (i, &h) in hashes.iter().enumerate() {
            if let Some(record) = self.store.get(h) {
                bounds[i] = record.bounds;
                work[i] = record.work;
            }
        }
    }

    /// Passes the record just stored under `hash` to every listener.
    fn notify(&mut self, hash: u64) {
        let Some(record) = self.store.get(hash) else {
            return;
        };
        let path = self.history.path();
        for listener in self.listeners.iter_mut() {
            listener.state_solved(path, record);
        }
    }
}

/// Provisional disproof number of the `index`-th of `n` unvisited children.
fn initial_delta(index: usize, n: usize, scale: u64) -> u64 {
    if index < n / 2 {
        1
    } else {
        scale.saturating_mul(2).clamp(1, INFTY - 1)
    }
}

/// OR-node aggregation of child bounds.
pub(crate) fn aggregate(children: &[Bounds]) -> Bounds {
    if children.iter().any(|c| c.is_losing()) {
        return Bounds::winning();
    }
    let sum: u64 = children.iter().map(|c| c.phi).sum();
    if sum == 0 {
        return Bounds::losing();
    }
    let phi = children.iter().map(|c| c.delta).min().unwrap_or(INFTY);
    Bounds::new(phi, sum.min(INFTY - 1))
}

/// Index of the smallest delta (first on ties) and the second-smallest delta.
pub(crate) fn select_child(children: &[Bounds]) -> (usize, u64) {
    let mut best = 0;
    let mut delta1 = children[0].delta;
    let mut delta2 = INFTY;
    for (i, c) in children.iter().enumerate().skip(1) {
        if c.delta < delta1 {
            delta2 = delta1;
            delta1 = c.delta;
            best = i;
        } else if c.delta < delta2 {
            delta2 = c.delta;
        }
    }
    (best, delta2)
}

/// In a lost position: the refutation that absorbed the most work.
fn most_resistant(bounds: &[Bounds], work: &[u64]) -> Option<usize> {
    let mut best = None;
    let mut max = 0;
    for (i, (b, &w)) in bounds.iter().zip(work).enumerate() {
        if b.is_winning() && w > max {
            max = w;
            best = Some(i);
        }
    }
    best.or_else(|| (!bounds.is_empty()).then_some(0))
}

/// In a won position: the cheapest child proven lost for the opponent.
fn cheapest_win(bounds: &[Bounds], work: &[u64]) -> Option<usize> {
    bounds
        .iter()
        .zip(work)
        .enumerate()
        .filter(|(_, (b, _))| b.is_losing())
        .min_by_key(|&(i, (_, &w))| (w, i))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_takes_min_delta_and_sum_phi() {
        let children = [Bounds::new(2, 7), Bounds::new(3, 4), Bounds::new(5, 9)];
        assert_eq!(aggregate(&children), Bounds::new(4, 10));
    }

    #[test]
    fn any_lost_child_wins_the_parent() {
        let children = [Bounds::new(2, 7), Bounds::losing(), Bounds::winning()];
        assert_eq!(aggregate(&children), Bounds::winning());
    }

    #[test]
    fn all_won_children_lose_the_parent() {
        let children = [Bounds::winning(), Bounds::winning()];
        assert_eq!(aggregate(&children), Bounds::losing());
    }

    #[test]
    fn won_children_do_not_count_towards_delta() {
        let children = [Bounds::winning(), Bounds::new(3, 2)];
        assert_eq!(aggregate(&children), Bounds::new(2, 3));
    }

    #[test]
    fn selection_prefers_first_of_equal_deltas() {
        let children = [Bounds::new(1, 5), Bounds::new(1, 3), Bounds::new(1, 3)];
        assert_eq!(select_child(&children), (1, 3));

        let single = [Bounds::new(1, 3)];
        assert_eq!(select_child(&single), (0, INFTY));
    }

    #[test]
    fn initial_delta_favours_the_first_half() {
        let deltas: Vec<u64> = (0..5).map(|i| initial_delta(i, 5, 8)).collect();
        assert_eq!(deltas, vec![1, 1, 16, 16, 16]);
    }

    #[test]
    fn best_moves_by_work() {
        let lost = [Bounds::winning(), Bounds::winning(), Bounds::winning()];
        assert_eq!(most_resistant(&lost, &[3, 9, 9]), Some(1));

        let won = [Bounds::new(2, 2), Bounds::losing(), Bounds::losing()];
        assert_eq!(cheapest_win(&won, &[1, 7, 4]), Some(2));
    }
}
