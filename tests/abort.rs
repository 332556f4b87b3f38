use dfpn_solver::core::PositionRecord;
use dfpn_solver::game::GameState;
use dfpn_solver::games::{Nim, NimMove, NimState};
use dfpn_solver::search::{AbortHandle, AbortReason, PathEntry, SolveListener};
use dfpn_solver::store::{MemoryStore, PositionStore, StoreStats};
use dfpn_solver::{SolveOutcome, Solver, SolverConfig};

/// Memory store that counts writes made after the abort flag was raised.
struct RecordingStore {
    inner: MemoryStore<NimMove>,
    handle: AbortHandle,
    writes_after_abort: usize,
}

impl PositionStore<NimMove> for RecordingStore {
    fn get(&self, key: u64) -> Option<&PositionRecord<NimMove>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: u64, record: PositionRecord<NimMove>) {
        if self.handle.is_aborted() {
            self.writes_after_abort += 1;
        }
        self.inner.put(key, record);
    }

    fn stats(&self) -> StoreStats {
        self.inner.stats()
    }
}

/// Raises the abort flag once `remaining` positions have been proven.
struct AbortAfter {
    remaining: usize,
    handle: AbortHandle,
}

impl SolveListener<NimMove> for AbortAfter {
    fn state_solved(&mut self, _path: &[PathEntry<NimMove>], _record: &PositionRecord<NimMove>) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.handle.abort();
        }
    }
}

#[test]
fn abort_from_a_listener_stores_nothing_afterwards() {
    let solver = Solver::new(SolverConfig::default());
    let handle = solver.abort_handle();
    let mut solver = solver.with_listener(AbortAfter {
        remaining: 5,
        handle: handle.clone(),
    });

    let mut state = NimState::new(vec![2, 3, 4]);
    let root = state.hash();
    let mut store = RecordingStore {
        inner: MemoryStore::new(),
        handle,
        writes_after_abort: 0,
    };
    let outcome = solver.solve(&mut state, &Nim, &mut store);

    assert_eq!(outcome, SolveOutcome::Aborted);
    assert_eq!(store.writes_after_abort, 0);
    assert!(store.inner.get(root).is_none());
    assert!(!store.inner.is_empty());
    assert_eq!(state.heaps(), &[2, 3, 4]);
    for (_, record) in store.inner.iter() {
        assert!(record.bounds.is_valid());
    }
}

#[test]
fn flag_raised_before_the_solve_aborts_immediately() {
    let mut solver: Solver<NimMove> = Solver::new(SolverConfig::default());
    solver.abort_handle().abort();

    let mut store = MemoryStore::new();
    let outcome = solver.solve(&mut NimState::new(vec![1, 2]), &Nim, &mut store);

    assert_eq!(outcome, SolveOutcome::Aborted);
    assert_eq!(solver.abort_reason(), Some(AbortReason::User));
    assert!(store.is_empty());
    assert_eq!(solver.statistics().mid_calls, 0);
}

#[test]
fn expired_time_limit_aborts() {
    let config = SolverConfig::default().with_time_limit(1e-9);
    let mut solver = Solver::new(config);
    let mut store = MemoryStore::new();
    let mut state = NimState::new(vec![3, 4, 5]);
    let outcome = solver.solve(&mut state, &Nim, &mut store);

    assert_eq!(outcome, SolveOutcome::Aborted);
    assert_eq!(solver.abort_reason(), Some(AbortReason::TimeLimit));
    assert!(store.get(state.hash()).is_none());
    assert!(solver.statistics().mid_calls < 100);
}

#[test]
fn aborted_search_can_be_resumed_with_the_same_store() {
    let solver = Solver::new(SolverConfig::default());
    let handle = solver.abort_handle();
    let mut solver = solver.with_listener(AbortAfter {
        remaining: 3,
        handle: handle.clone(),
    });

    let mut store = MemoryStore::new();
    let first = solver.solve(&mut NimState::new(vec![1, 2, 4]), &Nim, &mut store);
    assert_eq!(first, SolveOutcome::Aborted);
    assert_eq!(solver.abort_reason(), Some(AbortReason::User));

    handle.reset();
    let second = solver.solve(&mut NimState::new(vec![1, 2, 4]), &Nim, &mut store);
    assert_eq!(second.winner(), Some(dfpn_solver::game::Side::Black));
    assert_eq!(solver.abort_reason(), None);
}
