use std::cell::RefCell;
use std::rc::Rc;

use dfpn_solver::core::{Bounds, ChildSet, PositionRecord};
use dfpn_solver::game::GameState;
use dfpn_solver::games::{Nim, NimMove, NimState};
use dfpn_solver::search::{PathEntry, ProgressSink, SolveListener};
use dfpn_solver::store::MemoryStore;
use dfpn_solver::{Solver, SolverConfig, SolverError};

#[derive(Clone, Default)]
struct Collect {
    /// Hashes of the live path at each notification, root first.
    paths: Rc<RefCell<Vec<Vec<u64>>>>,
}

impl SolveListener<NimMove> for Collect {
    fn state_solved(&mut self, path: &[PathEntry<NimMove>], record: &PositionRecord<NimMove>) {
        assert!(record.is_solved());
        self.paths
            .borrow_mut()
            .push(path.iter().map(|e| e.hash).collect());
    }
}

#[derive(Clone, Default)]
struct Snapshots {
    seen: Rc<RefCell<Vec<(Option<usize>, usize, Vec<Bounds>)>>>,
}

impl ProgressSink<NimMove> for Snapshots {
    fn emit(&mut self, active: Option<usize>, children: &ChildSet<NimMove>, bounds: &[Bounds]) {
        self.seen
            .borrow_mut()
            .push((active, children.len(), bounds.to_vec()));
    }
}

#[test]
fn descendants_are_reported_before_ancestors() {
    let listener = Collect::default();
    let paths = listener.paths.clone();
    let mut solver = Solver::new(SolverConfig::default()).with_listener(listener);

    let mut state = NimState::new(vec![1, 2, 3]);
    let root = state.hash();
    solver.solve(&mut state, &Nim, &mut MemoryStore::new());

    let paths = paths.borrow();
    assert!(!paths.is_empty());
    assert_eq!(paths.last().map(|p| p.as_slice()), Some(&[root][..]));

    let solved: Vec<u64> = paths.iter().filter_map(|p| p.last().copied()).collect();
    for (i, path) in paths.iter().enumerate() {
        assert_eq!(path[0], root);
        for ancestor in &path[..path.len() - 1] {
            assert!(
                !solved[..i].contains(ancestor),
                "ancestor {ancestor:016x} reported before its descendant"
            );
        }
    }

    let mut unique = solved.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), solved.len(), "a position was reported twice");
}

#[test]
fn progress_covers_every_root_child_and_ends_with_a_flush() {
    let sink = Snapshots::default();
    let seen = sink.seen.clone();
    let mut config = SolverConfig::default();
    config.progress_interval_ms = 0;
    let mut solver = Solver::new(config).with_progress(sink);

    solver.solve(&mut NimState::new(vec![1, 2]), &Nim, &mut MemoryStore::new());

    let seen = seen.borrow();
    assert!(!seen.is_empty());
    // Moves of [1, 2]: take 1 from heap 0, take 1 or 2 from heap 1.
    assert!(seen.iter().all(|(_, n, bounds)| *n == 3 && bounds.len() == 3));
    assert!(seen.iter().any(|(active, _, _)| active.is_some()));
    let (active, _, _) = seen.last().unwrap();
    assert_eq!(*active, None);
}

#[test]
fn config_loads_from_json_and_reports_bad_files() {
    let dir = std::env::temp_dir();
    let good = dir.join(format!("dfpn-config-{}.json", std::process::id()));
    std::fs::write(&good, r#"{ "use_bounds_correction": true, "time_limit_secs": 2.5 }"#).unwrap();
    let config = SolverConfig::from_json_file(&good).unwrap();
    assert!(config.use_bounds_correction);
    assert!(!config.use_unique_probes);
    assert_eq!(config.time_limit_secs, 2.5);

    std::fs::write(&good, "{ not json").unwrap();
    assert!(matches!(
        SolverConfig::from_json_file(&good),
        Err(SolverError::Config { .. })
    ));
    std::fs::remove_file(&good).unwrap();

    assert!(matches!(
        SolverConfig::from_json_file(dir.join("dfpn-no-such-config.json")),
        Err(SolverError::Io { .. })
    ));
}

#[test]
fn statistics_serialize_to_json() {
    let mut solver = Solver::new(SolverConfig::default());
    solver.solve(&mut NimState::new(vec![1, 2]), &Nim, &mut MemoryStore::new());
    let value = serde_json::to_value(solver.statistics()).unwrap();
    assert!(value["mid_calls"].as_u64().unwrap() > 0);
    assert!(value["terminal_nodes"].as_u64().unwrap() > 0);
}
