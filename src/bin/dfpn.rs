//! Command-line driver.
//!
//! ```text
//! dfpn nim 1,2,3
//! dfpn --bounds-correction --time-limit 10 graph game.txt 1
//! ```

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use dfpn_solver::game::{Evaluator, GameState, Side};
use dfpn_solver::games::{GraphGame, Nim, NimState, NodeId};
use dfpn_solver::search::{AbortReason, LogListener, LogProgress, SearchStatistics};
use dfpn_solver::store::{BoundedStore, MemoryStore, PositionStore, StoreStats};
use dfpn_solver::{SolveOutcome, Solver, SolverConfig, SolverError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Depth-first proof-number solver", long_about = None)]
struct Cli {
    /// Wall-clock limit in seconds (0 = unlimited)
    #[arg(long, global = true)]
    time_limit: Option<f64>,

    /// Correct disproof numbers for transpositions
    #[arg(long, global = true)]
    bounds_correction: bool,

    /// Consult the unique-reply oracle
    #[arg(long, global = true)]
    unique_probes: bool,

    /// Use a fixed-capacity store with this many slots instead of an unbounded one
    #[arg(long, global = true)]
    store_capacity: Option<usize>,

    /// JSON configuration file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print a JSON summary on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Log every solved position
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Multi-heap Nim, e.g. `1,2,3`
    Nim { heaps: String },
    /// Explicit game graph in text form
    Graph { file: PathBuf, root: NodeId },
}

#[derive(Serialize)]
struct Summary<'a> {
    solved: bool,
    winner: Option<Side>,
    aborted: Option<AbortReason>,
    principal_variation: Vec<String>,
    statistics: &'a SearchStatistics,
    store: StoreStats,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .init();

    if let Err(e) = run(&cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), SolverError> {
    let mut config = match &cli.config {
        Some(path) => SolverConfig::from_json_file(path)?,
        None => SolverConfig::default(),
    };
    if let Some(secs) = cli.time_limit {
        config.time_limit_secs = secs;
    }
    config.use_bounds_correction |= cli.bounds_correction;
    config.use_unique_probes |= cli.unique_probes;

    match &cli.command {
        Command::Nim { heaps } => {
            let mut state: NimState = heaps.parse()?;
            solve(cli, config, &mut state, &Nim);
        }
        Command::Graph { file, root } => {
            let game = GraphGame::from_file(file)?;
            let mut state = game.start(*root);
            solve(cli, config, &mut state, &game);
        }
    }
    Ok(())
}

fn solve<S, E>(cli: &Cli, config: SolverConfig, state: &mut S, evaluator: &E)
where
    S: GameState,
    S::Move: fmt::Display + 'static,
    E: Evaluator<S>,
{
    let mut solver = Solver::new(config).with_progress(LogProgress);
    if cli.verbose {
        solver = solver.with_listener(LogListener);
    }

    let (outcome, store) = match cli.store_capacity {
        Some(capacity) => {
            let mut store = BoundedStore::new(capacity);
            (solver.solve(state, evaluator, &mut store), store.stats())
        }
        None => {
            let mut store = MemoryStore::new();
            (solver.solve(state, evaluator, &mut store), store.stats())
        }
    };

    let (winner, line) = match &outcome {
        SolveOutcome::Solved {
            winner,
            principal_variation,
        } => (
            Some(*winner),
            principal_variation.iter().map(|m| m.to_string()).collect(),
        ),
        SolveOutcome::Aborted => (None, Vec::new()),
    };

    if cli.json {
        let summary = Summary {
            solved: winner.is_some(),
            winner,
            aborted: solver.abort_reason(),
            principal_variation: line,
            statistics: solver.statistics(),
            store,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(e) => log::error!("failed to encode summary: {e}"),
        }
        return;
    }

    match winner {
        Some(side) => {
            println!("{side} wins");
            println!("principal variation: {}", line.join(" "));
        }
        None => match solver.abort_reason() {
            Some(AbortReason::TimeLimit) => println!("aborted: time limit reached"),
            _ => println!("aborted: result unknown"),
        },
    }
}
