//! Exact solver for two-player, perfect-information games based on depth-first proof-number
//! (DFPN) search with a transposition table.
//!
//! - [`game`]: what a game must provide ([`game::GameState`], [`game::Evaluator`]).
//! - [`store`]: position stores shared across searches.
//! - [`search`]: the MID engine, bounds correction for transpositions and the [`search::Solver`]
//!   driver.
//! - [`games`]: Nim and an explicit graph game.

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod games;
pub mod search;
pub mod store;

pub use config::SolverConfig;
pub use error::SolverError;
pub use search::{SolveOutcome, Solver};
