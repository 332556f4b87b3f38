//! Concrete games for driving the solver.
//!
//! - [`nim`]: multi-heap Nim (normal play). Small, drawless, full of transpositions.
//! - [`graph`]: an explicit position graph, for hand-built positions and regression cases.

pub mod graph;
pub mod nim;

pub use graph::{GraphGame, GraphState, NodeId};
pub use nim::{Nim, NimMove, NimState, MAX_HEAPS};
