//! Search data model.
//!
//! - [`bounds`]: the `(phi, delta)` pair and the `INFTY` sentinel.
//! - [`record`]: the per-position memo record and its ordered move groups.

pub mod bounds;
pub mod record;

pub use bounds::{Bounds, INFTY};
pub use record::{ChildSet, PositionRecord};
