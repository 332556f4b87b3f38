//! Position stores (transposition tables).
//!
//! The store is the only state that outlives a single MID call. It may be lossy: a miss for a
//! key that was stored earlier is indistinguishable from "never visited", and the solver
//! recomputes children and bounds from scratch in that case.
//!
//! - [`memory`]: unbounded hash map.
//! - [`bounded`]: fixed number of direct-mapped slots; colliding writes evict.

pub mod bounded;
pub mod memory;

use std::fmt;

use serde::Serialize;

use crate::core::PositionRecord;

pub use bounded::BoundedStore;
pub use memory::MemoryStore;

/// Key → record associative store.
pub trait PositionStore<M> {
    fn get(&self, key: u64) -> Option<&PositionRecord<M>>;

    /// Unconditional overwrite.
    fn put(&mut self, key: u64, record: PositionRecord<M>);

    fn stats(&self) -> StoreStats;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Running counters of a store.
pub struct StoreStats {
    pub entries: usize,
    /// `None` for unbounded stores.
    pub capacity: Option<usize>,
    pub writes: u64,
    /// Writes that replaced a record for the same key.
    pub overwrites: u64,
    /// Writes that replaced a record for a different key.
    pub evictions: u64,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.capacity {
            Some(cap) => write!(f, "store: {}/{} entries", self.entries, cap)?,
            None => write!(f, "store: {} entries", self.entries)?,
        }
        write!(
            f,
            ", writes={}, overwrites={}, evictions={}",
            self.writes, self.overwrites, self.evictions
        )
    }
}
