use rustc_hash::FxHashMap;

use crate::core::PositionRecord;
use crate::store::{PositionStore, StoreStats};

#[derive(Debug, Clone)]
/// Unbounded store: never loses a record.
pub struct MemoryStore<M> {
    map: FxHashMap<u64, PositionRecord<M>>,
    writes: u64,
    overwrites: u64,
}

impl<M> Default for MemoryStore<M> {
    fn default() -> Self {
        Self {
            map: FxHashMap::default(),
            writes: 0,
            overwrites: 0,
        }
    }
}

impl<M> MemoryStore<M> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.map.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &PositionRecord<M>)> + '_ {
        self.map.iter().map(|(&k, r)| (k, r))
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<M> PositionStore<M> for MemoryStore<M> {
    #[inline]
    fn get(&self, key: u64) -> Option<&PositionRecord<M>> {
        self.map.get(&key)
    }

    fn put(&mut self, key: u64, record: PositionRecord<M>) {
        self.writes += 1;
        if self.map.insert(key, record).is_some() {
            self.overwrites += 1;
        }
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.map.len(),
            capacity: None,
            writes: self.writes,
            overwrites: self.overwrites,
            evictions: 0,
        }
    }
}
