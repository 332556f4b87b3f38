use crate::core::PositionRecord;
use crate::store::{PositionStore, StoreStats};

#[derive(Debug, Clone)]
/// Fixed-capacity, direct-mapped store.
///
/// Each key maps to exactly one slot (`key % capacity`); a write always wins, evicting whatever
/// record occupied the slot.
pub struct BoundedStore<M> {
    slots: Vec<Option<(u64, PositionRecord<M>)>>,
    entries: usize,
    writes: u64,
    overwrites: u64,
    evictions: u64,
}

impl<M> BoundedStore<M> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            entries: 0,
            writes: 0,
            overwrites: 0,
            evictions: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    #[inline]
    fn slot(&self, key: u64) -> usize {
        (key % self.slots.len() as u64) as usize
    }
}

impl<M> PositionStore<M> for BoundedStore<M> {
    fn get(&self, key: u64) -> Option<&PositionRecord<M>> {
        match &self.slots[self.slot(key)] {
            Some((k, record)) if *k == key => Some(record),
            _ => None,
        }
    }

    fn put(&mut self, key: u64, record: PositionRecord<M>) {
        self.writes += 1;
        let idx = self.slot(key);
        match self.slots[idx].replace((key, record)) {
            Some((old, _)) if old == key => self.overwrites += 1,
            Some(_) => self.evictions += 1,
            None => self.entries += 1,
        }
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.entries,
            capacity: Some(self.slots.len()),
            writes: self.writes,
            overwrites: self.overwrites,
            evictions: self.evictions,
        }
    }
}
