//! Fixed-capacity pool of equal-size byte slots.
//!
//! Streams that cannot make progress park partial data in a slot: header
//! bytes awaiting the end of the request head, or body bytes the target has
//! granted no window for yet. Slots are preallocated at startup and never
//! deallocated; `release` only returns the index to the free list, so a
//! buffer loaned out with [`Slab::take`] can always be restored with
//! [`Slab::put_back`], even across an intervening release.

use crate::metrics;

struct SlotEntry {
    data: Box<[u8]>,
    owner: u64,
    in_use: bool,
}

/// Pool of `slot_count` reusable slots of `slot_capacity` bytes each.
pub struct Slab {
    slot_capacity: usize,
    entries: Vec<SlotEntry>,
    free: Vec<usize>,
}

impl Slab {
    pub fn new(slot_count: usize, slot_capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(slot_count);
        for _ in 0..slot_count {
            entries.push(SlotEntry {
                data: vec![0u8; slot_capacity].into_boxed_slice(),
                owner: 0,
                in_use: false,
            });
        }
        let free: Vec<usize> = (0..slot_count).rev().collect();
        Slab {
            slot_capacity,
            entries,
            free,
        }
    }

    /// Size of each slot in bytes.
    pub fn slot_capacity(&self) -> usize {
        self.slot_capacity
    }

    /// Allocate a slot for `owner`. Returns `None` when the pool is
    /// exhausted; callers treat that as backpressure.
    pub fn acquire(&mut self, owner: u64) -> Option<usize> {
        let index = self.free.pop()?;
        let entry = &mut self.entries[index];
        entry.owner = owner;
        entry.in_use = true;
        metrics::SLOTS_ACQUIRED.increment();
        metrics::SLOTS_HELD.increment();
        Some(index)
    }

    /// Writable view of a slot.
    pub fn buffer_mut(&mut self, index: usize) -> &mut [u8] {
        debug_assert!(self.entries[index].in_use, "slot {index} not acquired");
        &mut self.entries[index].data
    }

    /// Move a slot's buffer out so it can be read while the slab itself
    /// stays mutable. Pair with [`Slab::put_back`] before the dispatch
    /// returns.
    pub fn take(&mut self, index: usize) -> Box<[u8]> {
        std::mem::take(&mut self.entries[index].data)
    }

    /// Return a buffer previously moved out with [`Slab::take`]. Valid even
    /// if the slot was released in between; the allocation is reused by the
    /// next acquirer.
    pub fn put_back(&mut self, index: usize, data: Box<[u8]>) {
        debug_assert_eq!(data.len(), self.slot_capacity);
        self.entries[index].data = data;
    }

    /// Release a slot back to the free list. No-op when the slot is not
    /// held.
    pub fn release(&mut self, index: usize) {
        let entry = &mut self.entries[index];
        if entry.in_use {
            entry.in_use = false;
            entry.owner = 0;
            self.free.push(index);
            metrics::SLOTS_RELEASED.increment();
            metrics::SLOTS_HELD.decrement();
        }
    }

    /// The stream a slot is held by.
    pub fn owner(&self, index: usize) -> Option<u64> {
        let entry = &self.entries[index];
        entry.in_use.then_some(entry.owner)
    }

    /// Number of free slots.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release() {
        let mut slab = Slab::new(4, 64);
        assert_eq!(slab.free_count(), 4);
        assert_eq!(slab.slot_capacity(), 64);

        let index = slab.acquire(7).unwrap();
        assert_eq!(slab.free_count(), 3);
        assert_eq!(slab.owner(index), Some(7));

        slab.release(index);
        assert_eq!(slab.free_count(), 4);
        assert_eq!(slab.owner(index), None);
    }

    #[test]
    fn release_is_idempotent() {
        let mut slab = Slab::new(2, 64);
        let index = slab.acquire(1).unwrap();
        slab.release(index);
        slab.release(index);
        assert_eq!(slab.free_count(), 2);
    }

    #[test]
    fn one_owner_per_slot() {
        let mut slab = Slab::new(2, 64);
        let a = slab.acquire(1).unwrap();
        let b = slab.acquire(2).unwrap();
        assert_ne!(a, b);
        assert_eq!(slab.owner(a), Some(1));
        assert_eq!(slab.owner(b), Some(2));
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut slab = Slab::new(1, 64);
        let _held = slab.acquire(1).unwrap();
        assert!(slab.acquire(2).is_none());
    }

    #[test]
    fn slot_content_survives_release() {
        let mut slab = Slab::new(1, 16);
        let index = slab.acquire(1).unwrap();
        slab.buffer_mut(index)[..5].copy_from_slice(b"hello");
        slab.release(index);
        let again = slab.acquire(2).unwrap();
        assert_eq!(again, index);
        assert_eq!(&slab.buffer_mut(again)[..5], b"hello");
    }

    #[test]
    fn take_and_put_back() {
        let mut slab = Slab::new(1, 16);
        let index = slab.acquire(1).unwrap();
        slab.buffer_mut(index)[..3].copy_from_slice(b"abc");

        let data = slab.take(index);
        assert_eq!(&data[..3], b"abc");
        slab.put_back(index, data);
        assert_eq!(&slab.buffer_mut(index)[..3], b"abc");
    }

    #[test]
    fn release_while_loaned_keeps_allocation() {
        let mut slab = Slab::new(1, 16);
        let index = slab.acquire(1).unwrap();
        let data = slab.take(index);
        slab.release(index);
        slab.put_back(index, data);

        let again = slab.acquire(2).unwrap();
        assert_eq!(again, index);
        assert_eq!(slab.buffer_mut(again).len(), 16);
    }
}
