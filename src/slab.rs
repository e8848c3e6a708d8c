// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Arena of future result slots, addressed by index (`FutureSlab`).
//!
//! Mirrors `_future_list_create`/`_future_get_next`/`_future_put_available`
//! from the C original: a free-index stack layered over bump-pointer
//! allocation, with coarse compaction when the free stack fills up.
//! Slots are individually heap-allocated behind `Arc` so a client thread
//! can hold onto one across a blocking wait without needing the slab's
//! own growth to keep that reference valid — the slab array itself may
//! reallocate out from under it, the `Arc` doesn't care.

use std::sync::Arc;

use crate::gate::Gate;
use crate::task::TaskOutcome;

/// A single future's result cell. Starts unsignaled; the manager signals
/// it exactly once, with the task's outcome, after the owning worker
/// reports completion.
pub(crate) struct FutureSlot {
    pub gate: Gate<Option<TaskOutcome>>,
}

impl FutureSlot {
    fn new() -> Arc<FutureSlot> {
        Arc::new(FutureSlot {
            gate: Gate::new(None),
        })
    }
}

pub(crate) struct FutureSlab {
    slots: Vec<Arc<FutureSlot>>,
    free: Vec<usize>,
    high_water: usize,
    /// Debug-only bookkeeping: `allocated[i]` is true iff slot `i` is
    /// currently outstanding. Never read in release builds.
    #[cfg(debug_assertions)]
    allocated: Vec<bool>,
}

impl FutureSlab {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        FutureSlab {
            slots: (0..capacity).map(|_| FutureSlot::new()).collect(),
            free: Vec::with_capacity(capacity),
            high_water: 0,
            #[cfg(debug_assertions)]
            allocated: vec![false; capacity],
        }
    }

    /// Returns a free index, preferring a released one over bumping the
    /// high-water mark; doubles the slot array if every slot issued so
    /// far is outstanding.
    pub fn allocate(&mut self) -> usize {
        if let Some(index) = self.free.pop() {
            #[cfg(debug_assertions)]
            {
                debug_assert!(!self.allocated[index], "double allocation of future slot {index}");
                self.allocated[index] = true;
            }
            return index;
        }
        if self.high_water == self.slots.len() {
            let new_len = self.slots.len() * 2;
            self.slots.resize_with(new_len, FutureSlot::new);
            #[cfg(debug_assertions)]
            self.allocated.resize(new_len, false);
        }
        let index = self.high_water;
        self.high_water += 1;
        #[cfg(debug_assertions)]
        {
            debug_assert!(!self.allocated[index], "double allocation of future slot {index}");
            self.allocated[index] = true;
        }
        index
    }

    /// Returns `index` to the free stack. If every issued slot is now
    /// free, resets the free stack and high-water mark to zero instead
    /// of letting the free stack grow unboundedly — safe because no
    /// slot is outstanding at that point.
    pub fn release(&mut self, index: usize) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.allocated[index], "double release of future slot {index}");
            self.allocated[index] = false;
        }
        if self.free.len() == self.slots.len() {
            self.free.clear();
            self.high_water = 0;
        }
        self.free.push(index);
    }

    pub fn slot(&self, index: usize) -> Arc<FutureSlot> {
        self.slots[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_reuses_released_indices() {
        let mut slab = FutureSlab::with_capacity(4);
        let a = slab.allocate();
        let b = slab.allocate();
        assert_ne!(a, b);
        slab.release(a);
        let c = slab.allocate();
        assert_eq!(a, c);
    }

    #[test]
    fn allocate_grows_past_initial_capacity() {
        let mut slab = FutureSlab::with_capacity(2);
        let indices: Vec<usize> = (0..100).map(|_| slab.allocate()).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), indices.len());
    }

    #[test]
    fn compacts_when_every_slot_is_free() {
        let mut slab = FutureSlab::with_capacity(4);
        let indices: Vec<usize> = (0..4).map(|_| slab.allocate()).collect();
        for i in &indices {
            slab.release(*i);
        }
        // All four slots are free; the next allocation should come from
        // the reset state (index 0) rather than growing further.
        let next = slab.allocate();
        assert_eq!(next, 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "double release")]
    fn double_release_trips_the_debug_assertion() {
        let mut slab = FutureSlab::with_capacity(4);
        let a = slab.allocate();
        slab.release(a);
        slab.release(a);
    }

    #[test]
    fn identity_preserved_across_many_futures() {
        let mut slab = FutureSlab::with_capacity(8);
        let mut live = Vec::new();
        for _ in 0..100 {
            let idx = slab.allocate();
            let slot = slab.slot(idx);
            slot.gate.signal(|v| *v = Some(Ok(Box::new(idx))));
            live.push((idx, slot));
        }
        for (idx, slot) in live {
            let got = slot.gate.wait_consume(|v| v.take());
            let boxed = got.unwrap().unwrap();
            assert_eq!(*boxed.downcast::<usize>().unwrap(), idx);
        }
    }
}
