// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Growable FIFO ring buffer backing both the event queue and the task
//! queue (`Ring<T>`).
//!
//! A raw `Vec<Option<T>>` with explicit head/tail indices, rather than
//! `VecDeque`, so the doubling-with-wraparound-copy growth strategy
//! mirrors the C original byte for byte instead of hiding behind a
//! standard-library ring that already solves this differently.

pub(crate) struct Ring<T> {
    buf: Vec<Option<T>>,
    head: usize,
    tail: usize,
    cap: usize,
}

impl<T> Ring<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = capacity.max(2);
        let mut buf = Vec::with_capacity(cap);
        buf.resize_with(cap, || None);
        Ring {
            buf,
            head: 0,
            tail: 0,
            cap,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    fn is_full(&self) -> bool {
        (self.tail + 1) % self.cap == self.head
    }

    pub fn push(&mut self, value: T) {
        if self.is_full() {
            self.grow();
        }
        self.buf[self.tail] = Some(value);
        self.tail = (self.tail + 1) % self.cap;
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.buf[self.head].take();
        self.head = (self.head + 1) % self.cap;
        value
    }

    /// Doubles capacity. If the live range wraps (`head > tail`), the
    /// prefix `[0, tail)` is copied past the old capacity so the live
    /// range becomes contiguous again, matching `_event_queue_push`'s
    /// growth in the C original.
    fn grow(&mut self) {
        let old_cap = self.cap;
        let new_cap = old_cap * 2;
        self.buf.resize_with(new_cap, || None);
        if self.head > self.tail {
            for i in 0..self.tail {
                self.buf[old_cap + i] = self.buf[i].take();
            }
            self.tail += old_cap;
        }
        self.cap = new_cap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut ring = Ring::with_capacity(4);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut ring = Ring::with_capacity(2);
        for i in 0..1000 {
            ring.push(i);
        }
        for i in 0..1000 {
            assert_eq!(ring.pop(), Some(i));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn grows_correctly_when_live_range_wraps() {
        let mut ring = Ring::with_capacity(4);
        // Advance head/tail around the ring before forcing growth so
        // the live range wraps when capacity doubles.
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        ring.push(4);
        ring.push(5);
        // head=2, tail=1 (wrapped): buf holds [_, 5, 3, 4] logically as 3,4,5.
        ring.push(6); // forces growth
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), Some(4));
        assert_eq!(ring.pop(), Some(5));
        assert_eq!(ring.pop(), Some(6));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn overflow_with_many_items_preserves_fifo() {
        let mut ring = Ring::with_capacity(2);
        let n = 15_000;
        let mut popped = Vec::with_capacity(n);
        for i in 0..n {
            ring.push(i);
            if i % 3 == 0 {
                if let Some(v) = ring.pop() {
                    popped.push(v);
                }
            }
        }
        while let Some(v) = ring.pop() {
            popped.push(v);
        }
        let mut sorted = popped.clone();
        sorted.sort_unstable();
        let expected: Vec<usize> = (0..n).collect();
        assert_eq!(sorted, expected);
    }
}
