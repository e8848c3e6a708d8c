// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The binary signaling primitive the rest of the pool is built on
//! (concurrency core/Gate).
//!
//! A `Gate<T>` fuses a mutex, a condition variable, and a "signaled"
//! flag with the payload the signal is actually about. Folding the
//! payload into the same lock is what lets every mutation of pool
//! state funnel through a single critical section without a separate
//! lock per structure — the same role `(Mutex<bool>, Condvar)` pairs
//! play in a work-stealing scheduler, generalized with the closure-
//! based access a plain data mutex would use.

use std::sync::{Condvar, Mutex, MutexGuard};

struct GateState<T> {
    signaled: bool,
    payload: T,
}

/// A reusable binary condition variable guarding a payload of type `T`.
///
/// The five operations below are the only way the flag or payload are
/// ever touched: a thread transitions the flag only while holding the
/// mutex, and the flag observed on wakeup is always `true`.
pub(crate) struct Gate<T> {
    state: Mutex<GateState<T>>,
    condvar: Condvar,
}

impl<T> Gate<T> {
    pub fn new(payload: T) -> Self {
        Gate {
            state: Mutex::new(GateState {
                signaled: false,
                payload,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Ordinary mutual exclusion: lock, run `f`, unlock. Does not touch
    /// the signaled flag and never blocks on the condition variable.
    ///
    /// Used for submission-path bookkeeping (future-slot allocation)
    /// that must run with exclusive access to the payload but is not
    /// itself the event being signaled.
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire();
        f(&mut guard.payload)
    }

    /// Producer-signal: while holding the mutex, run `f` and mark the
    /// flag set; release the mutex; then wake exactly one waiter.
    ///
    /// Signal-after-unlock avoids the spurious re-block a waiter would
    /// suffer if it woke, found the mutex still held, and had to wait
    /// on the scheduler again before observing the new state.
    pub fn signal<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire();
        let result = f(&mut guard.payload);
        guard.signaled = true;
        drop(guard);
        self.condvar.notify_one();
        result
    }

    /// Producer-clear: while holding the mutex, clear the flag; release.
    pub fn clear(&self) {
        let mut guard = self.acquire();
        guard.signaled = false;
    }

    /// Consumer-wait + consumer-done, fused: block until signaled, run
    /// `f` against the payload while still holding the mutex, clear the
    /// flag, then release.
    ///
    /// This is the pairing the manager loop and a one-shot future await
    /// use: the caller is the sole consumer of this signal and the next
    /// producer starts the cycle over from "clear".
    pub fn wait_consume<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire();
        while !guard.signaled {
            guard = self.condvar.wait(guard).unwrap();
        }
        let result = f(&mut guard.payload);
        guard.signaled = false;
        result
    }

    /// Consumer-wait without consumer-done: block until signaled, run
    /// `f` against the payload, release the mutex *without* clearing
    /// the flag.
    ///
    /// Level-triggered: any number of concurrent callers observe the
    /// same "signaled" state and all return together. Used by `join`,
    /// where the flag is cleared by the next submission rather than by
    /// the waiter — see [`crate::pool::ThreadPool::join`].
    pub fn wait_peek<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let mut guard = self.acquire();
        while !guard.signaled {
            guard = self.condvar.wait(guard).unwrap();
        }
        f(&guard.payload)
    }

    fn acquire(&self) -> MutexGuard<'_, GateState<T>> {
        self.state.lock().unwrap()
    }
}
