// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! A fixed-size worker thread pool with fire-and-forget routines and
//! future-returning tasks.
//!
//! A single manager thread serializes every scheduling decision behind
//! one mutex (the "inform gate"): submissions, worker completions, and
//! shutdown requests are all just events it drains and dispatches one
//! at a time. N fixed worker threads wait on their own per-worker gate,
//! run whatever task lands in their inbox, and report back through the
//! manager's event ring. A future's result travels through its own
//! slot in a growable slab, addressed by index rather than by pointer
//! so the slab can reallocate without invalidating anything a client
//! thread is holding onto.
//!
//! ```no_run
//! use threadpool_core::ThreadPool;
//!
//! let pool = ThreadPool::new(4);
//! pool.submit_routine(|| println!("fire and forget"));
//! let result = pool.submit_future(|| 2 + 2);
//! assert_eq!(result.get(), 4);
//! pool.join();
//! pool.shutdown();
//! ```

mod error;
mod gate;
mod manager;
mod pool;
mod ring;
mod slab;
mod task;
mod worker;

pub use error::PoolError;
pub use pool::{Future, PoolBuilder, TaskPanicked, ThreadPool};
