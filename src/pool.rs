// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Public API: `ThreadPool`, `PoolBuilder`, and the `Future<T>` handle
//! returned by `submit_future` (`threadpool_create`/`_goroutine`/
//! `_gofuture`/`_get`/`_destroy` in the C original).

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;

use crate::error::PoolError;
use crate::gate::Gate;
use crate::manager::{self, ManagerState, PoolStatus};
use crate::task::{Event, Task};
use crate::worker::{self, WorkerInbox};

/// State shared by the pool handle, the manager thread, and every
/// worker thread. Stays alive as long as any of them hold a clone of
/// the surrounding `Arc` — there is no separate teardown step beyond
/// the manager dropping its own clone once every worker has exited.
pub(crate) struct PoolInner {
    pub inform: Gate<ManagerState>,
    pub join: Gate<()>,
    pub worker_inboxes: Vec<WorkerInbox>,
    pub reject_after_shutdown: bool,
}

impl PoolInner {
    pub fn report_worker_done(&self, worker: usize) {
        self.inform
            .signal(|state| state.event_ring.push(Event::WorkerDone(worker)));
    }

    fn is_draining(&self) -> bool {
        self.inform.lock(|state| state.status == PoolStatus::Draining)
    }
}

/// A result-bearing task's handle. Consuming `get` (or `try_get`) is the
/// only way to read the result, which is how "await at most once" is
/// enforced at the type level rather than at runtime.
pub struct Future<T> {
    pool: Arc<PoolInner>,
    index: usize,
    _marker: PhantomData<T>,
}

/// The task backing a [`Future`] panicked instead of returning normally.
#[derive(Debug, thiserror::Error)]
#[error("task panicked: {0}")]
pub struct TaskPanicked(pub String);

impl<T: Send + 'static> Future<T> {
    /// Blocks until the task completes, returning its panic message on
    /// the error side instead of propagating the panic into this
    /// thread.
    pub fn try_get(self) -> Result<T, TaskPanicked> {
        let slot = self.pool.inform.lock(|state| state.future_slab.slot(self.index));
        let outcome = slot.gate.wait_consume(|cell| {
            cell.take()
                .expect("future slot signaled without an outcome")
        });
        self.pool
            .inform
            .lock(|state| state.future_slab.release(self.index));
        match outcome {
            Ok(boxed) => Ok(*downcast(boxed)),
            Err(message) => Err(TaskPanicked(message)),
        }
    }

    /// Blocks until the task completes, returning its value. Panics if
    /// the task itself panicked, re-raising the original message.
    pub fn get(self) -> T {
        match self.try_get() {
            Ok(value) => value,
            Err(TaskPanicked(message)) => panic!("{message}"),
        }
    }
}

fn downcast<T: 'static>(boxed: Box<dyn Any + Send>) -> Box<T> {
    boxed
        .downcast::<T>()
        .unwrap_or_else(|_| panic!("future slot held a value of the wrong type"))
}

/// A fixed-size worker thread pool.
///
/// Cloning a `ThreadPool` is cheap (it's a thin handle over a shared
/// `Arc`) and all clones refer to the same pool. Dropping the last
/// handle does not stop the pool — call [`ThreadPool::shutdown`]
/// explicitly, since an in-flight future or a concurrently running
/// routine may still need it.
pub struct ThreadPool {
    inner: Arc<PoolInner>,
}

impl ThreadPool {
    /// Equivalent to `PoolBuilder::new(workers).build()`.
    pub fn new(workers: usize) -> ThreadPool {
        PoolBuilder::new(workers).build()
    }

    pub fn builder(workers: usize) -> PoolBuilder {
        PoolBuilder::new(workers)
    }

    /// Submits a fire-and-forget task. Always succeeds from the
    /// caller's point of view: after a shutdown has been requested the
    /// task is silently dropped rather than run. Use
    /// [`ThreadPool::try_submit_routine`] if the pool was built with
    /// [`PoolBuilder::reject_after_shutdown`] and the caller needs to
    /// know which outcome occurred.
    pub fn submit_routine<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_task(Task::routine(f));
    }

    /// Like [`ThreadPool::submit_routine`], but reports rejection as an
    /// error when the pool was built with
    /// [`PoolBuilder::reject_after_shutdown(true)`] and a shutdown is
    /// already in progress.
    pub fn try_submit_routine<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.check_rejection()?;
        self.post_task(Task::routine(f));
        Ok(())
    }

    /// Submits a task and returns a handle to its eventual result.
    ///
    /// If the pool is draining or has already been shut down, the task
    /// may never run; the returned `Future` will then block forever on
    /// `get`/`try_get`. This mirrors the pool's deliberately racy
    /// shutdown path — see [`ThreadPool::shutdown`].
    pub fn submit_future<F, T>(&self, f: F) -> Future<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.post_future(f)
    }

    pub fn try_submit_future<F, T>(&self, f: F) -> Result<Future<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.check_rejection()?;
        Ok(self.post_future(f))
    }

    /// Clears the join gate on the producer's own thread before the
    /// event ever reaches the manager, so a `join()` sequenced after
    /// this call on the same or another thread cannot observe the
    /// stale "quiescent" flag from before this submission. Clearing
    /// inside the manager's `task-submitted` handler instead would
    /// race: the manager only gets to it after waking from its own
    /// wait, by which time a `submit_*`-then-`join()` caller may have
    /// already sailed through `join` on the old signal.
    fn post_task(&self, task: Task) {
        self.inner.join.clear();
        self.inner
            .inform
            .signal(|state| state.event_ring.push(Event::TaskSubmitted(task)));
    }

    fn post_future<F, T>(&self, f: F) -> Future<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let index = self
            .inner
            .inform
            .lock(|state| state.future_slab.allocate());
        let boxed: Box<dyn FnOnce() -> Box<dyn Any + Send> + Send> =
            Box::new(move || Box::new(f()) as Box<dyn Any + Send>);
        self.post_task(Task::future(index, boxed));
        Future {
            pool: self.inner.clone(),
            index,
            _marker: PhantomData,
        }
    }

    fn check_rejection(&self) -> Result<(), PoolError> {
        if self.inner.reject_after_shutdown && self.inner.is_draining() {
            return Err(PoolError::ShuttingDown);
        }
        Ok(())
    }

    /// Blocks until every worker is idle and the task ring is empty.
    /// Level-triggered: concurrent callers all observe the same
    /// completion and unblock together, and the flag is cleared only by
    /// the next submission (synchronously, on the submitting thread),
    /// not by `join` itself.
    pub fn join(&self) {
        self.inner.join.wait_peek(|_| ());
    }

    /// Requests a graceful shutdown and returns immediately. The
    /// manager thread drains outstanding work, tells every worker to
    /// exit, joins their OS threads, and then exits itself; none of
    /// that is awaited here; dropping this handle does not block.
    pub fn shutdown(self) {
        self.post_task_event(Event::ShutdownRequested);
    }

    fn post_task_event(&self, event: Event) {
        self.inner.inform.signal(|state| state.event_ring.push(event));
    }
}

impl Clone for ThreadPool {
    fn clone(&self) -> ThreadPool {
        ThreadPool {
            inner: self.inner.clone(),
        }
    }
}

/// Configures and creates a [`ThreadPool`].
pub struct PoolBuilder {
    workers: usize,
    ring_capacity: usize,
    slab_capacity: usize,
    thread_name_prefix: String,
    reject_after_shutdown: bool,
}

impl PoolBuilder {
    pub fn new(workers: usize) -> PoolBuilder {
        PoolBuilder {
            workers: workers.max(1),
            ring_capacity: 64,
            slab_capacity: 64,
            thread_name_prefix: "threadpool-worker".to_string(),
            reject_after_shutdown: false,
        }
    }

    /// Initial capacity for both the event ring and the task ring.
    /// Generous pre-sizing avoids early growth; both rings still grow
    /// on demand regardless of this value.
    pub fn ring_capacity(mut self, capacity: usize) -> PoolBuilder {
        self.ring_capacity = capacity;
        self
    }

    /// Initial capacity for the future slab.
    pub fn slab_capacity(mut self, capacity: usize) -> PoolBuilder {
        self.slab_capacity = capacity;
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> PoolBuilder {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// When `true`, `try_submit_routine`/`try_submit_future` return
    /// [`PoolError::ShuttingDown`] once a shutdown has been requested
    /// instead of silently dropping the task. Defaults to `false`,
    /// matching the original's unconditional silent-drop behavior.
    pub fn reject_after_shutdown(mut self, reject: bool) -> PoolBuilder {
        self.reject_after_shutdown = reject;
        self
    }

    pub fn build(self) -> ThreadPool {
        let worker_count = self.workers;
        log::debug!("starting pool with {worker_count} workers");
        let state = ManagerState::new(worker_count, self.ring_capacity, self.slab_capacity);
        let inner = Arc::new(PoolInner {
            inform: Gate::new(state),
            join: Gate::new(()),
            worker_inboxes: (0..worker_count).map(|_| WorkerInbox::new()).collect(),
            reject_after_shutdown: self.reject_after_shutdown,
        });
        // The pool is idle and empty at creation; reflect that in the
        // join gate immediately rather than waiting for a first
        // worker-done event that may never come.
        inner.join.signal(|_| ());

        let worker_threads: Vec<thread::JoinHandle<()>> = (0..worker_count)
            .map(|i| worker::spawn(inner.clone(), i, &self.thread_name_prefix))
            .collect();

        let manager_pool = inner.clone();
        thread::Builder::new()
            .name(format!("{}-manager", self.thread_name_prefix))
            .spawn(move || manager::run(manager_pool, worker_threads))
            .expect("failed to spawn manager thread");

        ThreadPool { inner }
    }
}
