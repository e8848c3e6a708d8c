// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The manager thread: the single serializer for every scheduling
//! decision (`_manager_run`/`_manager_handle_event_*`/`_manager_assign_task`
//! in the C original).
//!
//! All of the manager's mutable bookkeeping — the event queue, the task
//! queue, the future slab, the free-worker stack, and whether the pool
//! is still accepting work — lives inside [`ManagerState`], which is
//! itself the payload of the pool's inform gate. That is what lets a
//! single `wait_consume` call double as "wait for something to do" and
//! "hold exclusive access to everything I need to do it."

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::pool::PoolInner;
use crate::ring::Ring;
use crate::slab::FutureSlab;
use crate::task::{Event, Task, TaskBody};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum PoolStatus {
    Normal,
    Draining,
}

pub(crate) struct ManagerState {
    pub status: PoolStatus,
    pub event_ring: Ring<Event>,
    pub task_ring: Ring<Task>,
    pub future_slab: FutureSlab,
    pub free_workers: Vec<usize>,
    /// Per worker: `Some(slot)` if the task currently assigned to that
    /// worker is future-kind and must be stored into slot `slot` when
    /// the worker reports done; `None` for a routine or an idle worker.
    pub in_flight_future: Vec<Option<usize>>,
}

impl ManagerState {
    pub fn new(worker_count: usize, ring_capacity: usize, slab_capacity: usize) -> ManagerState {
        ManagerState {
            status: PoolStatus::Normal,
            event_ring: Ring::with_capacity(ring_capacity),
            task_ring: Ring::with_capacity(ring_capacity),
            future_slab: FutureSlab::with_capacity(slab_capacity),
            free_workers: (0..worker_count).rev().collect(),
            in_flight_future: vec![None; worker_count],
        }
    }

    fn idle_and_empty(&self) -> bool {
        self.free_workers.len() == self.in_flight_future.len() && self.task_ring.is_empty()
    }
}

/// Hands the next queued task to a free worker, if any of each is
/// available. Called after every event that might have created a new
/// (worker, task) pairing.
fn assign(pool: &PoolInner, state: &mut ManagerState) {
    while let Some(worker) = state.free_workers.pop() {
        let Some(task) = state.task_ring.pop() else {
            state.free_workers.push(worker);
            break;
        };
        if let TaskBody::Future(slot, _) = &task.body {
            state.in_flight_future[worker] = Some(*slot);
        }
        pool.worker_inboxes[worker]
            .gate
            .signal(|inbox| *inbox = Some(task));
    }
}

/// Returns `true` if teardown was performed and the manager loop should
/// exit.
fn dispatch(pool: &PoolInner, state: &mut ManagerState, event: Event) -> bool {
    match event {
        Event::TaskSubmitted(task) => {
            if state.status == PoolStatus::Draining {
                log::debug!("dropping task submitted after shutdown request");
                return false;
            }
            state.task_ring.push(task);
            assign(pool, state);
            false
        }
        Event::WorkerDone(worker) => {
            if let Some(slot) = state.in_flight_future[worker].take() {
                let outcome = pool.worker_inboxes[worker]
                    .last_result
                    .lock()
                    .unwrap()
                    .take()
                    .expect("worker reported done without recording an outcome");
                let slot_handle = state.future_slab.slot(slot);
                slot_handle.gate.signal(|cell| *cell = Some(outcome));
            }
            state.free_workers.push(worker);
            if state.idle_and_empty() {
                match state.status {
                    PoolStatus::Draining => {
                        log::debug!("pool drained, tearing down");
                        return true;
                    }
                    PoolStatus::Normal => pool.join.signal(|_| ()),
                }
            }
            assign(pool, state);
            false
        }
        Event::ShutdownRequested => {
            log::debug!("shutdown requested, draining");
            state.status = PoolStatus::Draining;
            state.idle_and_empty()
        }
    }
}

/// Drains every event currently queued, dispatching each while still
/// holding the inform gate's mutex. Returns `true` as soon as any event
/// triggers teardown; subsequent queued events (if any) are left
/// undispatched and are dropped along with the rest of pool state once
/// the pool's last `Arc` reference is released.
fn dispatch_all(pool: &PoolInner, state: &mut ManagerState) -> bool {
    while let Some(event) = state.event_ring.pop() {
        if dispatch(pool, state, event) {
            return true;
        }
    }
    false
}

fn teardown(pool: &Arc<PoolInner>, worker_threads: Vec<JoinHandle<()>>) {
    for inbox in &pool.worker_inboxes {
        inbox.gate.signal(|slot| *slot = Some(Task::die()));
    }
    for handle in worker_threads {
        let _ = handle.join();
    }
    log::debug!("manager thread exiting");
}

/// Body of the manager thread.
pub(crate) fn run(pool: Arc<PoolInner>, worker_threads: Vec<JoinHandle<()>>) {
    loop {
        let should_teardown = pool.inform.wait_consume(|state| dispatch_all(&pool, state));
        if should_teardown {
            break;
        }
    }
    teardown(&pool, worker_threads);
}
