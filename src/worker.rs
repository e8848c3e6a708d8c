// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Fixed worker threads (`Worker`/`_worker_run` in the C original).
//!
//! Each worker is a named OS thread that waits on its own wakeup gate,
//! runs whatever task the manager placed in its inbox, and reports back
//! through the inform gate. Panics inside a task are caught rather than
//! left to unwind into the worker thread's entry point — a routine or
//! future that panics must not take the rest of the pool down with it,
//! which the C original's single-process demo never had to worry about.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::gate::Gate;
use crate::pool::PoolInner;
use crate::task::{Task, TaskBody, TaskOutcome};

/// The shared, per-worker half of a worker: its inbox (wakeup gate plus
/// the single task slot it guards) and its last-result cell. These are
/// the only pieces of worker state a thread other than the worker
/// itself ever touches, and each is its own single-producer/single-
/// consumer handoff rather than being folded into the manager's lock.
pub(crate) struct WorkerInbox {
    pub gate: Gate<Option<Task>>,
    pub last_result: Mutex<Option<TaskOutcome>>,
}

impl WorkerInbox {
    pub fn new() -> WorkerInbox {
        WorkerInbox {
            gate: Gate::new(None),
            last_result: Mutex::new(None),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker task panicked with a non-string payload".to_string()
    }
}

/// Body of a worker thread: block for the next task, run it, report
/// completion, repeat until a `Die` task is received.
pub(crate) fn run(pool: Arc<PoolInner>, index: usize) {
    loop {
        let task = pool.worker_inboxes[index]
            .gate
            .wait_consume(|slot| slot.take().expect("worker woken with an empty inbox"));
        match task.body {
            TaskBody::Die => break,
            TaskBody::Routine(f) => {
                if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
                    log::warn!(
                        "worker {index} routine panicked: {}",
                        panic_message(payload)
                    );
                }
                pool.report_worker_done(index);
            }
            TaskBody::Future(_, f) => {
                let outcome = catch_unwind(AssertUnwindSafe(f)).map_err(panic_message);
                *pool.worker_inboxes[index].last_result.lock().unwrap() = Some(outcome);
                pool.report_worker_done(index);
            }
        }
    }
}

pub(crate) fn spawn(
    pool: Arc<PoolInner>,
    index: usize,
    name_prefix: &str,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name(format!("{name_prefix}-{index}"))
        .spawn(move || run(pool, index))
        .expect("failed to spawn worker thread")
}
