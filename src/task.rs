// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Task and event tags (`task_t`/`manager_event_t` in the C original).

use std::any::Any;

/// The outcome of running a future-kind task: the boxed return value, or
/// the panic payload (formatted) if the task unwound.
pub(crate) type TaskOutcome = Result<Box<dyn Any + Send>, String>;

pub(crate) enum TaskBody {
    /// Fire-and-forget: runs for its side effects only.
    Routine(Box<dyn FnOnce() + Send>),
    /// Result-bearing: the `usize` is the future slot this task's
    /// outcome must be stored into.
    Future(usize, Box<dyn FnOnce() -> Box<dyn Any + Send> + Send>),
    /// Tells the worker receiving it to exit its run loop.
    Die,
}

pub(crate) struct Task {
    pub body: TaskBody,
}

impl Task {
    pub fn routine(f: impl FnOnce() + Send + 'static) -> Task {
        Task {
            body: TaskBody::Routine(Box::new(f)),
        }
    }

    pub fn future(
        slot: usize,
        f: Box<dyn FnOnce() -> Box<dyn Any + Send> + Send>,
    ) -> Task {
        Task {
            body: TaskBody::Future(slot, f),
        }
    }

    pub fn die() -> Task {
        Task { body: TaskBody::Die }
    }
}

/// Events flow through the inform gate; the manager is their only
/// consumer.
pub(crate) enum Event {
    /// A task was submitted by a client thread.
    TaskSubmitted(Task),
    /// Worker `usize` finished whatever it was running and is idle again.
    WorkerDone(usize),
    /// A client asked the pool to start draining and shut down.
    ShutdownRequested,
}
