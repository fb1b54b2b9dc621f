//! State shared between the pool and its workers.

use std::any::type_name;
use std::fmt;
use std::num::NonZero;

use parking_lot::{Condvar, Mutex};

use crate::TaskQueue;

pub(crate) struct Shared {
    pub(crate) state: Mutex<PhaseState>,

    /// One wake signal per worker, so releasing a phase only wakes the workers that were
    /// assigned a task.
    pub(crate) wake: Box<[Condvar]>,

    /// Signaled by the worker that completes the last outstanding task of a phase.
    pub(crate) done: Condvar,
}

#[derive(Debug)]
pub(crate) struct PhaseState {
    pub(crate) queue: TaskQueue,

    /// Number of phases released so far.
    pub(crate) generation: u64,

    /// Set by release, cleared by the wait that observes the phase completing.
    pub(crate) in_flight: bool,

    /// Assigned tasks of the in-flight phase that have not yet completed.
    pub(crate) outstanding: usize,

    /// Tasks of the in-flight phase that panicked.
    pub(crate) panicked: usize,

    pub(crate) shutting_down: bool,
}

impl Shared {
    pub(crate) fn new(worker_count: NonZero<usize>) -> Self {
        Self {
            state: Mutex::new(PhaseState {
                queue: TaskQueue::new(worker_count),
                generation: 0,
                in_flight: false,
                outstanding: 0,
                panicked: 0,
                shutting_down: false,
            }),
            wake: (0..worker_count.get()).map(|_| Condvar::new()).collect(),
            done: Condvar::new(),
        }
    }

    /// Tells every worker to exit once it is idle.
    #[cfg_attr(test, mutants::skip)] // Removing this causes timeouts (workers never stop).
    pub(crate) fn signal_shutdown(&self) {
        self.state.lock().shutting_down = true;

        for wake in &self.wake {
            wake.notify_one();
        }
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("state", &*self.state.lock())
            .field("worker_count", &self.wake.len())
            .finish_non_exhaustive()
    }
}
