//! Worker thread logic: wait for an assigned task, run it, report completion.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::metrics::TASKS_EXECUTED;
use crate::{Shared, Task};

#[derive(Debug)]
pub(crate) enum Wakeup {
    Run(Task),
    Exit,
}

/// Blocks until the worker with the given index has been assigned a task or the pool is
/// shutting down.
///
/// An assigned task always takes precedence over shutdown, so a phase that was released can
/// never be left with outstanding tasks.
pub(crate) fn next_assignment(shared: &Shared, index: usize) -> Wakeup {
    let wake = shared
        .wake
        .get(index)
        .expect("worker index is always within the pool");

    let mut state = shared.state.lock();

    loop {
        if let Some(task) = state.queue.take_assigned(index) {
            return Wakeup::Run(task);
        }

        if state.shutting_down {
            return Wakeup::Exit;
        }

        wake.wait(&mut state);
    }
}

/// Records the completion of one assigned task, waking the waiting thread if it was the last
/// outstanding task of the phase.
pub(crate) fn complete(shared: &Shared, panicked: bool) {
    let mut state = shared.state.lock();

    if panicked {
        state.panicked = state.panicked.wrapping_add(1);
    }

    state.outstanding = state
        .outstanding
        .checked_sub(1)
        .expect("a worker can only complete a task that was counted as outstanding");

    if state.outstanding == 0 {
        shared.done.notify_one();
    }
}

#[cfg_attr(test, mutants::skip)] // Impractical to test that things do not happen when the loop is gone.
pub(crate) fn worker_entrypoint(shared: &Shared, index: usize) {
    debug!(worker_index = index, "worker thread started");

    while let Wakeup::Run(task) = next_assignment(shared, index) {
        // The task runs without holding any pool lock. A panic is contained here so the phase
        // still completes and the worker stays available for the next phase.
        let panicked = panic::catch_unwind(AssertUnwindSafe(|| task.run())).is_err();

        if panicked {
            warn!(worker_index = index, "task panicked");
        }

        TASKS_EXECUTED.with(|e| e.observe_once());
        complete(shared, panicked);
    }

    debug!(worker_index = index, "worker thread exiting");
}
