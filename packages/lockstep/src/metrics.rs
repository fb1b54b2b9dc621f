//! Metrics for the lockstep worker pool.

use nm::{Event, Magnitude};

/// Histogram buckets for phase duration in milliseconds.
///
/// A phase lasts as long as its slowest task. Compute kernels typically run for somewhere
/// between a few hundred milliseconds and a few seconds; test phases are much shorter.
const PHASE_DURATION_MS_BUCKETS: &[Magnitude] = &[0, 1, 10, 50, 100, 250, 500, 1000, 2500, 5000];

thread_local! {
    /// Time between a phase being released and the completion of its last task, as observed by
    /// the thread that waits for the phase.
    pub(crate) static PHASE_DURATION_MS: Event = Event::builder()
        .name("lockstep_phase_duration_ms")
        .histogram(PHASE_DURATION_MS_BUCKETS)
        .build();

    /// Tasks executed by workers, including tasks that panicked.
    pub(crate) static TASKS_EXECUTED: Event = Event::builder()
        .name("lockstep_tasks_executed")
        .build();
}
