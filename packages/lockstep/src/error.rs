use std::io;

use thiserror::Error;

/// Errors reported by the [`Pool`][crate::Pool] lifecycle operations.
///
/// Apart from [`Error::Spawn`] and [`Error::TaskPanicked`], every variant describes a usage
/// violation: the caller configured the pool wrongly or invoked an operation out of order. These are programming errors in the
/// caller and are never retried internally. Use [`Error::is_usage_violation()`] to tell them apart.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The operating system refused to create a worker thread.
    ///
    /// Any workers created before the failure have already been stopped and joined by the time
    /// this error is returned.
    #[error("failed to spawn worker thread {worker_index}: {source}")]
    Spawn {
        /// Index of the worker whose thread could not be created.
        worker_index: usize,

        /// The error reported by the operating system.
        source: io::Error,
    },

    /// The worker thread name prefix contains a NUL byte, which thread names cannot hold.
    #[error("thread name prefix {prefix:?} contains a NUL byte")]
    InvalidThreadName {
        /// The rejected prefix.
        prefix: String,
    },

    /// A task was submitted but every slot of the task queue is already occupied.
    #[error("task queue is full: a phase accepts at most {capacity} tasks")]
    QueueFull {
        /// The number of workers in the pool, which is also the queue capacity.
        capacity: usize,
    },

    /// The operation is only valid while no phase is in flight but one was released and has
    /// not yet been waited for.
    #[error("a phase is in flight; wait for it to complete first")]
    PhaseInFlight,

    /// [`Pool::wait()`][crate::Pool::wait] was called but no phase has been released.
    #[error("no phase is in flight; release a phase before waiting for it")]
    NoPhaseInFlight,

    /// [`Pool::release()`][crate::Pool::release] was called with no tasks submitted.
    #[error("cannot release a phase with no submitted tasks")]
    EmptyPhase,

    /// The pool has already been shut down and cannot be used anymore.
    #[error("the pool has been shut down")]
    ShutDown,

    /// One or more tasks of the completed phase panicked.
    ///
    /// The phase is closed and the pool remains usable; the workers that ran the panicking tasks
    /// are still alive.
    #[error("{count} task(s) panicked during the phase")]
    TaskPanicked {
        /// How many tasks of the phase panicked.
        count: usize,
    },
}

impl Error {
    /// Whether the error describes an operation invoked out of order by the caller, as opposed
    /// to a failure reported by the operating system or by a task.
    #[must_use]
    pub fn is_usage_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidThreadName { .. }
                | Self::QueueFull { .. }
                | Self::PhaseInFlight
                | Self::NoPhaseInFlight
                | Self::EmptyPhase
                | Self::ShutDown
        )
    }
}

/// A specialized `Result` type for pool operations, returning the crate's [`Error`] type as the
/// error value.
pub type Result<T> = std::result::Result<T, Error>;
