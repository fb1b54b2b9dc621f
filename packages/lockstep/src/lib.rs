#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Fixed-size worker pool that executes one task per worker in explicitly released phases.
//!
//! The pool exists to time compute kernels running in parallel on every worker. Thread creation
//! happens once, when the pool is built; after that, every phase reuses the same threads:
//!
//! 1. **Submit** up to one [`Task`] per worker. Nothing runs yet.
//! 2. **Release** the phase. Worker `i` receives the task in queue slot `i` and starts running it.
//! 3. **Wait** until every released task has completed.
//!
//! Taking a timestamp right before release and right after wait therefore brackets the parallel
//! execution of the tasks and nothing else.
//!
//! # Example
//!
//! ```rust
//! use std::hint::black_box;
//! use std::time::Instant;
//!
//! use lockstep::{Pool, Task};
//! use new_zealand::nz;
//!
//! fn kernel() {
//!     let mut x = 1.0_f64;
//!     for _ in 0..1000 {
//!         x = black_box(x * 1.000_001 + 0.5);
//!     }
//!     black_box(x);
//! }
//!
//! let mut pool = Pool::new(nz!(2))?;
//!
//! // Warm-up phase, not measured.
//! pool.run_phase(|| Task::from_fn(kernel))?;
//!
//! for _ in 0..pool.worker_count().get() {
//!     pool.submit(Task::from_fn(kernel))?;
//! }
//!
//! let start = Instant::now();
//! pool.release()?;
//! pool.wait()?;
//! let elapsed = start.elapsed();
//!
//! println!("phase took {elapsed:?}");
//!
//! pool.shutdown()?;
//! # Ok::<(), lockstep::Error>(())
//! ```
//!
//! # Misuse
//!
//! The phase protocol is strict. Submitting into a released phase, submitting more tasks than
//! there are workers, waiting for a phase that was never released, shutting down while a phase is
//! in flight and using the pool after shutdown are all reported as errors at the offending call.
//!
//! # Panics
//!
//! A task that panics does not take down its worker. The panic is contained, the phase completes
//! and [`Pool::wait()`] reports [`Error::TaskPanicked`].

mod error;
mod metrics;
mod phase;
mod pool;
mod queue;
mod task;
mod worker;

pub use error::*;
pub(crate) use phase::*;
pub use pool::*;
pub(crate) use queue::*;
pub use task::*;
pub(crate) use worker::*;
