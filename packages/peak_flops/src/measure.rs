use std::num::NonZero;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lockstep::{Pool, Task};
use tracing::debug;

use crate::{Family, Kernel, Result};

/// Times one kernel family on every worker of the pool.
///
/// Runs `warmup_phases` untimed phases followed by `measured_phases` timed ones. Each phase
/// submits one task per worker, all sharing a single kernel closure, then brackets release and wait with a monotonic
/// clock, so the samples cover the parallel execution and the wakeup of the workers but not the
/// submission.
///
/// # Errors
///
/// Returns an error if the pool rejects a phase, for example because it was shut down or a
/// kernel panicked.
pub fn measure(
    pool: &mut Pool,
    kernel: Kernel,
    loops: u64,
    warmup_phases: usize,
    measured_phases: NonZero<usize>,
) -> Result<Measurement> {
    let family = kernel.family();
    let body = Arc::new(move || kernel.run(loops));

    for _ in 0..warmup_phases {
        pool.run_phase(|| Task::shared(&body))?;
    }

    let mut samples = Vec::with_capacity(measured_phases.get());

    for _ in 0..measured_phases.get() {
        for _ in 0..pool.worker_count().get() {
            pool.submit(Task::shared(&body))?;
        }

        let start = Instant::now();
        pool.release()?;
        pool.wait()?;
        let elapsed = start.elapsed();

        debug!(family = family.id(), ?elapsed, "measured phase");

        samples.push(elapsed);
    }

    Ok(Measurement {
        family,
        threads: pool.worker_count(),
        loops,
        samples,
    })
}

/// The timed phases of one kernel family.
#[derive(Clone, Debug)]
pub struct Measurement {
    family: Family,
    threads: NonZero<usize>,
    loops: u64,
    samples: Vec<Duration>,
}

impl Measurement {
    /// Assembles a measurement from already collected samples.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is empty.
    #[must_use]
    pub fn new(family: Family, threads: NonZero<usize>, loops: u64, samples: Vec<Duration>) -> Self {
        assert!(!samples.is_empty(), "a measurement needs at least one sample");

        Self {
            family,
            threads,
            loops,
            samples,
        }
    }

    /// The measured family.
    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    /// Number of workers that ran the kernel concurrently in every phase.
    #[must_use]
    pub fn threads(&self) -> NonZero<usize> {
        self.threads
    }

    /// Loop iterations each worker ran per phase.
    #[must_use]
    pub fn loops(&self) -> u64 {
        self.loops
    }

    /// Wall-clock duration of every timed phase, in the order they ran.
    #[must_use]
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// The fastest timed phase.
    #[must_use]
    pub fn best(&self) -> Duration {
        self.samples
            .iter()
            .copied()
            .min()
            .expect("a measurement always holds at least one sample")
    }

    /// Total arithmetic operations performed by all workers in one phase.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "throughput figures are reported with four decimals"
    )]
    pub fn operations(&self) -> f64 {
        self.family.ops_per_loop() as f64 * self.loops as f64 * self.threads.get() as f64
    }

    /// Throughput of the fastest phase, in billions of operations per second.
    ///
    /// Returns zero if the fastest phase took no measurable time.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let seconds = self.best().as_secs_f64();

        if seconds <= 0.0 {
            return 0.0;
        }

        self.operations() / seconds * 1e-9
    }

    /// Standard deviation of the samples relative to their mean.
    ///
    /// Returns `None` when there are fewer than two samples or their mean is zero.
    #[must_use]
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }

        #[expect(clippy::cast_precision_loss, reason = "sample counts are tiny")]
        let count = self.samples.len() as f64;

        let mean = self.samples.iter().map(Duration::as_secs_f64).sum::<f64>() / count;

        if mean <= 0.0 {
            return None;
        }

        let variance = self
            .samples
            .iter()
            .map(|sample| (sample.as_secs_f64() - mean).powi(2))
            .sum::<f64>()
            / count;

        Some(variance.sqrt() / mean)
    }
}
