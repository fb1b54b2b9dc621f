use std::num::NonZero;

use many_cpus::ProcessorSet;

use crate::Family;

/// How a benchmark run is carried out.
///
/// [`Config::default()`] reproduces a full-length run on every processor available to the
/// process, with one warm-up phase and one measured phase per kernel family.
#[derive(Clone, Debug)]
#[expect(
    clippy::exhaustive_structs,
    reason = "plain settings record, built with struct update syntax from the default"
)]
pub struct Config {
    /// Number of worker threads, each running one copy of the kernel per phase.
    pub threads: NonZero<usize>,

    /// Phases run before measuring, to bring the processor up to its sustained clock speed.
    pub warmup_phases: usize,

    /// Phases that are timed. The report shows the fastest of them.
    pub measured_phases: NonZero<usize>,

    /// Divisor applied to the default loop count of every family. Larger values give shorter,
    /// less accurate runs.
    pub scale: NonZero<u64>,

    /// Families to run. `None` runs every family the processor supports.
    pub families: Option<Vec<Family>>,

    /// Whether to pin each worker to its own processor among those available to the process.
    pub pin: bool,

    /// Whether to highlight figures with ANSI color sequences.
    pub color: bool,

    /// Whether to print the metrics collected by the worker pool after the report.
    pub metrics: bool,
}

impl Config {
    /// The number of kernel loop iterations each worker runs per phase for the given family.
    #[must_use]
    pub fn loops(&self, family: Family) -> u64 {
        #[expect(
            clippy::integer_division,
            reason = "a fraction of a loop iteration is meaningless"
        )]
        let loops = family.default_loops() / self.scale;

        loops.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: available_processors(),
            warmup_phases: 1,
            measured_phases: NonZero::<usize>::MIN,
            scale: NonZero::<u64>::MIN,
            families: None,
            pin: false,
            color: true,
            metrics: false,
        }
    }
}

/// The number of processors this process is allowed to use.
#[must_use]
pub fn available_processors() -> NonZero<usize> {
    NonZero::new(ProcessorSet::default().len()).unwrap_or(NonZero::<usize>::MIN)
}
