use std::io::Write;

use lockstep::Pool;
use many_cpus::ProcessorSet;
use tracing::{debug, info, warn};

use crate::{
    Capabilities, Config, Error, Family, Kernel, Measurement, Result, measure, write_header,
    write_measurement,
};

/// Relative spread of the samples above which the result of a family is flagged as noisy.
const NOISY_VARIATION: f64 = 0.05;

/// Picks the kernels to run, in report order.
///
/// Without an explicit selection, every family the processor supports runs. An explicit
/// selection must be runnable in full.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFamily`] if an explicitly selected family cannot run here and
/// [`Error::NoKernels`] if nothing is left to run.
pub fn select_kernels(config: &Config, capabilities: Capabilities) -> Result<Vec<Kernel>> {
    let kernels = match &config.families {
        None => Family::ALL
            .into_iter()
            .filter_map(|family| family.kernel(capabilities))
            .collect::<Vec<_>>(),
        Some(families) => families
            .iter()
            .map(|&family| {
                family
                    .kernel(capabilities)
                    .ok_or_else(|| Error::UnsupportedFamily {
                        family,
                        missing: capabilities.missing(family.requires()),
                    })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    if kernels.is_empty() {
        return Err(Error::NoKernels);
    }

    Ok(kernels)
}

/// Runs the benchmark and writes the report to `out`.
///
/// Builds one worker pool for the whole run and measures every selected kernel family on it,
/// writing each result line as soon as it is known.
///
/// # Errors
///
/// Returns an error if no kernel can run, the pool fails or the report cannot be written.
pub fn run(
    config: &Config,
    capabilities: Capabilities,
    out: &mut impl Write,
) -> Result<Vec<Measurement>> {
    let kernels = select_kernels(config, capabilities)?;
    let processors = ProcessorSet::default();

    info!(
        threads = config.threads.get(),
        %capabilities,
        kernels = kernels.len(),
        "starting benchmark"
    );

    write_header(out, processors.len(), config.threads.get(), config.color)?;
    out.flush()?;

    let mut builder = Pool::builder()
        .worker_count(config.threads)
        .thread_name_prefix("peak_flops");

    if config.pin {
        builder = builder.processors(processors);
    }

    let mut pool = builder.build()?;
    let mut measurements = Vec::with_capacity(kernels.len());

    for kernel in kernels {
        let family = kernel.family();
        let loops = config.loops(family);

        debug!(family = family.id(), loops, "measuring");

        let measurement = measure(
            &mut pool,
            kernel,
            loops,
            config.warmup_phases,
            config.measured_phases,
        )?;

        if let Some(variation) = measurement.coefficient_of_variation()
            && variation > NOISY_VARIATION
        {
            warn!(
                family = family.id(),
                variation,
                samples = ?measurement.samples(),
                "phase durations vary widely; the result may be unreliable"
            );
        }

        write_measurement(out, &measurement, config.color)?;
        out.flush()?;

        measurements.push(measurement);
    }

    pool.shutdown()?;

    Ok(measurements)
}
