//! Command line entry point of the peak throughput benchmark.
//!
//! ```text
//! peak_flops [<threads>] [--warmup <n>] [--repeat <n>] [--scale <n>] [--only <family>...]
//!            [--pin] [--no-color] [--metrics] [--list]
//! ```
//!
//! Diagnostics go to stderr and are controlled with `RUST_LOG` (default `warn`); the report goes
//! to stdout. A failure is reported once, as a single `peak_flops: ` line on stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use nm::Report;
use peak_flops::{Args, probe, run, write_listing};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .with_thread_names(true)
        .init();

    let args: Args = argh::from_env();
    let capabilities = probe();

    if args.list {
        let mut out = io::stdout().lock();

        return match write_listing(&mut out, capabilities).and_then(|()| out.flush()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("peak_flops: failed to write the listing: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("peak_flops: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut out = io::stdout().lock();

    if let Err(e) = run(&config, capabilities, &mut out) {
        eprintln!("peak_flops: {e}");
        return ExitCode::FAILURE;
    }

    if config.metrics
        && let Err(e) = writeln!(out, "\n{}", Report::collect())
    {
        eprintln!("peak_flops: failed to write metrics: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
