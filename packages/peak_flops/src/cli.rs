use std::num::NonZero;

use argh::FromArgs;

use crate::{Config, Error, Family, Result};

/// Measures the peak arithmetic throughput of this processor by running SIMD kernels on every
/// worker thread at once.
#[derive(Debug, FromArgs)]
pub struct Args {
    /// number of worker threads (default: every processor available to the process)
    #[argh(positional)]
    pub threads: Option<usize>,

    /// untimed phases to run before measuring each kernel family
    #[argh(option, default = "1")]
    pub warmup: usize,

    /// timed phases per kernel family; the fastest one is reported
    #[argh(option, default = "1")]
    pub repeat: usize,

    /// divide the default loop counts by this factor for a quicker, less accurate run
    #[argh(option, default = "1")]
    pub scale: u64,

    /// run only this kernel family (repeatable); see --list for identifiers
    #[argh(option)]
    pub only: Vec<String>,

    /// pin each worker thread to its own processor, wrapping around when there are more threads
    #[argh(switch)]
    pub pin: bool,

    /// print figures without ANSI color sequences
    #[argh(switch)]
    pub no_color: bool,

    /// print collected pool metrics after the report
    #[argh(switch)]
    pub metrics: bool,

    /// list the detected instruction set extensions and runnable kernel families, then exit
    #[argh(switch)]
    pub list: bool,
}

impl Args {
    /// Validates the arguments and turns them into a benchmark configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for zero counts and [`Error::UnknownFamily`] for
    /// unrecognized `--only` values.
    pub fn into_config(self) -> Result<Config> {
        let defaults = Config::default();

        let threads = match self.threads {
            Some(threads) => NonZero::new(threads).ok_or_else(|| Error::InvalidOption {
                name: "threads",
                problem: "at least one thread is required".to_string(),
            })?,
            None => defaults.threads,
        };

        let measured_phases = NonZero::new(self.repeat).ok_or_else(|| Error::InvalidOption {
            name: "repeat",
            problem: "at least one measured phase is required".to_string(),
        })?;

        let scale = NonZero::new(self.scale).ok_or_else(|| Error::InvalidOption {
            name: "scale",
            problem: "must be at least 1".to_string(),
        })?;

        let families = if self.only.is_empty() {
            None
        } else {
            let mut families = Vec::with_capacity(self.only.len());

            for id in &self.only {
                let family = id.parse::<Family>()?;

                if !families.contains(&family) {
                    families.push(family);
                }
            }

            Some(families)
        };

        Ok(Config {
            threads,
            warmup_phases: self.warmup,
            measured_phases,
            scale,
            families,
            pin: self.pin,
            color: !self.no_color,
            metrics: self.metrics,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["peak_flops"], args).unwrap()
    }

    #[test]
    fn no_arguments_gives_defaults() {
        let config = parse(&[]).into_config().unwrap();
        let defaults = Config::default();

        assert_eq!(config.threads, defaults.threads);
        assert_eq!(config.warmup_phases, 1);
        assert_eq!(config.measured_phases.get(), 1);
        assert_eq!(config.scale.get(), 1);
        assert!(config.families.is_none());
        assert!(config.color);
        assert!(!config.pin);
        assert!(!config.metrics);
    }

    #[test]
    fn positional_thread_count() {
        let config = parse(&["3"]).into_config().unwrap();

        assert_eq!(config.threads.get(), 3);
    }

    #[test]
    fn zero_threads_is_rejected() {
        let error = parse(&["0"]).into_config().unwrap_err();

        assert!(matches!(error, Error::InvalidOption { name: "threads", .. }));
    }

    #[test]
    fn zero_repeat_and_scale_are_rejected() {
        assert!(matches!(
            parse(&["--repeat", "0"]).into_config().unwrap_err(),
            Error::InvalidOption { name: "repeat", .. }
        ));
        assert!(matches!(
            parse(&["--scale", "0"]).into_config().unwrap_err(),
            Error::InvalidOption { name: "scale", .. }
        ));
    }

    #[test]
    fn only_selects_families_once_in_given_order() {
        let config = parse(&[
            "--only",
            "sse_fp64",
            "--only",
            "portable_fp64",
            "--only",
            "sse_fp64",
        ])
        .into_config()
        .unwrap();

        assert_eq!(
            config.families,
            Some(vec![Family::SseFp64, Family::PortableFp64])
        );
    }

    #[test]
    fn only_rejects_unknown_family() {
        let error = parse(&["--only", "mmx_int8"]).into_config().unwrap_err();

        assert!(matches!(error, Error::UnknownFamily { .. }));
    }

    #[test]
    fn switches() {
        let args = parse(&["--no-color", "--pin", "--metrics", "--list"]);

        assert!(args.metrics);
        assert!(args.list);

        let config = args.into_config().unwrap();
        assert!(!config.color);
        assert!(config.pin);
        assert!(config.metrics);
    }
}
