use std::io;

use thiserror::Error;

use crate::{Capabilities, Family};

/// Errors reported while configuring or running the benchmark.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker pool could not be created or a phase failed.
    #[error(transparent)]
    Pool(#[from] lockstep::Error),

    /// The report could not be written.
    #[error("failed to write the report: {0}")]
    Output(#[from] io::Error),

    /// None of the selected kernel families can run on this processor.
    #[error("none of the selected kernel families can run on this processor")]
    NoKernels,

    /// A kernel family was explicitly selected but the processor lacks extensions it needs.
    #[error("{family} cannot run on this processor, which lacks: {missing}")]
    UnsupportedFamily {
        /// The selected family.
        family: Family,

        /// The extensions the family requires that the processor does not have.
        missing: Capabilities,
    },

    /// A kernel family identifier did not match any known family.
    #[error("unknown kernel family '{name}'")]
    UnknownFamily {
        /// The identifier as given.
        name: String,
    },

    /// A command line option had a value the benchmark cannot work with.
    #[error("invalid value for --{name}: {problem}")]
    InvalidOption {
        /// The option name, without the leading dashes.
        name: &'static str,

        /// What is wrong with the value.
        problem: String,
    },
}

/// A specialized `Result` type for benchmark operations.
pub type Result<T> = std::result::Result<T, Error>;
