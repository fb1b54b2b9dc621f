#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Measures the peak arithmetic throughput of a processor.
//!
//! Every kernel family is a tight loop of independent multiply, add or fused multiply-add
//! chains on one instruction set extension. The benchmark runs one copy of the kernel on every
//! worker of a [`lockstep::Pool`] at once and reports billions of operations per second, using
//! the wall-clock time from releasing the phase to the last worker finishing.
//!
//! Only families whose extensions the processor supports are run; [`probe()`] detects them at
//! runtime.
//!
//! # Example
//!
//! ```rust
//! use new_zealand::nz;
//! use peak_flops::{Config, Family, probe, run};
//!
//! let config = Config {
//!     threads: nz!(2),
//!     scale: nz!(100_000),
//!     families: Some(vec![Family::PortableFp64]),
//!     color: false,
//!     ..Config::default()
//! };
//!
//! let mut report = Vec::new();
//! let measurements = run(&config, probe(), &mut report)?;
//!
//! assert_eq!(measurements.len(), 1);
//! println!("{}", String::from_utf8_lossy(&report));
//! # Ok::<(), peak_flops::Error>(())
//! ```

mod bench;
mod capabilities;
mod cli;
mod config;
mod error;
mod family;
mod kernels;
mod measure;
mod report;

pub use bench::*;
pub use capabilities::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use family::*;
pub use measure::*;
pub use report::*;
