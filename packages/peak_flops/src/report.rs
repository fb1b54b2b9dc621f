//! Human-readable output.
//!
//! Everything here writes to a caller-provided [`Write`] so the exact text can be checked in
//! tests. Figures are highlighted with 256-color ANSI sequences unless color is turned off.

use std::fmt::Display;
use std::io::{self, Write};

use crate::{Capabilities, Family, Measurement};

const BLUE: u8 = 27;
const GREEN: u8 = 46;
const YELLOW: u8 = 226;

fn paint(value: impl Display, color_code: u8, color: bool) -> String {
    if color {
        format!("\x1b[38;5;{color_code}m{value}\x1b[0m")
    } else {
        value.to_string()
    }
}

/// Writes the lines that precede the per-family results.
///
/// # Errors
///
/// Returns any error reported by `out`.
pub fn write_header(
    out: &mut impl Write,
    processors_available: usize,
    threads: usize,
    color: bool,
) -> io::Result<()> {
    writeln!(
        out,
        "This system has {processors_available} processors available."
    )?;
    writeln!(out, "Using {} cores", paint(threads, GREEN, color))?;
    writeln!(out, "Thread(s): {}", paint(threads, YELLOW, color))?;
    writeln!(out)
}

/// Writes the result line of one kernel family.
///
/// # Errors
///
/// Returns any error reported by `out`.
pub fn write_measurement(
    out: &mut impl Write,
    measurement: &Measurement,
    color: bool,
) -> io::Result<()> {
    let family = measurement.family();
    let figure = format!("{:.4}", measurement.throughput());

    writeln!(
        out,
        "{} perf: {} {}.",
        family.name(),
        paint(figure, BLUE, color),
        family.unit()
    )
}

/// Writes the detected extensions and, for every kernel family, whether it can run here.
///
/// # Errors
///
/// Returns any error reported by `out`.
pub fn write_listing(out: &mut impl Write, capabilities: Capabilities) -> io::Result<()> {
    writeln!(out, "Detected extensions: {capabilities}")?;
    writeln!(out)?;

    for family in Family::ALL {
        if family.is_supported(capabilities) {
            writeln!(out, "  {:<16} {}", family.id(), family.name())?;
        } else {
            writeln!(
                out,
                "  {:<16} {} (unavailable, needs {})",
                family.id(),
                family.name(),
                capabilities.missing(family.requires())
            )?;
        }
    }

    Ok(())
}
