//! Kernel families: what each one exercises, what it requires and how much work it does.

use std::fmt;
use std::str::FromStr;

use crate::kernels::portable;
#[cfg(target_arch = "x86_64")]
use crate::kernels::x86;
use crate::{Capabilities, Error, Extension};

/// A kernel family: one data type on one instruction set extension.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Family {
    /// 8-bit integer dot products with AVX-512 VNNI.
    Avx512Int8,
    /// Single precision fused multiply-add on 512-bit vectors.
    Avx512Fp32,
    /// Double precision fused multiply-add on 512-bit vectors.
    Avx512Fp64,
    /// Single precision fused multiply-add on 256-bit vectors.
    FmaFp32,
    /// Double precision fused multiply-add on 256-bit vectors.
    FmaFp64,
    /// Single precision multiply and add on 256-bit vectors.
    AvxFp32,
    /// Double precision multiply and add on 256-bit vectors.
    AvxFp64,
    /// Single precision multiply and add on 128-bit vectors.
    SseFp32,
    /// Double precision multiply and add on 128-bit vectors.
    SseFp64,
    /// Double precision multiply and add written without any architecture-specific code.
    PortableFp64,
}

impl Family {
    /// Every family, in report order.
    pub const ALL: [Self; 10] = [
        Self::Avx512Int8,
        Self::Avx512Fp32,
        Self::Avx512Fp64,
        Self::FmaFp32,
        Self::FmaFp64,
        Self::AvxFp32,
        Self::AvxFp64,
        Self::SseFp32,
        Self::SseFp64,
        Self::PortableFp64,
    ];

    /// Short identifier used to select the family on the command line.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Avx512Int8 => "avx512_int8",
            Self::Avx512Fp32 => "avx512_fp32",
            Self::Avx512Fp64 => "avx512_fp64",
            Self::FmaFp32 => "fma_fp32",
            Self::FmaFp64 => "fma_fp64",
            Self::AvxFp32 => "avx_fp32",
            Self::AvxFp64 => "avx_fp64",
            Self::SseFp32 => "sse_fp32",
            Self::SseFp64 => "sse_fp64",
            Self::PortableFp64 => "portable_fp64",
        }
    }

    /// Human-readable name used in the report.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Avx512Int8 => "avx512_vnni int8",
            Self::Avx512Fp32 => "avx512f fp32",
            Self::Avx512Fp64 => "avx512f fp64",
            Self::FmaFp32 => "fma fp32",
            Self::FmaFp64 => "fma fp64",
            Self::AvxFp32 => "avx fp32",
            Self::AvxFp64 => "avx fp64",
            Self::SseFp32 => "sse fp32",
            Self::SseFp64 => "sse fp64",
            Self::PortableFp64 => "portable fp64",
        }
    }

    /// Unit of the throughput figure: billions of operations per second.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Avx512Int8 => "gops",
            _ => "gflops",
        }
    }

    /// The extensions the processor must support to run this family.
    #[must_use]
    pub fn requires(self) -> Capabilities {
        let extensions: &[Extension] = match self {
            Self::Avx512Int8 => &[Extension::Avx512f, Extension::Avx512Vnni],
            Self::Avx512Fp32 | Self::Avx512Fp64 => &[Extension::Avx512f],
            Self::FmaFp32 | Self::FmaFp64 => &[Extension::Avx, Extension::Fma],
            Self::AvxFp32 | Self::AvxFp64 => &[Extension::Avx],
            Self::SseFp32 | Self::SseFp64 => &[Extension::Sse],
            Self::PortableFp64 => &[],
        };

        extensions.iter().copied().collect()
    }

    /// Arithmetic operations performed by one iteration of the kernel loop, per worker.
    #[must_use]
    pub fn ops_per_loop(self) -> u64 {
        match self {
            Self::Avx512Int8 => 1280,
            Self::Avx512Fp32 => 320,
            Self::Avx512Fp64 | Self::FmaFp32 => 160,
            Self::FmaFp64 => 80,
            Self::AvxFp32 => 96,
            Self::AvxFp64 => 48,
            Self::SseFp32 => 64,
            Self::SseFp64 => 32,
            Self::PortableFp64 => 16,
        }
    }

    /// Loop iterations of a full-length run, long enough that wakeup latency is negligible.
    #[must_use]
    pub fn default_loops(self) -> u64 {
        match self {
            Self::Avx512Int8 | Self::Avx512Fp32 | Self::Avx512Fp64 => 0x2000_0000,
            Self::FmaFp32 | Self::FmaFp64 | Self::AvxFp32 | Self::AvxFp64 => 0x4000_0000,
            Self::SseFp32 | Self::SseFp64 => 0x3000_0000,
            Self::PortableFp64 => 0x1000_0000,
        }
    }

    /// Whether the family can run on a processor with the given capabilities.
    #[must_use]
    pub fn is_supported(self, capabilities: Capabilities) -> bool {
        self.kernel(capabilities).is_some()
    }

    /// The kernel of this family, if the given capabilities allow running it and it exists for
    /// the current architecture.
    #[must_use]
    pub fn kernel(self, capabilities: Capabilities) -> Option<Kernel> {
        if !capabilities.contains_all(self.requires()) {
            return None;
        }

        let body: unsafe fn(u64) = match self {
            Self::PortableFp64 => portable::fp64,
            #[cfg(target_arch = "x86_64")]
            Self::Avx512Int8 => x86::avx512_int8,
            #[cfg(target_arch = "x86_64")]
            Self::Avx512Fp32 => x86::avx512_fp32,
            #[cfg(target_arch = "x86_64")]
            Self::Avx512Fp64 => x86::avx512_fp64,
            #[cfg(target_arch = "x86_64")]
            Self::FmaFp32 => x86::fma_fp32,
            #[cfg(target_arch = "x86_64")]
            Self::FmaFp64 => x86::fma_fp64,
            #[cfg(target_arch = "x86_64")]
            Self::AvxFp32 => x86::avx_fp32,
            #[cfg(target_arch = "x86_64")]
            Self::AvxFp64 => x86::avx_fp64,
            #[cfg(target_arch = "x86_64")]
            Self::SseFp32 => x86::sse_fp32,
            #[cfg(target_arch = "x86_64")]
            Self::SseFp64 => x86::sse_fp64,
            #[cfg(not(target_arch = "x86_64"))]
            _ => return None,
        };

        Some(Kernel { family: self, body })
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.id() == s)
            .ok_or_else(|| Error::UnknownFamily {
                name: s.to_string(),
            })
    }
}

/// A kernel whose required extensions have been verified to be present.
///
/// Obtained from [`Family::kernel()`]; holding one is proof that [`run()`][Self::run] is safe to
/// call on this machine.
#[derive(Clone, Copy, Debug)]
pub struct Kernel {
    family: Family,
    body: unsafe fn(u64),
}

impl Kernel {
    /// The family this kernel belongs to.
    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    /// Runs the kernel loop for the given number of iterations.
    pub fn run(&self, loops: u64) {
        // SAFETY: A `Kernel` is only created by `Family::kernel()` after confirming that the
        // processor supports every target feature the kernel body is compiled with.
        unsafe { (self.body)(loops) }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::probe;

    #[test]
    fn ids_parse_back() {
        for family in Family::ALL {
            assert_eq!(family.id().parse::<Family>().unwrap(), family);
        }
    }

    #[test]
    fn unknown_id_is_rejected() {
        let error = "avx1024_fp32".parse::<Family>().unwrap_err();

        assert!(matches!(error, Error::UnknownFamily { ref name } if name == "avx1024_fp32"));
    }

    #[test]
    fn ids_and_names_are_unique() {
        let ids: HashSet<_> = Family::ALL.iter().map(|f| f.id()).collect();
        let names: HashSet<_> = Family::ALL.iter().map(|f| f.name()).collect();

        assert_eq!(ids.len(), Family::ALL.len());
        assert_eq!(names.len(), Family::ALL.len());
    }

    #[test]
    fn ops_per_loop_matches_kernel_shape() {
        // Chains x lanes x operations per lane.
        assert_eq!(Family::Avx512Int8.ops_per_loop(), 10 * 64 * 2);
        assert_eq!(Family::Avx512Fp32.ops_per_loop(), 10 * 16 * 2);
        assert_eq!(Family::Avx512Fp64.ops_per_loop(), 10 * 8 * 2);
        assert_eq!(Family::FmaFp32.ops_per_loop(), 10 * 8 * 2);
        assert_eq!(Family::FmaFp64.ops_per_loop(), 10 * 4 * 2);
        assert_eq!(Family::AvxFp32.ops_per_loop(), 12 * 8);
        assert_eq!(Family::AvxFp64.ops_per_loop(), 12 * 4);
        assert_eq!(Family::SseFp32.ops_per_loop(), 16 * 4);
        assert_eq!(Family::SseFp64.ops_per_loop(), 16 * 2);
        assert_eq!(Family::PortableFp64.ops_per_loop(), 16);
    }

    #[test]
    fn only_int8_reports_integer_unit() {
        for family in Family::ALL {
            let expected = if family == Family::Avx512Int8 {
                "gops"
            } else {
                "gflops"
            };
            assert_eq!(family.unit(), expected);
        }
    }

    #[test]
    fn portable_family_runs_everywhere() {
        let kernel = Family::PortableFp64.kernel(Capabilities::empty()).unwrap();

        assert_eq!(kernel.family(), Family::PortableFp64);
        kernel.run(1000);
    }

    #[test]
    fn simd_families_need_capabilities() {
        for family in Family::ALL {
            if family == Family::PortableFp64 {
                continue;
            }

            assert!(family.kernel(Capabilities::empty()).is_none());
            assert!(!family.is_supported(Capabilities::empty()));
        }
    }

    #[test]
    fn fma_requires_avx_as_well() {
        let fma_only: Capabilities = [Extension::Fma].into_iter().collect();

        assert!(!Family::FmaFp32.is_supported(fma_only));
    }

    #[test]
    fn supported_kernels_run() {
        let capabilities = probe();

        for family in Family::ALL {
            if let Some(kernel) = family.kernel(capabilities) {
                kernel.run(1000);
            }
        }
    }
}
