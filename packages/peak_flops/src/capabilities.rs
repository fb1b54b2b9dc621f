//! Instruction set extensions the kernels depend on and runtime detection of them.

use std::fmt;
#[cfg(target_arch = "x86_64")]
use std::arch::is_x86_feature_detected;

use derive_more::Display;

/// An instruction set extension that at least one kernel family depends on.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Extension {
    /// 128-bit SSE/SSE2 floating point.
    #[display("sse")]
    Sse,

    /// 256-bit AVX floating point.
    #[display("avx")]
    Avx,

    /// Fused multiply-add (FMA3).
    #[display("fma")]
    Fma,

    /// 512-bit AVX-512 foundation.
    #[display("avx512f")]
    Avx512f,

    /// AVX-512 vector neural network instructions (8-bit integer dot products).
    #[display("avx512_vnni")]
    Avx512Vnni,
}

impl Extension {
    /// Every extension, in ascending order of capability.
    pub const ALL: [Self; 5] = [
        Self::Sse,
        Self::Avx,
        Self::Fma,
        Self::Avx512f,
        Self::Avx512Vnni,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Sse => 0x1,
            Self::Avx => 0x2,
            Self::Fma => 0x4,
            Self::Avx512f => 0x8,
            Self::Avx512Vnni => 0x10,
        }
    }
}

/// A set of instruction set extensions, typically the ones supported by the current processor.
///
/// This is a plain value: obtain it from [`probe()`] once and pass it to whatever needs to know
/// what the processor can do.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Capabilities {
    bits: u8,
}

impl Capabilities {
    /// A set with no extensions.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Whether the set holds the given extension.
    #[must_use]
    pub const fn contains(self, extension: Extension) -> bool {
        self.bits & extension.bit() != 0
    }

    /// Whether the set holds every extension of `other`.
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// The extensions of `other` that are not in this set.
    #[must_use]
    pub const fn missing(self, other: Self) -> Self {
        Self {
            bits: other.bits & !self.bits,
        }
    }

    /// Adds an extension to the set.
    pub fn insert(&mut self, extension: Extension) {
        self.bits |= extension.bit();
    }

    /// Whether the set holds no extensions.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// The extensions in the set, in ascending order of capability.
    pub fn iter(self) -> impl Iterator<Item = Extension> {
        Extension::ALL
            .into_iter()
            .filter(move |extension| self.contains(*extension))
    }
}

impl FromIterator<Extension> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Extension>>(iter: I) -> Self {
        let mut capabilities = Self::empty();

        for extension in iter {
            capabilities.insert(extension);
        }

        capabilities
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        for (index, extension) in self.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }

            write!(f, "{extension}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Detects the instruction set extensions supported by the current processor and operating
/// system.
///
/// Detection also verifies that the operating system preserves the wide register state, so an
/// extension reported here is safe to execute. On processors other than x86-64 the result is
/// always empty; only the portable kernel family can run there.
#[must_use]
pub fn probe() -> Capabilities {
    #[cfg(target_arch = "x86_64")]
    {
        let mut capabilities = Capabilities::empty();

        if is_x86_feature_detected!("sse2") {
            capabilities.insert(Extension::Sse);
        }
        if is_x86_feature_detected!("avx") {
            capabilities.insert(Extension::Avx);
        }
        if is_x86_feature_detected!("fma") {
            capabilities.insert(Extension::Fma);
        }
        if is_x86_feature_detected!("avx512f") {
            capabilities.insert(Extension::Avx512f);
        }
        if is_x86_feature_detected!("avx512vnni") {
            capabilities.insert(Extension::Avx512Vnni);
        }

        capabilities
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        Capabilities::empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Capabilities: Send, Sync, Copy);

    #[test]
    fn empty_set_contains_nothing() {
        let capabilities = Capabilities::empty();

        assert!(capabilities.is_empty());
        for extension in Extension::ALL {
            assert!(!capabilities.contains(extension));
        }
        assert_eq!(capabilities.to_string(), "none");
    }

    #[test]
    fn insert_and_contains() {
        let mut capabilities = Capabilities::empty();
        capabilities.insert(Extension::Fma);

        assert!(capabilities.contains(Extension::Fma));
        assert!(!capabilities.contains(Extension::Avx));
        assert!(!capabilities.is_empty());
    }

    #[test]
    fn contains_all_and_missing() {
        let have: Capabilities = [Extension::Sse, Extension::Avx].into_iter().collect();
        let need: Capabilities = [Extension::Avx, Extension::Fma].into_iter().collect();

        assert!(!have.contains_all(need));
        assert!(have.contains_all(Capabilities::empty()));
        assert_eq!(
            have.missing(need),
            [Extension::Fma].into_iter().collect::<Capabilities>()
        );
    }

    #[test]
    fn iter_and_display_follow_capability_order() {
        let capabilities: Capabilities = [Extension::Avx512f, Extension::Sse, Extension::Fma]
            .into_iter()
            .collect();

        assert_eq!(
            capabilities.iter().collect::<Vec<_>>(),
            vec![Extension::Sse, Extension::Fma, Extension::Avx512f]
        );
        assert_eq!(capabilities.to_string(), "sse fma avx512f");
    }

    #[test]
    fn probe_is_stable() {
        assert_eq!(probe(), probe());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn probe_finds_sse_on_x86_64() {
        // SSE2 is part of the x86-64 baseline.
        assert!(probe().contains(Extension::Sse));
    }
}
