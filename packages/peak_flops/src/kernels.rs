//! Compute kernels: tight arithmetic loops with independent dependency chains, one loop body
//! per kernel family.
//!
//! Every kernel takes the number of loop iterations to run and performs exactly
//! [`Family::ops_per_loop()`][crate::Family::ops_per_loop] arithmetic operations per iteration.
//! Operands are passed through `black_box` so the compiler can neither fold the arithmetic
//! nor drop the loop, and the final accumulators are fed to `black_box` as well.
//!
//! The operands keep every accumulator at a constant value, which avoids both overflow and
//! denormal slowdowns no matter how many iterations run.

pub(crate) mod portable;

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86;

/// Number of independent accumulator chains in the fused multiply-add kernels.
pub(crate) const FMA_CHAINS: usize = 10;

/// Number of independent multiply chains (and, separately, add chains) in the AVX kernels.
pub(crate) const AVX_CHAINS: usize = 6;

/// Number of independent multiply chains (and, separately, add chains) in the SSE kernels.
pub(crate) const SSE_CHAINS: usize = 8;

/// Number of independent multiply chains (and, separately, add chains) in the portable kernel.
pub(crate) const PORTABLE_CHAINS: usize = 8;
