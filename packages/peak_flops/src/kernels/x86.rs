//! x86-64 SIMD kernels.
//!
//! Each function is compiled with the target features its family requires and may only be
//! called once [`probe()`][crate::probe] has confirmed those features.

use std::arch::x86_64::{
    _mm_add_pd, _mm_add_ps, _mm_mul_pd, _mm_mul_ps, _mm_set1_pd, _mm_set1_ps, _mm256_add_pd,
    _mm256_add_ps, _mm256_fmadd_pd, _mm256_fmadd_ps, _mm256_mul_pd, _mm256_mul_ps,
    _mm256_set1_pd, _mm256_set1_ps, _mm512_dpbusd_epi32, _mm512_fmadd_pd, _mm512_fmadd_ps,
    _mm512_set1_epi8, _mm512_set1_epi32, _mm512_set1_pd, _mm512_set1_ps,
};
use std::hint::black_box;

use super::{AVX_CHAINS, FMA_CHAINS, SSE_CHAINS};

// 10 dot products x 64 byte pairs x 2 operations per iteration.
#[target_feature(enable = "avx512f,avx512vnni")]
pub(crate) fn avx512_int8(loops: u64) {
    let lhs = _mm512_set1_epi8(black_box(1));
    let rhs = _mm512_set1_epi8(black_box(0));

    let mut acc = [_mm512_set1_epi32(black_box(3)); FMA_CHAINS];

    for _ in 0..loops {
        for a in &mut acc {
            *a = _mm512_dpbusd_epi32(*a, lhs, rhs);
        }
    }

    black_box(acc);
}

// 10 FMA x 16 lanes x 2 operations per iteration.
#[target_feature(enable = "avx512f")]
pub(crate) fn avx512_fp32(loops: u64) {
    let mul = _mm512_set1_ps(black_box(1.0));
    let add = _mm512_set1_ps(black_box(0.0));

    let mut acc = [_mm512_set1_ps(black_box(1.5)); FMA_CHAINS];

    for _ in 0..loops {
        for a in &mut acc {
            *a = _mm512_fmadd_ps(*a, mul, add);
        }
    }

    black_box(acc);
}

// 10 FMA x 8 lanes x 2 operations per iteration.
#[target_feature(enable = "avx512f")]
pub(crate) fn avx512_fp64(loops: u64) {
    let mul = _mm512_set1_pd(black_box(1.0));
    let add = _mm512_set1_pd(black_box(0.0));

    let mut acc = [_mm512_set1_pd(black_box(1.5)); FMA_CHAINS];

    for _ in 0..loops {
        for a in &mut acc {
            *a = _mm512_fmadd_pd(*a, mul, add);
        }
    }

    black_box(acc);
}

// 10 FMA x 8 lanes x 2 operations per iteration.
#[target_feature(enable = "avx,fma")]
pub(crate) fn fma_fp32(loops: u64) {
    let mul = _mm256_set1_ps(black_box(1.0));
    let add = _mm256_set1_ps(black_box(0.0));

    let mut acc = [_mm256_set1_ps(black_box(1.5)); FMA_CHAINS];

    for _ in 0..loops {
        for a in &mut acc {
            *a = _mm256_fmadd_ps(*a, mul, add);
        }
    }

    black_box(acc);
}

// 10 FMA x 4 lanes x 2 operations per iteration.
#[target_feature(enable = "avx,fma")]
pub(crate) fn fma_fp64(loops: u64) {
    let mul = _mm256_set1_pd(black_box(1.0));
    let add = _mm256_set1_pd(black_box(0.0));

    let mut acc = [_mm256_set1_pd(black_box(1.5)); FMA_CHAINS];

    for _ in 0..loops {
        for a in &mut acc {
            *a = _mm256_fmadd_pd(*a, mul, add);
        }
    }

    black_box(acc);
}

// (6 multiplies + 6 adds) x 8 lanes per iteration.
#[target_feature(enable = "avx")]
pub(crate) fn avx_fp32(loops: u64) {
    let mul = _mm256_set1_ps(black_box(1.0));
    let add = _mm256_set1_ps(black_box(0.0));

    let mut products = [_mm256_set1_ps(black_box(1.5)); AVX_CHAINS];
    let mut sums = [_mm256_set1_ps(black_box(2.5)); AVX_CHAINS];

    for _ in 0..loops {
        for (product, sum) in products.iter_mut().zip(&mut sums) {
            *product = _mm256_mul_ps(*product, mul);
            *sum = _mm256_add_ps(*sum, add);
        }
    }

    black_box((products, sums));
}

// (6 multiplies + 6 adds) x 4 lanes per iteration.
#[target_feature(enable = "avx")]
pub(crate) fn avx_fp64(loops: u64) {
    let mul = _mm256_set1_pd(black_box(1.0));
    let add = _mm256_set1_pd(black_box(0.0));

    let mut products = [_mm256_set1_pd(black_box(1.5)); AVX_CHAINS];
    let mut sums = [_mm256_set1_pd(black_box(2.5)); AVX_CHAINS];

    for _ in 0..loops {
        for (product, sum) in products.iter_mut().zip(&mut sums) {
            *product = _mm256_mul_pd(*product, mul);
            *sum = _mm256_add_pd(*sum, add);
        }
    }

    black_box((products, sums));
}

// (8 multiplies + 8 adds) x 4 lanes per iteration.
#[target_feature(enable = "sse")]
pub(crate) fn sse_fp32(loops: u64) {
    let mul = _mm_set1_ps(black_box(1.0));
    let add = _mm_set1_ps(black_box(0.0));

    let mut products = [_mm_set1_ps(black_box(1.5)); SSE_CHAINS];
    let mut sums = [_mm_set1_ps(black_box(2.5)); SSE_CHAINS];

    for _ in 0..loops {
        for (product, sum) in products.iter_mut().zip(&mut sums) {
            *product = _mm_mul_ps(*product, mul);
            *sum = _mm_add_ps(*sum, add);
        }
    }

    black_box((products, sums));
}

// (8 multiplies + 8 adds) x 2 lanes per iteration.
#[target_feature(enable = "sse2")]
pub(crate) fn sse_fp64(loops: u64) {
    let mul = _mm_set1_pd(black_box(1.0));
    let add = _mm_set1_pd(black_box(0.0));

    let mut products = [_mm_set1_pd(black_box(1.5)); SSE_CHAINS];
    let mut sums = [_mm_set1_pd(black_box(2.5)); SSE_CHAINS];

    for _ in 0..loops {
        for (product, sum) in products.iter_mut().zip(&mut sums) {
            *product = _mm_mul_pd(*product, mul);
            *sum = _mm_add_pd(*sum, add);
        }
    }

    black_box((products, sums));
}
