//! 256-bit packed-double kernels, four doubles per lane.
//!
//! Requires the `avx` CPU feature; callers must have passed through
//! [`super::Kernel::resolve`] first, which falls back to `Scalar` when
//! `avx` is absent.

use super::{Distance, SquaredDistance};
use std::arch::x86_64::*;

const WIDTH: usize = 4;

/// # Safety
/// `a`/`b` must be valid, 32-byte-aligned for `blocks * 4` reads.
#[target_feature(enable = "avx")]
#[must_use]
pub unsafe fn distance(a: *const f64, b: *const f64, blocks: usize) -> Distance {
    Distance(squared_memory(a, b, blocks).sqrt())
}

/// # Safety
/// Same as [`distance`].
#[target_feature(enable = "avx")]
#[must_use]
pub unsafe fn distance_opt(a: *const f64, b: *const f64, blocks: usize) -> Distance {
    Distance(squared_register(a, b, blocks).sqrt())
}

/// # Safety
/// Same as [`distance`].
#[target_feature(enable = "avx")]
#[must_use]
pub unsafe fn squared_opt(a: *const f64, b: *const f64, blocks: usize) -> SquaredDistance {
    SquaredDistance(squared_register(a, b, blocks))
}

#[target_feature(enable = "avx")]
unsafe fn squared_memory(a: *const f64, b: *const f64, blocks: usize) -> f64 {
    let mut acc = 0.0f64;
    for block in 0..blocks {
        let off = block * WIDTH;
        let diff = _mm256_sub_pd(_mm256_load_pd(a.add(off)), _mm256_load_pd(b.add(off)));
        acc += hsum(_mm256_mul_pd(diff, diff));
    }
    acc
}

#[target_feature(enable = "avx")]
unsafe fn squared_register(a: *const f64, b: *const f64, blocks: usize) -> f64 {
    let mut acc = _mm256_setzero_pd();
    for block in 0..blocks {
        let off = block * WIDTH;
        let diff = _mm256_sub_pd(_mm256_load_pd(a.add(off)), _mm256_load_pd(b.add(off)));
        acc = _mm256_add_pd(acc, _mm256_mul_pd(diff, diff));
    }
    hsum(acc)
}

/// Combines the high and low 128-bit lanes, then horizontally reduces.
#[target_feature(enable = "avx")]
unsafe fn hsum(v: __m256d) -> f64 {
    let hi = _mm256_extractf128_pd(v, 1);
    let lo = _mm256_castpd256_pd128(v);
    let combined = _mm_add_pd(lo, hi);
    let summed = _mm_hadd_pd(combined, combined);
    let mut lanes = [0.0f64; 2];
    _mm_storeu_pd(lanes.as_mut_ptr(), summed);
    lanes[0]
}
