//! 128-bit packed-double kernels, two doubles per lane.
//!
//! SSE2 is part of the `x86_64` baseline ABI, so these are always callable
//! on this architecture; unlike the AVX family there is no runtime feature
//! check before dispatch.

use super::{Distance, SquaredDistance};
use std::arch::x86_64::*;

const WIDTH: usize = 2;

/// Naive kernel: per-block horizontal reduce added into a scalar
/// accumulator.
///
/// # Safety
/// `a`/`b` must be valid, 16-byte-aligned for `blocks * 2` reads.
#[target_feature(enable = "sse2")]
#[target_feature(enable = "sse3")]
#[must_use]
pub unsafe fn distance(a: *const f64, b: *const f64, blocks: usize) -> Distance {
    Distance(squared_memory(a, b, blocks).sqrt())
}

/// Register-accumulated variant: the running sum stays in a vector
/// register across the whole loop, reduced once at the end.
///
/// # Safety
/// Same as [`distance`].
#[target_feature(enable = "sse2")]
#[target_feature(enable = "sse3")]
#[must_use]
pub unsafe fn distance_opt(a: *const f64, b: *const f64, blocks: usize) -> Distance {
    Distance(squared_register(a, b, blocks).sqrt())
}

/// Register-accumulated, squared-output variant. The square root is
/// deferred to the post-pass.
///
/// # Safety
/// Same as [`distance`].
#[target_feature(enable = "sse2")]
#[target_feature(enable = "sse3")]
#[must_use]
pub unsafe fn squared_opt(a: *const f64, b: *const f64, blocks: usize) -> SquaredDistance {
    SquaredDistance(squared_register(a, b, blocks))
}

#[target_feature(enable = "sse2")]
#[target_feature(enable = "sse3")]
unsafe fn squared_memory(a: *const f64, b: *const f64, blocks: usize) -> f64 {
    let mut acc = 0.0f64;
    for block in 0..blocks {
        let off = block * WIDTH;
        let diff = _mm_sub_pd(_mm_load_pd(a.add(off)), _mm_load_pd(b.add(off)));
        let sq = _mm_mul_pd(diff, diff);
        acc += hsum(_mm_hadd_pd(sq, sq));
    }
    acc
}

#[target_feature(enable = "sse2")]
#[target_feature(enable = "sse3")]
unsafe fn squared_register(a: *const f64, b: *const f64, blocks: usize) -> f64 {
    let mut acc = _mm_setzero_pd();
    for block in 0..blocks {
        let off = block * WIDTH;
        let diff = _mm_sub_pd(_mm_load_pd(a.add(off)), _mm_load_pd(b.add(off)));
        acc = _mm_add_pd(acc, _mm_mul_pd(diff, diff));
    }
    hsum(_mm_hadd_pd(acc, acc))
}

#[target_feature(enable = "sse2")]
unsafe fn hsum(v: __m128d) -> f64 {
    let mut lanes = [0.0f64; 2];
    _mm_storeu_pd(lanes.as_mut_ptr(), v);
    lanes[0]
}
