//! Distance kernel family (component B).
//!
//! Seven pure, allocation-free kernels compute the (possibly squared)
//! Euclidean distance between two same-dimension points. `Scalar` needs no
//! alignment; the six `x86_64` SIMD kernels require their operands aligned
//! to 16 bytes (SSE family) or 32 bytes (AVX family) and padded to a whole
//! number of lanes — see [`crate::layout`]. The SSE family's horizontal
//! reduce uses `_mm_hadd_pd`, an SSE3 instruction, so `Kernel::resolve`
//! checks `sse3`, not just the SSE2 `x86_64` baseline.
//!
//! `*NoSqrt` kernels return a [`SquaredDistance`] rather than a
//! [`Distance`]; the two newtypes exist so a squared magnitude can't
//! silently leak into a `lambda` slot before the post-pass (component E)
//! has rooted it.

pub mod scalar;
#[cfg(target_arch = "x86_64")]
pub mod avx;
#[cfg(target_arch = "x86_64")]
pub mod sse;

use crate::error::{Error, Result};

/// A rooted Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance(pub f64);

/// A squared Euclidean distance, not yet rooted by the post-pass.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SquaredDistance(pub f64);

impl SquaredDistance {
    /// Applies the square root, producing a rooted [`Distance`].
    #[must_use]
    pub fn sqrt(self) -> Distance {
        Distance(self.0.sqrt())
    }
}

/// Selects one of the seven distance algorithms at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    Scalar,
    Sse,
    Avx,
    SseOpt,
    AvxOpt,
    SseOptNoSqrt,
    AvxOptNoSqrt,
}

impl Kernel {
    /// Whether this kernel's output is squared (deferring `sqrt` to the
    /// post-pass) rather than already rooted.
    #[must_use]
    pub fn is_squared_output(self) -> bool {
        matches!(self, Kernel::SseOptNoSqrt | Kernel::AvxOptNoSqrt)
    }

    /// Lane width in `f64`s, or `None` for `Scalar` (which needs no padding
    /// or alignment).
    #[must_use]
    pub fn simd_width(self) -> Option<usize> {
        match self {
            Kernel::Scalar => None,
            Kernel::Sse | Kernel::SseOpt | Kernel::SseOptNoSqrt => Some(2),
            Kernel::Avx | Kernel::AvxOpt | Kernel::AvxOptNoSqrt => Some(4),
        }
    }

    /// Required operand alignment in bytes, or `None` for `Scalar`.
    #[must_use]
    pub fn required_alignment(self) -> Option<usize> {
        self.simd_width().map(|width| 16 * width / 2)
    }

    /// Resolves this request against the host's actual CPU features,
    /// falling back to `Scalar` when the requested SIMD family is
    /// unavailable. Off `x86_64`, every non-`Scalar` kernel falls back.
    #[must_use]
    pub fn resolve(self) -> Kernel {
        #[cfg(target_arch = "x86_64")]
        {
            match self {
                Kernel::Avx | Kernel::AvxOpt | Kernel::AvxOptNoSqrt
                    if !is_x86_feature_detected!("avx") =>
                {
                    tracing::warn!(?self, "AVX unavailable at runtime, falling back to Scalar");
                    Kernel::Scalar
                }
                Kernel::Sse | Kernel::SseOpt | Kernel::SseOptNoSqrt
                    if !is_x86_feature_detected!("sse3") =>
                {
                    tracing::warn!(?self, "SSE3 unavailable at runtime, falling back to Scalar");
                    Kernel::Scalar
                }
                other => other,
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            if self != Kernel::Scalar {
                tracing::warn!(?self, "SIMD kernels require x86_64, falling back to Scalar");
                Kernel::Scalar
            } else {
                self
            }
        }
    }
}

/// The result of one kernel invocation, tagged with whether it still needs
/// rooting.
#[derive(Debug, Clone, Copy)]
pub enum KernelOutput {
    Distance(Distance),
    Squared(SquaredDistance),
}

impl KernelOutput {
    /// The raw scalar value. Stage 3/4 comparisons are valid on this value
    /// regardless of tag, by monotonicity of `x -> x^2` on `x >= 0`.
    #[must_use]
    pub fn raw(self) -> f64 {
        match self {
            KernelOutput::Distance(d) => d.0,
            KernelOutput::Squared(s) => s.0,
        }
    }
}

/// Computes the distance between the points at `a` and `b` using `kernel`.
///
/// `d` is the ambient dimension; `blocks` is the number of
/// `kernel.simd_width()`-wide lanes the caller's stride was padded to
/// (ignored by `Scalar`).
///
/// # Safety
/// `a` and `b` must each be valid to read for `d` `f64`s (or, for a SIMD
/// kernel, `blocks * kernel.simd_width()` `f64`s with the coordinates at
/// `d..` zero-padded). Callers must not pass a non-`Scalar` kernel on a
/// non-`x86_64` target without first calling [`Kernel::resolve`].
pub unsafe fn compute(
    kernel: Kernel,
    a: *const f64,
    b: *const f64,
    d: usize,
    blocks: usize,
    check_alignment: bool,
) -> Result<KernelOutput> {
    if check_alignment {
        if let Some(align) = kernel.required_alignment() {
            if !is_aligned(a, align) || !is_aligned(b, align) {
                return Err(Error::AlignmentViolation(format!(
                    "kernel {kernel:?} requires {align}-byte aligned operands"
                )));
            }
        }
    }

    let out = match kernel {
        Kernel::Scalar => KernelOutput::Distance(scalar::distance(
            std::slice::from_raw_parts(a, d),
            std::slice::from_raw_parts(b, d),
        )),
        #[cfg(target_arch = "x86_64")]
        Kernel::Sse => KernelOutput::Distance(sse::distance(a, b, blocks)),
        #[cfg(target_arch = "x86_64")]
        Kernel::SseOpt => KernelOutput::Distance(sse::distance_opt(a, b, blocks)),
        #[cfg(target_arch = "x86_64")]
        Kernel::SseOptNoSqrt => KernelOutput::Squared(sse::squared_opt(a, b, blocks)),
        #[cfg(target_arch = "x86_64")]
        Kernel::Avx => KernelOutput::Distance(avx::distance(a, b, blocks)),
        #[cfg(target_arch = "x86_64")]
        Kernel::AvxOpt => KernelOutput::Distance(avx::distance_opt(a, b, blocks)),
        #[cfg(target_arch = "x86_64")]
        Kernel::AvxOptNoSqrt => KernelOutput::Squared(avx::squared_opt(a, b, blocks)),
        #[cfg(not(target_arch = "x86_64"))]
        _ => unreachable!("Kernel::resolve maps non-Scalar kernels to Scalar off x86_64"),
    };
    Ok(out)
}

fn is_aligned(ptr: *const f64, align: usize) -> bool {
    (ptr as usize) % align == 0
}
