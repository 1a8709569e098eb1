//! Data-layout adapter (component A).
//!
//! Exposes a uniform "point-at-index" view over the two accepted input
//! shapes — a single linearized buffer, or an indirect sequence of
//! pointers — and computes the SIMD-aligned stride a chosen kernel
//! requires.

use crate::alloc_guard::AllocGuard;
use crate::error::{Error, Result};
use crate::kernel::Kernel;
use std::alloc::Layout;

/// Per-point allocation footprint in doubles, rounded up to `width` lanes.
/// `width` of `0` or `1` (the `Scalar` kernel) leaves `d` unpadded.
#[must_use]
pub fn stride_for_width(d: usize, width: usize) -> usize {
    match width {
        0 | 1 => d,
        w => w * d.div_ceil(w),
    }
}

/// Stride and required byte alignment a given kernel imposes on point
/// storage.
#[must_use]
pub fn stride_for_kernel(d: usize, kernel: Kernel) -> (usize, usize) {
    match kernel.simd_width() {
        None => (d, 1),
        Some(width) => (stride_for_width(d, width), kernel.required_alignment().unwrap_or(1)),
    }
}

/// Capability set component B needs from a point collection: a length and
/// an `O(1)` pointer to the first coordinate of a given point.
pub trait Points {
    /// Number of points.
    fn len(&self) -> usize;

    /// Whether there are no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ambient dimension (unpadded).
    fn dim(&self) -> usize;

    /// Number of `width`-wide SIMD blocks the stride was padded to, for
    /// `width` in `{2, 4}`. Meaningless (and unused) for `Scalar`.
    fn blocks(&self, width: usize) -> usize;

    /// Pointer to the first coordinate of point `i`.
    ///
    /// # Safety
    /// `i` must be `< self.len()`. The returned pointer is valid to read
    /// `self.dim()` `f64`s (or, for a padded layout, up to the next lane
    /// boundary beyond `self.dim()`, which is zero-filled).
    unsafe fn point(&self, i: usize) -> *const f64;
}

/// A single contiguous buffer of `n * stride` doubles; point `i` starts at
/// offset `i * stride`.
pub struct Linearized<'a> {
    data: &'a [f64],
    n: usize,
    d: usize,
    stride: usize,
}

impl<'a> Linearized<'a> {
    /// Wraps `data` as `n` points of dimension `d` at the given `stride`
    /// (`stride >= d`). Padding coordinates (`d..stride` within each
    /// point) are assumed zero.
    pub fn new(data: &'a [f64], n: usize, d: usize, stride: usize) -> Result<Self> {
        if d == 0 {
            return Err(Error::InvalidArgument("dimension d must be >= 1".into()));
        }
        if stride < d {
            return Err(Error::InvalidArgument(format!(
                "stride {stride} smaller than dimension {d}"
            )));
        }
        let needed = n
            .checked_mul(stride)
            .ok_or_else(|| Error::InvalidArgument("n * stride overflows".into()))?;
        if data.len() < needed {
            return Err(Error::InvalidArgument(format!(
                "buffer of {} doubles too small for n={n} * stride={stride}",
                data.len()
            )));
        }
        Ok(Self { data, n, d, stride })
    }
}

impl Points for Linearized<'_> {
    fn len(&self) -> usize {
        self.n
    }

    fn dim(&self) -> usize {
        self.d
    }

    fn blocks(&self, width: usize) -> usize {
        stride_for_width(self.d, width) / width.max(1)
    }

    unsafe fn point(&self, i: usize) -> *const f64 {
        debug_assert!(i < self.n);
        self.data.as_ptr().add(i * self.stride)
    }
}

/// An ordered sequence of `n` pointers, each to a buffer of at least
/// `stride` doubles laid out as in [`Linearized`].
pub struct Indirect<'a> {
    ptrs: &'a [*const f64],
    d: usize,
    stride: usize,
}

impl<'a> Indirect<'a> {
    pub fn new(ptrs: &'a [*const f64], d: usize, stride: usize) -> Result<Self> {
        if d == 0 {
            return Err(Error::InvalidArgument("dimension d must be >= 1".into()));
        }
        if stride < d {
            return Err(Error::InvalidArgument(format!(
                "stride {stride} smaller than dimension {d}"
            )));
        }
        Ok(Self { ptrs, d, stride })
    }
}

impl Indirect<'_> {
    /// Per-pointer allocation footprint in doubles, as validated at
    /// construction.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }
}

// SAFETY: `ptrs` is read-only for the lifetime of an `Indirect`; the
// pointee buffers are caller-owned and not mutated through this type.
unsafe impl Sync for Indirect<'_> {}

impl Points for Indirect<'_> {
    fn len(&self) -> usize {
        self.ptrs.len()
    }

    fn dim(&self) -> usize {
        self.d
    }

    fn blocks(&self, width: usize) -> usize {
        stride_for_width(self.d, width) / width.max(1)
    }

    unsafe fn point(&self, i: usize) -> *const f64 {
        debug_assert!(i < self.ptrs.len());
        self.ptrs[i]
    }
}

/// An owned, correctly aligned and zero-padded linearized buffer, for
/// callers who don't already have point data laid out to a kernel's
/// requirements. Not required to use the engine.
pub struct AlignedPoints {
    guard: AllocGuard,
    n: usize,
    d: usize,
    stride: usize,
}

impl AlignedPoints {
    /// Allocates room for `n` points of dimension `d`, padded and aligned
    /// for `kernel`. The buffer is zero-initialized, so padding coordinates
    /// satisfy the zero-padding contract before any point is written.
    pub fn new(n: usize, d: usize, kernel: Kernel) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidArgument("n must be >= 1".into()));
        }
        if d == 0 {
            return Err(Error::InvalidArgument("dimension d must be >= 1".into()));
        }
        let (stride, align) = stride_for_kernel(d, kernel);
        let total = n
            .checked_mul(stride)
            .and_then(|doubles| doubles.checked_mul(std::mem::size_of::<f64>()))
            .ok_or_else(|| Error::InvalidArgument("n * stride overflows".into()))?;
        let layout = Layout::from_size_align(total, align)
            .map_err(|e| Error::AllocationFailure(e.to_string()))?;
        let guard = AllocGuard::new(layout)
            .ok_or_else(|| Error::AllocationFailure(format!("failed to allocate {total} bytes")))?;
        // SAFETY: `guard` owns a fresh allocation of exactly `total` bytes
        // at `align`; zeroing it is in-bounds and leaves every byte
        // initialized before any typed access.
        unsafe {
            std::ptr::write_bytes(guard.as_ptr(), 0, total);
        }
        Ok(Self { guard, n, d, stride })
    }

    /// Writes the coordinates of point `i` (length must equal `self.dim()`).
    pub fn set_point(&mut self, i: usize, coords: &[f64]) {
        assert!(i < self.n, "point index {i} out of bounds for n={}", self.n);
        assert_eq!(coords.len(), self.d, "expected {} coordinates", self.d);
        // SAFETY: `i < self.n` and the allocation holds `n * stride` doubles,
        // so writing `d <= stride` doubles at offset `i * stride` is in
        // bounds; the pointer is aligned and `f64`-typed by construction.
        unsafe {
            let dst = self.guard.cast::<f64>().add(i * self.stride);
            std::ptr::copy_nonoverlapping(coords.as_ptr(), dst, self.d);
        }
    }

    /// Borrows this buffer as a [`Linearized`] view.
    #[must_use]
    pub fn as_linearized(&self) -> Linearized<'_> {
        // SAFETY: the backing allocation holds exactly `n * stride` valid,
        // initialized `f64`s for the lifetime of `self`.
        let data = unsafe { std::slice::from_raw_parts(self.guard.cast::<f64>(), self.n * self.stride) };
        Linearized {
            data,
            n: self.n,
            d: self.d,
            stride: self.stride,
        }
    }

    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod layout_tests;
