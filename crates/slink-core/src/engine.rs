//! SLINK update loop (component C) and the square-root post-pass
//! (component E): the `cluster` entry point.

use crate::config::ClusterConfig;
use crate::error::{Error, Result};
use crate::kernel;
use crate::layout::Points;
use crate::scheduler::Scheduler;
use std::marker::PhantomData;
use std::sync::Mutex;

/// A `*const f64` that is safe to share read-only across worker threads:
/// stage 2 never writes through it, only through `m_row`.
struct SyncPtr(*const f64);

impl SyncPtr {
    /// Exists so closures capture the whole wrapper (and thus its `Sync`
    /// impl) rather than precisely capturing the bare, non-`Sync` field.
    fn get(&self) -> *const f64 {
        self.0
    }
}

// SAFETY: workers only ever read through this pointer; no interior
// mutability is exposed.
unsafe impl Sync for SyncPtr {}

/// A raw-pointer view over a slice that lets disjoint indices be written
/// from multiple threads without a per-element lock. Every stage that uses
/// this only ever writes an index to one worker, so there is no aliasing
/// in practice; the compiler cannot see that, hence the unsafe `Sync`.
struct DisjointMut<'a, T> {
    ptr: *mut T,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: callers of `write`/`read` uphold disjoint-index access per the
// stage's own partitioning (stage 2 and stage 4 write distinct indices,
// stage 5 likewise); see module docs.
unsafe impl<T> Sync for DisjointMut<'_, T> {}

impl<'a, T> DisjointMut<'a, T> {
    fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `i` must be in bounds and not concurrently accessed by another
    /// caller this round.
    unsafe fn write(&self, i: usize, value: T) {
        self.ptr.add(i).write(value);
    }
}

impl<T: Copy> DisjointMut<'_, T> {
    /// # Safety
    /// Same as [`DisjointMut::write`].
    unsafe fn read(&self, i: usize) -> T {
        *self.ptr.add(i)
    }
}

/// Computes the single-linkage dendrogram of `points` in pointer
/// representation, writing `pi_out[i]`/`lambda_out[i]` for every `i`.
///
/// `pi_out` and `lambda_out` must each have length `points.len()`.
pub fn cluster<P: Points + Sync>(
    points: &P,
    pi_out: &mut [usize],
    lambda_out: &mut [f64],
    cfg: &ClusterConfig,
) -> Result<()> {
    let n = points.len();
    let d = points.dim();

    if n == 0 {
        return Err(Error::InvalidArgument("n must be >= 1".into()));
    }
    if d == 0 {
        return Err(Error::InvalidArgument("dimension d must be >= 1".into()));
    }
    if pi_out.len() != n {
        return Err(Error::InvalidArgument(format!(
            "pi_out has length {} but n = {n}",
            pi_out.len()
        )));
    }
    if lambda_out.len() != n {
        return Err(Error::InvalidArgument(format!(
            "lambda_out has length {} but n = {n}",
            lambda_out.len()
        )));
    }

    let kernel = cfg.kernel().resolve();
    let width = kernel.simd_width().unwrap_or(1);
    let check_alignment = cfg.check_alignment();

    let mut m: Vec<f64> = Vec::new();
    m.try_reserve_exact(n)
        .map_err(|e| Error::AllocationFailure(format!("scratch row of {n} doubles: {e}")))?;
    m.resize(n, 0.0);

    let span = tracing::info_span!("cluster", n, d, kernel = ?kernel);
    let _enter = span.enter();

    let scheduler = Scheduler::new(cfg)?;

    pi_out[0] = 0;
    lambda_out[0] = f64::INFINITY;

    for sample in 1..n {
        // Stage 1: seed the new sample.
        pi_out[sample] = sample;
        lambda_out[sample] = f64::INFINITY;

        // Stage 2: distance row, parallelizable.
        // SAFETY: `sample < n` (loop bound) so `points.point(sample)` is
        // valid; `blocks` matches the kernel's lane width, per the
        // `Points` contract.
        let b_ptr = SyncPtr(unsafe { points.point(sample) });
        let blocks = points.blocks(width);
        let m_row = DisjointMut::new(&mut m[..sample]);
        let kernel_error: Mutex<Option<Error>> = Mutex::new(None);
        scheduler.stage2(sample, |i| {
            // SAFETY: `i < sample <= n`, so `points.point(i)` is valid;
            // `m_row` covers indices `0..sample` and each worker only
            // touches its own `i`.
            let value = unsafe {
                let a_ptr = points.point(i);
                kernel::compute(kernel, a_ptr, b_ptr.get(), d, blocks, check_alignment)
            };
            match value {
                Ok(out) => unsafe { m_row.write(i, out.raw()) },
                Err(e) => *kernel_error.lock().unwrap() = Some(e),
            }
        });
        if let Some(e) = kernel_error.into_inner().unwrap() {
            return Err(e);
        }

        // Stage 3: sequential Sibson recurrence.
        for i in 0..sample {
            let mi = m[i];
            let target = pi_out[i];
            if lambda_out[i] >= mi {
                if m[target] > lambda_out[i] {
                    m[target] = lambda_out[i];
                }
                lambda_out[i] = mi;
                pi_out[i] = sample;
            } else if m[target] > mi {
                m[target] = mi;
            }
        }

        // Stage 4: ancestor fix-up, parallelizable.
        stage4_fixup(&scheduler, sample, pi_out, lambda_out);
    }

    // Component E: square-root post-pass, only for squared-output kernels.
    if kernel.is_squared_output() && n > 1 {
        let lambda_row = DisjointMut::new(&mut lambda_out[..n - 1]);
        scheduler.stage5(n - 1, |i| {
            // SAFETY: `i < n - 1`, covered by `lambda_row`, disjoint per i.
            unsafe {
                let squared = lambda_row.read(i);
                lambda_row.write(i, squared.sqrt());
            }
        });
    }

    Ok(())
}

fn stage4_fixup(scheduler: &Scheduler, sample: usize, pi_out: &mut [usize], lambda_out: &[f64]) {
    let pi_row = DisjointMut::new(&mut pi_out[..sample]);
    scheduler.stage4(sample, |i| {
        // SAFETY: `i < sample`; this read targets the same slot `i` owns
        // and precedes this worker's own (possible) write to it.
        let ancestor = unsafe { pi_row.read(i) };
        if lambda_out[i] >= lambda_out[ancestor] {
            // SAFETY: `i < sample`, covered by `pi_row`, disjoint per i.
            unsafe { pi_row.write(i, sample) };
        }
    });
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
