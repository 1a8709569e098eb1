//! Parallel scheduler (component D).
//!
//! Stages 2, 4, and 5 each run inside a fork-join parallel region: no
//! worker proceeds past the region's end until all have finished. A
//! dedicated [`rayon::ThreadPool`] is built once per `cluster` call per
//! enabled stage, sized by that stage's [`ThreadConfig`]; a disabled stage
//! runs its loop on the calling thread and never touches a pool.

use crate::config::{ClusterConfig, ThreadConfig};
use crate::error::{Error, Result};
use rayon::prelude::*;
use rayon::ThreadPool;

/// Holds the (at most three) thread pools backing stages 2, 4, and 5 for
/// the duration of one `cluster` call.
pub struct Scheduler {
    stage2: Option<ThreadPool>,
    stage4: Option<ThreadPool>,
    stage5: Option<ThreadPool>,
}

impl Scheduler {
    pub fn new(cfg: &ClusterConfig) -> Result<Self> {
        Ok(Self {
            stage2: build_pool(cfg.parallel_stage2(), cfg.threads_stage2())?,
            stage4: build_pool(cfg.parallel_stage4(), cfg.threads_stage4())?,
            stage5: build_pool(cfg.parallel_stage5(), cfg.threads_stage5())?,
        })
    }

    /// Runs `body(i)` for `i in 0..len`, across the stage-2 pool if
    /// enabled, else sequentially on the calling thread. Blocks until every
    /// index has been processed (fork-join barrier).
    pub fn stage2<F>(&self, len: usize, body: F)
    where
        F: Fn(usize) + Sync,
    {
        run_region(self.stage2.as_ref(), len, body);
    }

    /// Same as [`Scheduler::stage2`], for stage 4.
    pub fn stage4<F>(&self, len: usize, body: F)
    where
        F: Fn(usize) + Sync,
    {
        run_region(self.stage4.as_ref(), len, body);
    }

    /// Same as [`Scheduler::stage2`], for stage 5 (the post-pass).
    pub fn stage5<F>(&self, len: usize, body: F)
    where
        F: Fn(usize) + Sync,
    {
        run_region(self.stage5.as_ref(), len, body);
    }
}

fn build_pool(enabled: bool, threads: ThreadConfig) -> Result<Option<ThreadPool>> {
    if !enabled {
        return Ok(None);
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let ThreadConfig::Fixed(n) = threads {
        builder = builder.num_threads(n);
    }
    let pool = builder
        .build()
        .map_err(|e| Error::AllocationFailure(format!("failed to build worker pool: {e}")))?;
    Ok(Some(pool))
}

fn run_region<F>(pool: Option<&ThreadPool>, len: usize, body: F)
where
    F: Fn(usize) + Sync,
{
    match pool {
        Some(pool) => pool.install(|| (0..len).into_par_iter().for_each(&body)),
        None => (0..len).for_each(&body),
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
