//! Engine configuration (component D's worker counts and per-stage enable
//! flags, plus the kernel selection and alignment-check toggle).

use crate::error::{Error, Result};
use crate::kernel::Kernel;
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A stage's worker count: `Auto` defers to the scheduler's default
/// (typically `std::thread::available_parallelism`), `Fixed(n)` pins it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadConfig {
    #[default]
    Auto,
    Fixed(usize),
}

impl ThreadConfig {
    /// `0` maps to `Auto`, matching the "0 ⇒ default" convention of `T₂`,
    /// `T₄`, `T₅`.
    #[must_use]
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            ThreadConfig::Auto
        } else {
            ThreadConfig::Fixed(count)
        }
    }
}

/// Serializable representation of [`Kernel`], so it can round-trip through
/// TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelConfig {
    Scalar,
    Sse,
    Avx,
    SseOpt,
    AvxOpt,
    SseOptNoSqrt,
    AvxOptNoSqrt,
}

impl From<KernelConfig> for Kernel {
    fn from(k: KernelConfig) -> Self {
        match k {
            KernelConfig::Scalar => Kernel::Scalar,
            KernelConfig::Sse => Kernel::Sse,
            KernelConfig::Avx => Kernel::Avx,
            KernelConfig::SseOpt => Kernel::SseOpt,
            KernelConfig::AvxOpt => Kernel::AvxOpt,
            KernelConfig::SseOptNoSqrt => Kernel::SseOptNoSqrt,
            KernelConfig::AvxOptNoSqrt => Kernel::AvxOptNoSqrt,
        }
    }
}

impl From<Kernel> for KernelConfig {
    fn from(k: Kernel) -> Self {
        match k {
            Kernel::Scalar => KernelConfig::Scalar,
            Kernel::Sse => KernelConfig::Sse,
            Kernel::Avx => KernelConfig::Avx,
            Kernel::SseOpt => KernelConfig::SseOpt,
            Kernel::AvxOpt => KernelConfig::AvxOpt,
            Kernel::SseOptNoSqrt => KernelConfig::SseOptNoSqrt,
            Kernel::AvxOptNoSqrt => KernelConfig::AvxOptNoSqrt,
        }
    }
}

/// Full engine configuration: kernel choice, per-stage parallelism, and
/// the alignment-check toggle.
// Each bool is an independent per-stage/feature toggle (P2/P4/P5 plus the
// alignment check), not a state machine over related states.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    kernel: KernelConfig,
    parallel_stage2: bool,
    parallel_stage4: bool,
    parallel_stage5: bool,
    threads_stage2: ThreadConfig,
    threads_stage4: ThreadConfig,
    threads_stage5: ThreadConfig,
    check_alignment: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::Scalar,
            parallel_stage2: true,
            parallel_stage4: true,
            parallel_stage5: true,
            threads_stage2: ThreadConfig::Auto,
            threads_stage4: ThreadConfig::Auto,
            threads_stage5: ThreadConfig::Auto,
            check_alignment: cfg!(debug_assertions),
        }
    }
}

impl ClusterConfig {
    /// Every stage sequential on the calling thread, matching the
    /// original's separate single-threaded entry point.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel_stage2: false,
            parallel_stage4: false,
            parallel_stage5: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel.into();
        self
    }

    #[must_use]
    pub fn with_parallel_stage2(mut self, enabled: bool) -> Self {
        self.parallel_stage2 = enabled;
        self
    }

    #[must_use]
    pub fn with_parallel_stage4(mut self, enabled: bool) -> Self {
        self.parallel_stage4 = enabled;
        self
    }

    #[must_use]
    pub fn with_parallel_stage5(mut self, enabled: bool) -> Self {
        self.parallel_stage5 = enabled;
        self
    }

    #[must_use]
    pub fn with_threads_stage2(mut self, threads: ThreadConfig) -> Self {
        self.threads_stage2 = threads;
        self
    }

    #[must_use]
    pub fn with_threads_stage4(mut self, threads: ThreadConfig) -> Self {
        self.threads_stage4 = threads;
        self
    }

    #[must_use]
    pub fn with_threads_stage5(mut self, threads: ThreadConfig) -> Self {
        self.threads_stage5 = threads;
        self
    }

    #[must_use]
    pub fn with_check_alignment(mut self, enabled: bool) -> Self {
        self.check_alignment = enabled;
        self
    }

    #[must_use]
    pub fn kernel(&self) -> Kernel {
        self.kernel.into()
    }

    #[must_use]
    pub fn parallel_stage2(&self) -> bool {
        self.parallel_stage2
    }

    #[must_use]
    pub fn parallel_stage4(&self) -> bool {
        self.parallel_stage4
    }

    #[must_use]
    pub fn parallel_stage5(&self) -> bool {
        self.parallel_stage5
    }

    #[must_use]
    pub fn threads_stage2(&self) -> ThreadConfig {
        self.threads_stage2
    }

    #[must_use]
    pub fn threads_stage4(&self) -> ThreadConfig {
        self.threads_stage4
    }

    #[must_use]
    pub fn threads_stage5(&self) -> ThreadConfig {
        self.threads_stage5
    }

    #[must_use]
    pub fn check_alignment(&self) -> bool {
        self.check_alignment
    }

    /// Loads a configuration from a TOML file, falling back to
    /// [`ClusterConfig::default`] values for any field the file omits.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Figment::from(figment::providers::Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| Error::InvalidArgument(format!("invalid configuration: {e}")))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
