//! Error taxonomy for the clustering engine.
//!
//! Three kinds of failure are possible, per the engine's error handling
//! contract: a rejected argument, a misaligned SIMD operand, or a failed
//! scratch-buffer allocation. All three are reported before the relevant
//! stage mutates any caller-owned state, except `AlignmentViolation`, which
//! by nature is only detectable mid-kernel-call and leaves `pi`/`lambda`/`M`
//! undefined.

use thiserror::Error;

/// Errors produced by the clustering engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A precondition on `n`, `d`, or an output buffer's length was
    /// violated. Reported before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A SIMD kernel was handed an operand that did not satisfy its
    /// alignment requirement. Reported at the first offending kernel call;
    /// the state of `pi`, `lambda`, and the scratch row is undefined
    /// afterward.
    #[error("alignment violation: {0}")]
    AlignmentViolation(String),

    /// The scratch row `M` could not be allocated. Reported before stage 2
    /// begins; `pi` and `lambda` are untouched.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
