//! Error taxonomy for the hydrology pipeline.

use thiserror::Error;

/// Errors produced by hydrology generation.
///
/// Degenerate inputs (cells with no neighbors, traces too short to form a
/// river) are not errors; the affected entity is skipped and generation
/// continues.
#[derive(Debug, Error)]
pub enum HydrologyError {
    /// Settings rejected before any stage ran. Generation never starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A drainage or acyclicity guarantee was broken mid-pipeline.
    ///
    /// The priority flood guarantees every drained cell a monotone path to
    /// the ocean, so this firing indicates a bug, not bad input. Downstream
    /// stages assume the invariant, so the run aborts.
    #[error("drainage invariant violated: {0}")]
    InvariantViolation(String),
}
