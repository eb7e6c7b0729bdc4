//! Error types for host capability probing and patch selection

use thiserror::Error;

/// Result of a host capability probe or mutation attempt
pub type HostResult<T> = Result<T, HostError>;

/// Failures arising from the host-adapter layer
///
/// None of these ever reach callers of the public mutation surface; patches
/// recover locally by leaving the target entity unchanged.
#[derive(Error, Debug)]
pub enum HostError {
    /// The host build does not expose the probed entry point
    #[error("host capability absent: {0}")]
    CapabilityAbsent(&'static str),

    /// A field or record shape did not match what the host build expects
    #[error("profile shape mismatch: {0}")]
    ShapeMismatch(&'static str),

    /// Profile construction failed; eligible for retry on the next call
    #[error("profile construction failed: {0}")]
    Construction(String),
}

/// Failures surfaced by a version patch itself
#[derive(Error, Debug)]
pub enum PatchError {
    /// Predicate evaluation failed; the registry treats this as non-matching
    #[error("version predicate failed: {0}")]
    Predicate(String),
}

/// Failures during applier construction
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A required builder field was never set
    #[error("builder field not set: {0}")]
    MissingField(&'static str),
}
