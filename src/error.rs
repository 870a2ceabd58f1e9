//! Error types for the correntropy onset/offset detection core.

use std::fmt;

/// Errors surfaced by [`crate::Core`].
///
/// Configuration errors (`ConfigInvalid`, `Unsupported`) only ever occur at
/// [`crate::Core::new`]. Every other variant is a per-chunk failure: once
/// returned, the core that produced it is poisoned and will return a clone
/// of the same error from any further call.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A configuration field was non-positive, out of range, or otherwise
    /// nonsensical.
    ConfigInvalid(String),
    /// A submitted chunk's length did not match the schedule the state
    /// machine expected for the current state.
    WrongChunkLength { expected: usize, actual: usize },
    /// A `SINGLE_CHUNK` stream was shorter than twice the correntropy
    /// window size.
    StreamTooShort { minimum: usize, actual: usize },
    /// Further input was submitted after `LAST_CHUNK`/`SINGLE_CHUNK`.
    StreamAlreadyTerminated,
    /// The anti-alias resampler failed to produce a well-formed result.
    ResampleFailure(String),
    /// The detection function failed to grow/resize.
    AllocationFailure,
    /// An internal bookkeeping invariant (buffer count, central index,
    /// termination index) was violated. Indicates a bug, not bad input.
    InternalInvariant(String),
    /// A configuration is accepted by validation but not implemented by
    /// this engine (e.g. `dedicated_threads > 0`).
    Unsupported(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ConfigInvalid(msg) => write!(f, "invalid configuration: {msg}"),
            CoreError::WrongChunkLength { expected, actual } => write!(
                f,
                "wrong chunk length: expected {expected}, got {actual}"
            ),
            CoreError::StreamTooShort { minimum, actual } => write!(
                f,
                "stream too short: need at least {minimum} samples, got {actual}"
            ),
            CoreError::StreamAlreadyTerminated => {
                write!(f, "stream already terminated")
            }
            CoreError::ResampleFailure(msg) => write!(f, "resample failure: {msg}"),
            CoreError::AllocationFailure => write!(f, "detection function allocation failed"),
            CoreError::InternalInvariant(msg) => write!(f, "internal invariant violated: {msg}"),
            CoreError::Unsupported(msg) => write!(f, "unsupported configuration: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CoreError>;
