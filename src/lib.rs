//! Streaming correntropy-based note onset/offset detection.
//!
//! A fixed audio pipeline — gammatone filter bank, rolling Gaussian-kernel
//! bandwidth estimator, Gaussian-kernel correntropy, first-difference
//! detection function, kernel-matching transient detector — consumed one
//! audio chunk at a time through [`Core`]. See `SPEC_FULL.md` for the full
//! specification this crate implements.

pub mod candidate;
pub mod config;
pub mod correntropy;
pub mod detfunc;
pub mod error;
pub mod filterbank;
pub mod gammatone;
pub mod math;
pub mod resample;
pub mod sigopt;
pub mod transient;
pub mod triple_buffer;

use log::warn;

pub use candidate::{Candidate, CandidateList};
pub use config::{Config, CorrStrategy, FilterStrategy};
pub use error::{CoreError, Result};

use detfunc::DetFuncCore;

/// The engine: accepts one validated chunk of raw audio at a time and
/// accumulates a running detection function.
///
/// Any per-chunk error poisons the core: once `set_input_chunk` returns
/// `Err`, every later call returns a clone of that same error without
/// touching any internal state, mirroring the original's one-way
/// `NO_CHUNK → ... → LAST_CHUNK`/`SINGLE_CHUNK` state machine where nothing
/// recovers past termination. Configuration errors are different — they
/// only ever happen in [`Core::new`], before any chunk has been accepted.
pub struct Core {
    inner: DetFuncCore,
    poisoned: Option<CoreError>,
}

impl Core {
    /// Validate `cfg` and build a fresh core. Fails with
    /// `CoreError::ConfigInvalid` for a malformed configuration, or
    /// `CoreError::Unsupported` for a configuration this engine accepts but
    /// doesn't implement (`dedicated_threads > 0`).
    pub fn new(cfg: Config) -> Result<Self> {
        cfg.validate()?;
        let inner = DetFuncCore::new(&cfg)?;
        Ok(Self {
            inner,
            poisoned: None,
        })
    }

    /// The length required for every chunk before the first, unless it is
    /// also the final chunk (see [`Core::set_input_chunk`]).
    pub fn first_chunk_length(&self) -> usize {
        self.inner.first_chunk_length()
    }

    /// The length required for every subsequent non-final chunk.
    pub fn normal_chunk_length(&self) -> usize {
        self.inner.normal_chunk_length()
    }

    /// Submit the next chunk of raw audio.
    ///
    /// `is_final` marks the stream's last chunk: it may be shorter than
    /// `first_chunk_length`/`normal_chunk_length` (down to `2 *
    /// corr_win_size` samples for a single-chunk stream), and after it's
    /// accepted, every further call returns
    /// `CoreError::StreamAlreadyTerminated`.
    ///
    /// A single-threaded core (the only configuration this engine
    /// implements) does all of its work here; [`Core::process_input`] exists
    /// for symmetry with a future dedicated-thread mode and currently does
    /// nothing.
    pub fn set_input_chunk(&mut self, samples: &[f32], is_final: bool) -> Result<()> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        match self.inner.set_input_chunk(samples, is_final) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!("core poisoned by chunk error: {err}");
                self.poisoned = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Drive any pending asynchronous work. A no-op in the single-threaded
    /// (`dedicated_threads == 0`) mode this engine implements — every chunk
    /// is fully processed inside [`Core::set_input_chunk`] already.
    pub fn process_input(&mut self) -> Result<()> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        Ok(())
    }

    /// Take ownership of the detection function accumulated so far. A
    /// second call (with nothing new submitted in between) returns an empty
    /// `Vec`, mirroring the original's `dFC->detFunc = NULL` after
    /// retrieval.
    pub fn get_detection_function(&mut self) -> Result<Vec<f32>> {
        if let Some(err) = &self.poisoned {
            return Err(err.clone());
        }
        Ok(self.inner.take_detection_function())
    }
}
