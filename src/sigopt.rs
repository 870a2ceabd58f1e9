//! Rolling Gaussian-kernel bandwidth (sigma) estimator.
//!
//! For each correntropy window start, the bandwidth is Silverman's rule of
//! thumb applied to the sample variance of a centered window of
//! `sig_win_size` samples around that position — per the `rollSigma`
//! contract documented alongside the original detection function
//! (`examples/original_source/src/transient/simpleDetFunc.h`): the window's
//! last included index is `min(data_len, i + sig_win_size/2)`, and the first
//! included index depends on the parity of `sig_win_size`. That window can
//! span up to three adjacent triple-buffer buffers (trailing/central/
//! leading), so the caller passes whichever of those are currently present;
//! `advance_window` treats them as one logical concatenated buffer.

use crate::math::{clamp_window, silverman_sigma};

pub struct SigOpt {
    sig_win_size: usize,
    scale_factor: f32,
    termination_index: Option<usize>,
}

impl SigOpt {
    pub fn new(sig_win_size: usize, scale_factor: f32) -> Self {
        Self {
            sig_win_size,
            scale_factor,
            termination_index: None,
        }
    }

    /// Reset per-stream state at the start of a new channel/run.
    pub fn setup(&mut self) {
        self.termination_index = None;
    }

    /// Record that the stream ends `index` samples into the current leading
    /// buffer, so later windows don't read past valid data.
    pub fn set_termination_index(&mut self, index: usize) {
        self.termination_index = Some(index);
    }

    /// Called once per buffer cycle; this estimator holds no state that
    /// needs clearing between buffers beyond the termination index, but the
    /// call is kept for symmetry with the triple buffer's own advance.
    pub fn advance_buffer(&mut self) {}

    /// Estimate sigma for the window centered at `start` samples into
    /// `central`. `trailing`/`leading` are `None` when the triple buffer
    /// doesn't currently hold that neighbor.
    pub fn advance_window(
        &self,
        trailing: Option<&[f32]>,
        central: &[f32],
        leading: Option<&[f32]>,
        start: usize,
    ) -> f32 {
        let trailing_len = trailing.map_or(0, |t| t.len());
        let central_len = central.len();
        let leading_len = leading.map_or(0, |l| l.len());
        let total_len = trailing_len + central_len + leading_len;
        let limit = self
            .termination_index
            .map(|t| (trailing_len + t).min(total_len))
            .unwrap_or(total_len);

        let virtual_pos = trailing_len + start;
        let half = self.sig_win_size / 2;
        let win_len = if self.sig_win_size % 2 == 1 { 2 * half + 1 } else { 2 * half };
        let (lo, len) = clamp_window(virtual_pos as i64 - half as i64, win_len as i64, limit as i64);
        if len == 0 {
            return 0.0;
        }
        let hi = lo + len;

        let get = |i: usize| -> f32 {
            if i < trailing_len {
                trailing.unwrap()[i]
            } else if i < trailing_len + central_len {
                central[i - trailing_len]
            } else {
                leading.unwrap()[i - trailing_len - central_len]
            }
        };

        let n = (hi - lo) as f64;
        let mut s1 = 0.0f64;
        let mut s2 = 0.0f64;
        for i in lo..hi {
            let v = get(i) as f64;
            s1 += v;
            s2 += v * v;
        }
        let mean = s1 / n;
        let variance = ((s2 / n) - mean * mean).max(0.0) as f32;
        silverman_sigma(self.scale_factor, variance)
    }
}
