//! Streaming 2x up/downsampling used to anti-alias the gammatone cascade.
//!
//! Upsampling interpolates the inserted sample with the same cubic spline
//! fundsp's own [`crate::math::spline`] exposes (see fundsp's `resample.rs`,
//! which evaluates the same spline at an arbitrary fractional position; here
//! the position is pinned to the exact midpoint between two input samples).
//! Downsampling applies a short, symmetric windowed-sinc lowpass — taps drawn
//! from [`crate::math::sinc`] at a cutoff of one quarter of the oversampled
//! rate (the target Nyquist after halving) — before decimating, to suppress
//! the images introduced by upsampling each channel's cascade. Both
//! directions carry a small history across calls (fundsp's `Delay`
//! ring-buffer idiom, inlined here since the history is always exactly two
//! samples) so that streaming across chunk boundaries is seamless.

use crate::math::{sinc, spline};

/// Streaming 2x resampler pair (upsample before the gammatone cascade,
/// downsample after).
#[derive(Clone)]
pub struct Resampler {
    up_history: [f32; 2],
    down_history: [f32; 2],
    down_beta: f32,
    down_alpha: f32,
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Resampler {
    pub fn new() -> Self {
        // 3-tap windowed-sinc lowpass, cutoff at a quarter of the
        // oversampled rate, normalized to unity DC gain.
        let cutoff = 0.25_f32;
        let center = 2.0 * cutoff * sinc(0.0);
        let side = 2.0 * cutoff * sinc(2.0 * cutoff);
        let sum = center + 2.0 * side;
        Self {
            up_history: [0.0; 2],
            down_history: [0.0; 2],
            down_beta: side / sum,
            down_alpha: center / sum,
        }
    }

    /// Reset history to silence, as if the stream had started here.
    pub fn reset(&mut self) {
        self.up_history = [0.0; 2];
        self.down_history = [0.0; 2];
    }

    /// Upsample `input` to twice its length. Samples requested past the end
    /// of `input` (needed to interpolate the very last pair) are
    /// zero-padded.
    pub fn upsample(&mut self, input: &[f32]) -> Vec<f32> {
        let n = input.len();
        let history = self.up_history;
        let get = |i: i64| -> f32 {
            if i < 0 {
                match i {
                    -1 => history[1],
                    -2 => history[0],
                    _ => 0.0,
                }
            } else if (i as usize) < n {
                input[i as usize]
            } else {
                0.0
            }
        };

        let mut out = Vec::with_capacity(n * 2);
        for i in 0..n {
            out.push(get(i as i64));
            let y0 = get(i as i64 - 1);
            let y1 = get(i as i64);
            let y2 = get(i as i64 + 1);
            let y3 = get(i as i64 + 2);
            out.push(spline(y0, y1, y2, y3, 0.5));
        }

        self.update_up_history(input);
        out
    }

    fn update_up_history(&mut self, input: &[f32]) {
        match input.len() {
            0 => {}
            1 => self.up_history = [self.up_history[1], input[0]],
            n => self.up_history = [input[n - 2], input[n - 1]],
        }
    }

    /// Downsample `input` (assumed to be at twice the target rate) to half
    /// its length, rounding up for an odd-length tail chunk.
    pub fn downsample(&mut self, input: &[f32]) -> Vec<f32> {
        let n = input.len();
        let history = self.down_history;
        let get = |i: i64| -> f32 {
            if i < 0 {
                match i {
                    -1 => history[1],
                    -2 => history[0],
                    _ => 0.0,
                }
            } else if (i as usize) < n {
                input[i as usize]
            } else {
                0.0
            }
        };

        let mut out = Vec::with_capacity(n.div_ceil(2));
        let mut i = 0usize;
        while i < n {
            let filtered = self.down_beta * get(i as i64 - 1)
                + self.down_alpha * get(i as i64)
                + self.down_beta * get(i as i64 + 1);
            out.push(filtered);
            i += 2;
        }

        self.update_down_history(input);
        out
    }

    fn update_down_history(&mut self, input: &[f32]) {
        match input.len() {
            0 => {}
            1 => self.down_history = [self.down_history[1], input[0]],
            n => self.down_history = [input[n - 2], input[n - 1]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsample_doubles_length() {
        let mut r = Resampler::new();
        let out = r.upsample(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out.len(), 8);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[2], 2.0);
        assert_eq!(out[4], 3.0);
        assert_eq!(out[6], 4.0);
    }

    #[test]
    fn downsample_halves_length() {
        let mut r = Resampler::new();
        let out = r.downsample(&[1.0; 8]);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn constant_signal_round_trips_flat() {
        let mut up = Resampler::new();
        let mut down = Resampler::new();
        let input = vec![0.5f32; 16];
        let upped = up.upsample(&input);
        let downed = down.downsample(&upped);
        for v in downed {
            assert!((v - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn history_carries_across_chunks() {
        let mut r = Resampler::new();
        let _ = r.upsample(&[1.0, 2.0, 3.0, 4.0]);
        let out = r.upsample(&[5.0, 6.0]);
        // the interpolated sample at the chunk boundary (4.0 -> 5.0) should
        // use the true neighbor from the previous chunk, not silence.
        assert!(out[1] > 3.0 && out[1] < 6.0);
    }
}
