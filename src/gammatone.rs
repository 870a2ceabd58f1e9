//! Fourth-order all-pole gammatone filter (Slaney 1993), realized as a
//! cascade of four biquads in direct form II transposed.
//!
//! The biquad shape (`BiquadCoefs`, DF2T `tick`) follows
//! `examples/SamiPerttu-fundsp/src/biquad.rs`. The coefficient derivation
//! follows the Slaney all-pole approximation's `allPoleCoef`, with one
//! correction: response magnitude (used to normalize each stage to 0 dB
//! gain at the center frequency) is evaluated with the numerator/denominator
//! coefficients in their natural order (`b0` the immediate-sample term,
//! `b2` the two-sample-delayed term) rather than the reversed order the
//! original used — the original's `biquadFilter` recurrence itself treats
//! `b0` as the immediate term, so normalizing against the reversed order
//! would normalize to the wrong frequency.
//!
//! Each channel runs its cascade at twice its nominal sample rate to keep
//! the filter's pole locations away from the unit circle at high center
//! frequencies; [`crate::resample::Resampler`] handles the surrounding
//! 2x upsample/downsample.

use std::f64::consts::TAU;

use num_complex::Complex64;

use crate::math::erb;
use crate::resample::Resampler;

/// Coefficients for one second-order section, `a0` implicitly 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadCoefs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefs {
    /// Complex transfer function `H(z)` evaluated at `z`.
    fn transfer(&self, z: Complex64) -> Complex64 {
        let z_inv = z.inv();
        let z_inv2 = z_inv * z_inv;
        (self.b0 + self.b1 * z_inv + self.b2 * z_inv2)
            / (1.0 + self.a1 * z_inv + self.a2 * z_inv2)
    }

    /// Magnitude response at `freq` Hz, at the given sample rate.
    pub fn magnitude_response(&self, freq: f64, samplerate: f64) -> f64 {
        let w = TAU * freq / samplerate;
        self.transfer(Complex64::new(0.0, w).exp()).norm()
    }

    /// Scale the feedforward coefficients so the response has unity
    /// magnitude at `freq`.
    fn normalize(&mut self, freq: f64, samplerate: f64) {
        let gain = self.magnitude_response(freq, samplerate);
        self.b0 /= gain;
        self.b1 /= gain;
        self.b2 /= gain;
    }
}

/// One second-order section in direct form II transposed, with `f64` state
/// for precision across long cascades.
#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    coefs: BiquadCoefs,
    d1: f64,
    d2: f64,
}

impl Biquad {
    pub fn new(coefs: BiquadCoefs) -> Self {
        Self {
            coefs,
            d1: 0.0,
            d2: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.d1 = 0.0;
        self.d2 = 0.0;
    }

    #[inline]
    pub fn tick(&mut self, x: f32) -> f32 {
        let x = x as f64;
        let y = self.coefs.b0 * x + self.d1;
        self.d1 = self.coefs.b1 * x - self.coefs.a1 * y + self.d2;
        self.d2 = self.coefs.b2 * x - self.coefs.a2 * y;
        y as f32
    }
}

/// Derive the four all-pole gammatone stages for `center_freq` at
/// `samplerate`, each individually gain-normalized.
fn all_pole_coefs(center_freq: f64, samplerate: f64) -> [BiquadCoefs; 4] {
    let delta_t = 1.0 / samplerate;
    let cf = center_freq;
    let bandwidth = TAU * 1.019 * erb(cf as f32) as f64;
    let decay = (-bandwidth * delta_t).exp();
    let w = 2.0 * cf * std::f64::consts::PI * delta_t;

    let mut stages = [BiquadCoefs::default(); 4];
    for (i, stage) in stages.iter_mut().enumerate() {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        let root = if i < 2 {
            (3.0 + 2f64.powf(1.5)).sqrt()
        } else {
            (3.0 - 2f64.powf(1.5)).sqrt()
        };
        let b1 = -((2.0 * delta_t * w.cos() * decay) + (sign * 2.0 * root * delta_t * w.sin() * decay)) / 2.0;
        let mut coefs = BiquadCoefs {
            b0: delta_t,
            b1,
            b2: 0.0,
            a1: -2.0 * w.cos() * decay,
            a2: decay * decay,
        };
        coefs.normalize(center_freq, samplerate);
        *stage = coefs;
    }
    stages
}

/// A single gammatone channel: four cascaded biquads run at twice the
/// nominal sample rate, wrapped by the anti-alias resampler.
pub struct GammatoneFilter {
    stages: [Biquad; 4],
    resampler: Resampler,
    center_freq: f32,
}

impl GammatoneFilter {
    pub fn new(center_freq: f32, samplerate: u32) -> Self {
        let coefs = all_pole_coefs(center_freq as f64, 2.0 * samplerate as f64);
        let stages = [
            Biquad::new(coefs[0]),
            Biquad::new(coefs[1]),
            Biquad::new(coefs[2]),
            Biquad::new(coefs[3]),
        ];
        Self {
            stages,
            resampler: Resampler::new(),
            center_freq,
        }
    }

    pub fn center_freq(&self) -> f32 {
        self.center_freq
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.resampler.reset();
    }

    /// Filter one chunk, returning a buffer the same length as `input`.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        let mut x = self.resampler.upsample(input);
        for stage in &mut self.stages {
            for v in x.iter_mut() {
                *v = stage.tick(*v);
            }
        }
        self.resampler.downsample(&x)
    }
}
