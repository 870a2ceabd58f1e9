//! Free numeric helpers shared by the filter bank, sigma estimator, and
//! correntropy kernel.

use core::f32::consts::PI;

/// Equivalent Rectangular Bandwidth of a filter centered at `f` (Hz).
#[inline]
pub fn erb(f: f32) -> f32 {
    24.7 * (0.00437 * f + 1.0)
}

/// Silverman's rule of thumb scale factor, `(4/3)^(1/5)`.
pub const SILVERMAN_SCALE: f32 = 1.059_223_8;

/// Bandwidth-scaled standard deviation for a Gaussian KDE kernel, given the
/// running variance of a window of `n` samples and a scale factor.
#[inline]
pub fn silverman_sigma(scale_factor: f32, variance: f32) -> f32 {
    scale_factor * variance.max(0.0).sqrt()
}

/// Catmull-Rom cubic spline through `y0..y3`, interpolating between `y1`
/// (at `x = 0`) and `y2` (at `x = 1`).
#[inline]
pub fn spline(y0: f32, y1: f32, y2: f32, y3: f32, x: f32) -> f32 {
    y1 + x / 2.0
        * (y2 - y0 + x * (2.0 * y0 - 5.0 * y1 + 4.0 * y2 - y3 + x * (3.0 * (y1 - y2) + y3 - y0)))
}

/// Normalized sinc, `sin(pi x) / (pi x)`, with `sinc(0) = 1`. Used to derive
/// the windowed-sinc lowpass taps the anti-alias downsampler runs before
/// decimating (see `src/resample.rs`).
#[inline]
pub fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-7 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Glasberg & Moore's ERB-rate scale (ERB-number), in ERBs.
#[inline]
pub fn erb_rate(f: f32) -> f32 {
    21.4 * (0.00437 * f + 1.0).log10()
}

/// Inverse of [`erb_rate`]: the frequency (Hz) at a given ERB-number.
#[inline]
pub fn erb_rate_inv(e: f32) -> f32 {
    (10f32.powf(e / 21.4) - 1.0) / 0.00437
}

/// Center frequencies spaced evenly by ERB-number between `lo` and `hi`
/// inclusive, `n` of them. When `n == 1`, returns `[lo]` and the caller is
/// expected to have already checked `lo == hi` (the filter bank's
/// single-channel contract).
pub fn erb_space(lo: f32, hi: f32, n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![lo];
    }
    let e_lo = erb_rate(lo);
    let e_hi = erb_rate(hi);
    (0..n)
        .map(|i| {
            let t = i as f32 / (n - 1) as f32;
            erb_rate_inv(e_lo + t * (e_hi - e_lo))
        })
        .collect()
}

/// Clamp `start..start+len` to `0..total`, returning the clamped window as
/// `(start, len)`. Used by the rolling sigma estimator and the correntropy
/// pass when a window would otherwise run off either edge of the stream.
#[inline]
pub fn clamp_window(start: i64, len: i64, total: i64) -> (usize, usize) {
    let end = (start + len).clamp(0, total);
    let start = start.clamp(0, total);
    (start as usize, (end - start).max(0) as usize)
}
