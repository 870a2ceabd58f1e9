//! Gaussian-kernel correntropy and the pooled summary matrix (PSM) it feeds.
//!
//! `psm_entry_contrib` computes one entry's worth of the correntropy sum —
//! ripped, per `examples/original_source/src/detFuncCore.c`'s own comment
//! on `calcPSMEntryContrib`, from a fast Gauss transform: for a window of
//! `corr_win_size` samples starting at `x`, every sample is paired with
//! every sample up to `corr_win_size` steps ahead of it (so `x` must have at
//! least `2 * corr_win_size` valid samples beyond its start — the caller is
//! responsible for that bound; debug builds assert it rather than silently
//! reading short).

/// One entry's correntropy contribution over a window of `corr_win_size`
/// samples starting at `x[0]`, with Gaussian kernel bandwidth `sigma`.
pub fn psm_entry_contrib(x: &[f32], corr_win_size: usize, sigma: f32) -> f32 {
    debug_assert!(
        x.len() >= 2 * corr_win_size,
        "psm_entry_contrib needs 2 * corr_win_size samples of lookahead"
    );
    if sigma <= 0.0 {
        // A degenerate (silent) window has no usable bandwidth; treat its
        // correntropy contribution as zero rather than dividing by zero.
        return 0.0;
    }

    const M_1_SQRT2PI: f32 = 0.398_942_28;
    let denom = -0.5 / (sigma * sigma);
    let mut out = 0.0f32;
    for i in 0..corr_win_size {
        for j in 1..=corr_win_size {
            let temp = x[i] - x[i + j];
            out += (temp * temp * denom).exp();
        }
    }
    out * M_1_SQRT2PI / sigma
}

/// Accumulates per-hop correntropy entries for one channel's current
/// processing round, before they're folded into the running detection
/// function.
#[derive(Debug, Clone, Default)]
pub struct Psm {
    entries: Vec<f32>,
}

impl Psm {
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![0.0; len],
        }
    }

    pub fn reset(&mut self, len: usize) {
        self.entries.clear();
        self.entries.resize(len, 0.0);
    }

    pub fn add(&mut self, index: usize, contrib: f32) {
        self.entries[index] += contrib;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_window_gives_maximal_kernel_sum() {
        let x = vec![1.0f32; 16];
        let contrib = psm_entry_contrib(&x, 4, 1.0);
        // every pair has temp == 0, so every one of the 4*4 kernels
        // evaluates to exp(0) = 1, leaving 16 * M_1_SQRT2PI / sigma.
        let expected = 16.0 * 0.398_942_28;
        assert!((contrib - expected).abs() < 1e-4);
    }

    #[test]
    fn zero_sigma_is_treated_as_no_contribution() {
        let x = vec![1.0f32; 16];
        assert_eq!(psm_entry_contrib(&x, 4, 0.0), 0.0);
    }

    #[test]
    fn psm_accumulates_across_channels() {
        let mut psm = Psm::new(3);
        psm.add(1, 0.5);
        psm.add(1, 0.25);
        assert_eq!(psm.as_slice(), &[0.0, 0.75, 0.0]);
    }
}
