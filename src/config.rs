//! Core configuration.

use crate::error::{CoreError, Result};

/// The strategy used to build the filter bank's per-channel filters.
///
/// The only strategy specified for this engine is the all-pole gammatone
/// cascade; the variant exists (rather than a bare unit struct) so that a
/// future filter family slots in without changing `Config`'s shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterStrategy {
    #[default]
    Gammatone,
}

/// The strategy used to accumulate correntropy contributions into the PSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrStrategy {
    #[default]
    Gaussian,
}

/// Configuration for [`crate::Core::new`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Correntropy window size `W` (and maximum lag), in samples.
    pub corr_win_size: usize,
    /// Hop size between correntropy windows / PSM entries, in samples.
    pub hopsize: usize,
    /// Number of gammatone filter bank channels.
    pub num_channels: usize,
    /// Rolling sigma estimator window size, in samples.
    pub sig_win_size: usize,
    /// Gaussian kernel bandwidth scale factor (Silverman's rule: `(4/3)^(1/5)`).
    pub scale_factor: f32,
    /// Sample rate of the incoming audio, in Hz.
    pub samplerate: u32,
    /// Lowest filter bank center frequency, in Hz.
    pub min_freq: f32,
    /// Highest filter bank center frequency, in Hz. Must equal `min_freq`
    /// when `num_channels == 1`.
    pub max_freq: f32,
    /// Filter bank strategy.
    pub filter_strategy: FilterStrategy,
    /// PSM accumulation strategy.
    pub corr_strategy: CorrStrategy,
    /// Number of dedicated worker threads. Only `0` (single-threaded) is
    /// currently implemented; see `SPEC_FULL.md` §5.
    pub dedicated_threads: usize,
}

impl Config {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.corr_win_size == 0 {
            return Err(CoreError::ConfigInvalid("corr_win_size must be > 0".into()));
        }
        if self.hopsize == 0 {
            return Err(CoreError::ConfigInvalid("hopsize must be > 0".into()));
        }
        if self.num_channels == 0 {
            return Err(CoreError::ConfigInvalid("num_channels must be > 0".into()));
        }
        if self.sig_win_size == 0 {
            return Err(CoreError::ConfigInvalid("sig_win_size must be > 0".into()));
        }
        if self.scale_factor <= 0.0 {
            return Err(CoreError::ConfigInvalid("scale_factor must be > 0".into()));
        }
        if self.samplerate == 0 {
            return Err(CoreError::ConfigInvalid("samplerate must be > 0".into()));
        }
        if self.min_freq <= 0.0 {
            return Err(CoreError::ConfigInvalid("min_freq must be > 0".into()));
        }
        if self.max_freq < self.min_freq {
            return Err(CoreError::ConfigInvalid(
                "max_freq must be >= min_freq".into(),
            ));
        }
        if self.num_channels == 1 && self.max_freq != self.min_freq {
            return Err(CoreError::ConfigInvalid(
                "min_freq must equal max_freq when num_channels == 1".into(),
            ));
        }
        // `dedicated_threads < 0` cannot occur since the field is unsigned;
        // non-zero values are accepted here and rejected later by `Core::new`
        // with `CoreError::Unsupported`, matching the original collaborator's
        // own "temporary" restriction (see DESIGN.md).
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            corr_win_size: 138,
            hopsize: 55,
            num_channels: 1,
            sig_win_size: 7 * 11025,
            scale_factor: crate::math::SILVERMAN_SCALE,
            samplerate: 11025,
            min_freq: 220.0,
            max_freq: 220.0,
            filter_strategy: FilterStrategy::Gammatone,
            corr_strategy: CorrStrategy::Gaussian,
            dedicated_threads: 0,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn zero_corr_win_size_rejected() {
        let mut cfg = base();
        cfg.corr_win_size = 0;
        assert!(matches!(
            cfg.validate(),
            Err(CoreError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn single_channel_requires_equal_bounds() {
        let mut cfg = base();
        cfg.max_freq = 440.0;
        assert!(cfg.validate().is_err());
    }
}
