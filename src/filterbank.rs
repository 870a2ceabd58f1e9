//! The full bank of gammatone channels the detection core runs in parallel.

use crate::gammatone::GammatoneFilter;
use crate::math::erb_space;
use crate::triple_buffer::TripleBuffer;

/// N gammatone channels, center frequencies spaced evenly by ERB-number
/// between `min_freq` and `max_freq` inclusive. Also owns the scheduling
/// parameters (`first_chunk_length`, `normal_chunk_length`) that the state
/// machine negotiates chunk sizes against, since both are sized from the
/// same `pSMLength`/`corrWinSize` geometry each channel's buffers share.
pub struct FilterBank {
    channels: Vec<GammatoneFilter>,
    psm_len: usize,
    corr_win_size: usize,
}

impl FilterBank {
    pub fn new(
        num_channels: usize,
        min_freq: f32,
        max_freq: f32,
        samplerate: u32,
        psm_len: usize,
        corr_win_size: usize,
    ) -> Self {
        let freqs = erb_space(min_freq, max_freq, num_channels);
        let channels = freqs
            .into_iter()
            .map(|f| GammatoneFilter::new(f, samplerate))
            .collect();
        Self {
            channels,
            psm_len,
            corr_win_size,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn center_freqs(&self) -> Vec<f32> {
        self.channels.iter().map(|c| c.center_freq()).collect()
    }

    pub fn reset(&mut self) {
        for c in &mut self.channels {
            c.reset();
        }
    }

    /// Run every channel over the same input chunk, returning one filtered
    /// buffer per channel, in channel order.
    pub fn process_input(&mut self, input: &[f32]) -> Vec<Vec<f32>> {
        self.channels.iter_mut().map(|c| c.process(input)).collect()
    }

    /// The literal `bufferLength = pSMLength * 2 * corrWinSize + 1` formula:
    /// the length every chunk before the first (or a terminating single
    /// chunk) must hold so that `pSMLength` correntropy windows, each with
    /// `2 * corrWinSize` samples of lookahead, fit inside one buffer.
    pub fn first_chunk_length(&self) -> usize {
        self.psm_len * 2 * self.corr_win_size + 1
    }

    /// The trailing region a terminating chunk can reuse from the previous
    /// central buffer instead of re-filtering (see
    /// [`Self::propagate_final_overlap`]). `corrBufferLength - sigBufferLength`
    /// in the original isn't recoverable without `sigOpt.c`/`tripleBuffer.c`;
    /// `2 * corrWinSize` — one correntropy window's maximum lag — is the
    /// documented substitute.
    pub fn overlap(&self) -> usize {
        2 * self.corr_win_size
    }

    /// Every chunk after the first must be this long, down to
    /// `first_chunk_length() - overlap()` worth of genuinely new samples.
    pub fn normal_chunk_length(&self) -> usize {
        self.first_chunk_length().saturating_sub(self.overlap())
    }

    /// At the final chunk, when there's more input than `normal_chunk_length`
    /// can hold in one more filtering pass, the tail of the previous central
    /// buffer already covers the overlap region the next window needs —
    /// reuse it as the new leading buffer instead of re-filtering.
    pub fn propagate_final_overlap(&self, channel: usize, triple: &mut TripleBuffer) {
        let overlap = self.overlap();
        let prev_central = triple.get_buffer(channel, 0);
        let start = prev_central.len().saturating_sub(overlap);
        let tail = prev_central[start..].to_vec();
        triple.add_leading_buffer(channel, tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_channel_uses_exact_frequency() {
        let bank = FilterBank::new(1, 220.0, 220.0, 11025, 4, 8);
        assert_eq!(bank.center_freqs(), vec![220.0]);
    }

    #[test]
    fn channels_are_strictly_increasing() {
        let bank = FilterBank::new(8, 80.0, 4000.0, 11025, 4, 8);
        let freqs = bank.center_freqs();
        assert_eq!(freqs.len(), 8);
        for w in freqs.windows(2) {
            assert!(w[1] > w[0]);
        }
        assert!((freqs[0] - 80.0).abs() < 1.0);
        assert!((freqs[7] - 4000.0).abs() < 5.0);
    }

    #[test]
    fn process_input_returns_one_buffer_per_channel() {
        let mut bank = FilterBank::new(3, 100.0, 1000.0, 11025, 4, 8);
        let out = bank.process_input(&[0.0f32; 32]);
        assert_eq!(out.len(), 3);
        for buf in out {
            assert_eq!(buf.len(), 32);
        }
    }

    #[test]
    fn first_chunk_length_matches_literal_formula() {
        let bank = FilterBank::new(1, 220.0, 220.0, 11025, 5, 10);
        assert_eq!(bank.first_chunk_length(), 5 * 2 * 10 + 1);
    }

    #[test]
    fn normal_chunk_length_is_first_minus_overlap() {
        let bank = FilterBank::new(1, 220.0, 220.0, 11025, 5, 10);
        assert_eq!(bank.overlap(), 20);
        assert_eq!(
            bank.normal_chunk_length(),
            bank.first_chunk_length() - bank.overlap()
        );
    }

    #[test]
    fn propagate_final_overlap_copies_previous_tail() {
        let bank = FilterBank::new(1, 220.0, 220.0, 11025, 2, 3);
        let mut triple = TripleBuffer::new(1);
        triple.add_leading_buffer(0, (0..10).map(|i| i as f32).collect());
        bank.propagate_final_overlap(0, &mut triple);
        assert_eq!(triple.num_buffers(0), 2);
        // overlap() == 6, so the tail of a 10-sample buffer is [4..10).
        assert_eq!(triple.get_buffer(0, 1), &[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }
}
