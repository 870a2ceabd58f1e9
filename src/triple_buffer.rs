//! Owning replacement for the sliding three-buffer window the detection
//! core keeps per channel (trailing / central / leading).
//!
//! The state machine holds at most three buffers per channel at once and
//! slides the window forward one hop at a time: a new buffer is appended as
//! the leading buffer, and once three are present the oldest (trailing)
//! buffer is dropped before the next one arrives. Correntropy windows that
//! straddle a buffer boundary read from whichever of the three buffers are
//! present; [`TripleBuffer::num_buffers`] tells the caller which case that
//! is, mirroring the `tripleBufferNumBuffers(dFC->tB) == 1/2/3` branches the
//! original state machine dispatched on. Unlike that version (three raw
//! pointers per channel, swapped by hand), buffers here are owned
//! `Vec<f32>`s in a `VecDeque`, so there is nothing to free and no pointer
//! ever outlives its buffer.

use std::collections::VecDeque;

/// Per-channel sliding window of up to three buffers.
pub struct TripleBuffer {
    channels: Vec<VecDeque<Vec<f32>>>,
    terminal_index: Option<usize>,
}

impl TripleBuffer {
    pub fn new(num_channels: usize) -> Self {
        Self {
            channels: (0..num_channels).map(|_| VecDeque::with_capacity(3)).collect(),
            terminal_index: None,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of buffers currently held for `channel` (0, 1, 2, or 3).
    pub fn num_buffers(&self, channel: usize) -> usize {
        self.channels[channel].len()
    }

    /// Append a new leading buffer. The caller must have already called
    /// [`Self::cycle`] if three buffers were already present.
    pub fn add_leading_buffer(&mut self, channel: usize, data: Vec<f32>) {
        debug_assert!(self.channels[channel].len() < 3);
        self.channels[channel].push_back(data);
    }

    /// Drop the trailing buffer, sliding the window forward by one.
    pub fn cycle(&mut self, channel: usize) {
        self.channels[channel].pop_front();
    }

    /// Unconditionally drop the trailing buffer (used while draining the
    /// window down during the final section of a stream).
    pub fn remove_trailing_buffer(&mut self, channel: usize) {
        self.channels[channel].pop_front();
    }

    /// Borrow buffer `index` (0 = trailing, up to `num_buffers - 1` = leading)
    /// for `channel`.
    pub fn get_buffer(&self, channel: usize, index: usize) -> &[f32] {
        &self.channels[channel][index]
    }

    /// The default central-buffer index for the current window occupancy:
    /// buffer 0 when one or two buffers are present, buffer 1 once all
    /// three are. The caller is responsible for overriding this for the
    /// final section of a stream, where the rule differs (see
    /// `SPEC_FULL.md`'s notes on `DetFuncCore`).
    pub fn default_central_index(&self, channel: usize) -> usize {
        (self.channels[channel].len().saturating_sub(1)) / 2
    }

    /// Record the sample index (within the leading buffer) at which the
    /// stream actually ends, for a final buffer shorter than a normal hop.
    pub fn set_terminal_index(&mut self, index: usize) {
        self.terminal_index = Some(index);
    }

    pub fn terminal_index(&self) -> Option<usize> {
        self.terminal_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_grows_then_holds_at_three() {
        let mut tb = TripleBuffer::new(1);
        tb.add_leading_buffer(0, vec![1.0; 4]);
        assert_eq!(tb.num_buffers(0), 1);
        tb.add_leading_buffer(0, vec![2.0; 4]);
        assert_eq!(tb.num_buffers(0), 2);
        tb.add_leading_buffer(0, vec![3.0; 4]);
        assert_eq!(tb.num_buffers(0), 3);

        tb.cycle(0);
        tb.add_leading_buffer(0, vec![4.0; 4]);
        assert_eq!(tb.num_buffers(0), 3);
        assert_eq!(tb.get_buffer(0, 0)[0], 2.0);
        assert_eq!(tb.get_buffer(0, 2)[0], 4.0);
    }

    #[test]
    fn default_central_index_matches_occupancy_rule() {
        let mut tb = TripleBuffer::new(1);
        tb.add_leading_buffer(0, vec![0.0]);
        assert_eq!(tb.default_central_index(0), 0);
        tb.add_leading_buffer(0, vec![0.0]);
        assert_eq!(tb.default_central_index(0), 0);
        tb.add_leading_buffer(0, vec![0.0]);
        assert_eq!(tb.default_central_index(0), 1);
    }

    #[test]
    fn channels_are_independent() {
        let mut tb = TripleBuffer::new(2);
        tb.add_leading_buffer(0, vec![1.0]);
        assert_eq!(tb.num_buffers(0), 1);
        assert_eq!(tb.num_buffers(1), 0);
    }
}
