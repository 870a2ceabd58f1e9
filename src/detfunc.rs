//! The detection function state machine: turns a stream of raw audio
//! chunks into a running first-difference-of-correntropy detection
//! function, one sample per hop.
//!
//! Grounded throughout on `examples/original_source/src/detFuncCore.c`:
//! the state transitions (`detFuncCorePrepareNextChunk`), the per-state
//! processing rules (`detFuncCoreProcessFirstChunk`/`ProcessNormalChunk`/
//! `ProcessLastChunk`/`ProcessSingleChunk`), the PSM-to-detection-function
//! bridge and first-difference update (`updateDetFunc`), and the two resize
//! policies (`detFuncCoreResizeDetFuncNormal`/`detFuncCoreResizeDetFuncTerminal`).
//! One simplification relative to the original, recorded in `DESIGN.md`:
//! [`crate::sigopt::SigOpt`] computes its rolling variance directly from the
//! window each call rather than maintaining incremental running sums, so
//! `setup` only has to clear the termination index rather than prime a
//! running-sum state.

use log::{debug, trace, warn};

use crate::config::Config;
use crate::correntropy::{psm_entry_contrib, Psm};
use crate::error::{CoreError, Result};
use crate::filterbank::FilterBank;
use crate::sigopt::SigOpt;
use crate::triple_buffer::TripleBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoChunk,
    FirstChunk,
    NormalChunk,
    LastChunk,
    SingleChunk,
}

impl State {
    fn is_terminal(self) -> bool {
        matches!(self, State::LastChunk | State::SingleChunk)
    }
}

/// Which buffer a processing round treats as "central": the occupancy-based
/// default ((n-1)/2), or the leading-most buffer — the override the final
/// section of a terminating stream needs (see `TripleBuffer::default_central_index`'s
/// own doc comment).
#[derive(Clone, Copy)]
enum CentralSelect {
    Default,
    Leading,
}

/// The streaming detection-function engine.
pub struct DetFuncCore {
    state: State,
    filter_bank: FilterBank,
    triple_buffer: TripleBuffer,
    sigopt: SigOpt,
    psm: Psm,
    det_func: Vec<f32>,

    num_channels: usize,
    hopsize: usize,
    corr_win_size: usize,
    psm_len: usize,

    stream_length: usize,
    termination_index: Option<usize>,
    last_psm_entry: Option<f32>,
}

const GROWTH_EXTRA_CHUNKS: usize = 1;

impl DetFuncCore {
    pub fn new(cfg: &Config) -> Result<Self> {
        if cfg.dedicated_threads != 0 {
            return Err(CoreError::Unsupported(
                "dedicated_threads > 0 is not yet implemented".into(),
            ));
        }
        let psm_len = (cfg.sig_win_size / cfg.hopsize).max(1);
        let filter_bank = FilterBank::new(
            cfg.num_channels,
            cfg.min_freq,
            cfg.max_freq,
            cfg.samplerate,
            psm_len,
            cfg.corr_win_size,
        );

        Ok(Self {
            state: State::NoChunk,
            filter_bank,
            triple_buffer: TripleBuffer::new(cfg.num_channels),
            sigopt: SigOpt::new(cfg.sig_win_size, cfg.scale_factor),
            psm: Psm::new(psm_len),
            det_func: Vec::new(),
            num_channels: cfg.num_channels,
            hopsize: cfg.hopsize,
            corr_win_size: cfg.corr_win_size,
            psm_len,
            stream_length: 0,
            termination_index: None,
            last_psm_entry: None,
        })
    }

    pub fn first_chunk_length(&self) -> usize {
        self.filter_bank.first_chunk_length()
    }

    pub fn normal_chunk_length(&self) -> usize {
        self.filter_bank.normal_chunk_length()
    }

    pub fn detection_function(&self) -> &[f32] {
        &self.det_func
    }

    pub fn take_detection_function(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.det_func)
    }

    /// Feed the next chunk of raw audio (one sample stream, not yet split
    /// into channels) into the engine.
    pub fn set_input_chunk(&mut self, input: &[f32], final_chunk: bool) -> Result<()> {
        if self.state.is_terminal() {
            warn!("set_input_chunk called after the stream already terminated");
            return Err(CoreError::StreamAlreadyTerminated);
        }

        let first_len = self.first_chunk_length();
        let normal_len = self.normal_chunk_length();

        match self.state {
            State::NoChunk => {
                if final_chunk {
                    if input.len() > first_len {
                        return Err(CoreError::WrongChunkLength {
                            expected: first_len,
                            actual: input.len(),
                        });
                    }
                    if input.len() < 2 * self.corr_win_size {
                        return Err(CoreError::StreamTooShort {
                            minimum: 2 * self.corr_win_size,
                            actual: input.len(),
                        });
                    }
                    self.termination_index = Some(input.len());
                    self.state = State::SingleChunk;
                } else {
                    if input.len() != first_len {
                        return Err(CoreError::WrongChunkLength {
                            expected: first_len,
                            actual: input.len(),
                        });
                    }
                    self.state = State::FirstChunk;
                }
            }
            State::FirstChunk | State::NormalChunk => {
                if final_chunk {
                    if input.len() > normal_len {
                        return Err(CoreError::WrongChunkLength {
                            expected: normal_len,
                            actual: input.len(),
                        });
                    }
                    self.termination_index = Some(input.len());
                    self.state = State::LastChunk;
                } else {
                    if input.len() != normal_len {
                        return Err(CoreError::WrongChunkLength {
                            expected: normal_len,
                            actual: input.len(),
                        });
                    }
                    self.state = State::NormalChunk;
                }
            }
            State::LastChunk | State::SingleChunk => unreachable!("checked above"),
        }
        trace!(
            "accepted input chunk: state={:?} len={} final_chunk={}",
            self.state,
            input.len(),
            final_chunk
        );

        self.stream_length += input.len();
        match self.state {
            State::FirstChunk => self.process_first_chunk(input),
            State::NormalChunk => self.process_normal_chunk(input),
            State::LastChunk => self.process_last_chunk(input),
            State::SingleChunk => self.process_single_chunk(input),
            State::NoChunk => unreachable!("just transitioned out of NoChunk"),
        }
        Ok(())
    }

    /// FIRST_CHUNK: filter into buffer 0 for every channel and prime SigOpt.
    /// No PSM windows, no DetFunc update.
    fn process_first_chunk(&mut self, input: &[f32]) {
        self.sigopt.setup();
        let filtered = self.filter_bank.process_input(input);
        for (channel, buf) in filtered.into_iter().enumerate() {
            self.triple_buffer.add_leading_buffer(channel, buf);
        }
    }

    /// NORMAL_CHUNK: filter into the leading buffer, compute `pSMLength`
    /// PSM windows centered in the buffer that just became central, update
    /// DetFunc, and advance SigOpt's buffer window.
    fn process_normal_chunk(&mut self, input: &[f32]) {
        self.filter_and_add_leading(input);
        self.run_round(self.psm_len, CentralSelect::Default, None);
        self.sigopt.advance_buffer();
    }

    /// LAST_CHUNK. If the final chunk is at least `normal_chunk_length`,
    /// it behaves as a NORMAL_CHUNK round first, then the triple buffer is
    /// cycled, the final overlap is propagated (no re-filtering), SigOpt
    /// advances, and only then are the penultimate and final sections
    /// processed. A shorter final chunk skips straight to the penultimate
    /// (filtered) and final sections.
    fn process_last_chunk(&mut self, input: &[f32]) {
        let normal_len = self.normal_chunk_length();

        if input.len() >= normal_len {
            self.filter_and_add_leading(input);
            self.run_round(self.psm_len, CentralSelect::Default, None);

            for channel in 0..self.num_channels {
                if self.triple_buffer.num_buffers(channel) == 3 {
                    self.triple_buffer.cycle(channel);
                }
                self.filter_bank
                    .propagate_final_overlap(channel, &mut self.triple_buffer);
            }
            self.sigopt.advance_buffer();

            // penultimate section: the buffer just filtered above, now central
            self.run_round(self.psm_len, CentralSelect::Default, None);

            // final section: the propagated overlap buffer, wholly valid
            let overlap_len = self.filter_bank.overlap();
            for channel in 0..self.num_channels {
                self.triple_buffer.remove_trailing_buffer(channel);
            }
            let final_windows = self.remaining_psm_windows();
            self.run_round(final_windows, CentralSelect::Leading, Some(overlap_len));
        } else {
            // penultimate section, with filtering
            self.filter_and_add_leading(input);
            self.run_round(self.psm_len, CentralSelect::Default, None);

            // final section: the chunk just filtered above is the true tail
            for channel in 0..self.num_channels {
                self.triple_buffer.remove_trailing_buffer(channel);
            }
            let final_windows = self.remaining_psm_windows();
            self.run_round(final_windows, CentralSelect::Leading, Some(input.len()));
        }
    }

    /// SINGLE_CHUNK: the only chunk the stream ever sees. Symmetric to
    /// LAST_CHUNK but with a single buffer, using the same priming path
    /// FIRST_CHUNK uses for SigOpt.
    fn process_single_chunk(&mut self, input: &[f32]) {
        self.sigopt.setup();
        let filtered = self.filter_bank.process_input(input);
        for (channel, buf) in filtered.into_iter().enumerate() {
            self.triple_buffer.add_leading_buffer(channel, buf);
        }
        let windows = self.remaining_psm_windows();
        self.run_round(windows, CentralSelect::Leading, Some(input.len()));
    }

    /// Filter `input` into a fresh leading buffer for every channel, cycling
    /// out the trailing buffer first if the window is already full.
    fn filter_and_add_leading(&mut self, input: &[f32]) {
        let filtered = self.filter_bank.process_input(input);
        for (channel, buf) in filtered.into_iter().enumerate() {
            if self.triple_buffer.num_buffers(channel) == 3 {
                self.triple_buffer.cycle(channel);
                debug!("triple buffer cycled on channel {channel}");
            }
            self.triple_buffer.add_leading_buffer(channel, buf);
        }
    }

    /// Compute `num_windows` correntropy/PSM entries for every channel
    /// against the buffer `central_select` picks, fold them into DetFunc,
    /// and reset the PSM. `local_termination`, when set, marks the valid
    /// sample count within whichever buffer is acting as the terminal one
    /// this round (leading normally, central for the final section).
    fn run_round(
        &mut self,
        num_windows: usize,
        central_select: CentralSelect,
        local_termination: Option<usize>,
    ) {
        if let Some(t) = local_termination {
            self.sigopt.set_termination_index(t);
            self.triple_buffer.set_terminal_index(t);
        }

        self.psm.reset(num_windows);
        for channel in 0..self.num_channels {
            let n = self.triple_buffer.num_buffers(channel);
            let central_index = match central_select {
                CentralSelect::Default => self.triple_buffer.default_central_index(channel),
                CentralSelect::Leading => n.saturating_sub(1),
            };
            let trailing = (central_index > 0)
                .then(|| self.triple_buffer.get_buffer(channel, central_index - 1));
            let leading = (central_index + 1 < n)
                .then(|| self.triple_buffer.get_buffer(channel, central_index + 1));
            let central = self.triple_buffer.get_buffer(channel, central_index);

            for i in 0..num_windows {
                let start = i * self.hopsize;
                let sigma = self.sigopt.advance_window(trailing, central, leading, start);
                let needed = start + 2 * self.corr_win_size;
                let contrib = if central.len() >= needed {
                    psm_entry_contrib(&central[start..], self.corr_win_size, sigma)
                } else {
                    0.0
                };
                self.psm.add(i, contrib);
            }
        }

        self.update_det_func(num_windows);
    }

    /// Total number of PSM windows across the whole stream, valid only
    /// once the termination index (and therefore `stream_length`) is final.
    fn total_num_psm_entries(&self) -> usize {
        let numerator = self.stream_length.saturating_sub(self.corr_win_size) as f64;
        (numerator / self.hopsize as f64).ceil() as usize + 1
    }

    fn remaining_psm_windows(&self) -> usize {
        let total = self.total_num_psm_entries();
        let rem = total % self.psm_len;
        if rem == 0 {
            self.psm_len
        } else {
            rem
        }
    }

    fn update_det_func(&mut self, psm_len_this_round: usize) {
        let terminating = self.termination_index.is_some();
        if terminating {
            let target = self.total_num_psm_entries().saturating_sub(1);
            self.det_func.reserve(target.saturating_sub(self.det_func.len()));
        } else if self.det_func.capacity() - self.det_func.len() < self.psm_len {
            self.det_func.reserve((GROWTH_EXTRA_CHUNKS + 1) * self.psm_len);
            debug!(
                "grew detection function buffer to capacity {}",
                self.det_func.capacity()
            );
        }

        let mut extra_len = psm_len_this_round;
        if self.last_psm_entry.is_none() {
            extra_len = extra_len.saturating_sub(1);
        }
        if terminating {
            let remaining_target = self
                .total_num_psm_entries()
                .saturating_sub(1)
                .saturating_sub(self.det_func.len());
            extra_len = extra_len.min(remaining_target);
        }

        let psm = self.psm.as_slice();
        let mut n_iter = extra_len;
        if let Some(last) = self.last_psm_entry {
            if n_iter > 0 && !psm.is_empty() {
                self.det_func.push(psm[0] - last);
                n_iter -= 1;
            }
        }
        for i in 0..n_iter {
            self.det_func.push(psm[i + 1] - psm[i]);
        }

        if let Some(&last) = psm.last() {
            self.last_psm_entry = Some(last);
        }
    }
}
