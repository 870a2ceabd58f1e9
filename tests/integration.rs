//! End-to-end scenarios over the public `Core` facade.

use correntropy_onset::{Config, CoreError, CorrStrategy, FilterStrategy};
use correntropy_onset::transient::{detect_transients, MAX_KERNEL, MIN_KERNEL};
use correntropy_onset::Core;

fn one_channel_config() -> Config {
    Config {
        corr_win_size: 138,
        hopsize: 55,
        num_channels: 1,
        sig_win_size: 7 * 11025,
        scale_factor: correntropy_onset::math::SILVERMAN_SCALE,
        samplerate: 11025,
        min_freq: 220.0,
        max_freq: 220.0,
        filter_strategy: FilterStrategy::Gammatone,
        corr_strategy: CorrStrategy::Gaussian,
        dedicated_threads: 0,
    }
}

// S1 (adapted): an impulse through a single-channel core produces a
// non-empty, all-finite detection function whose length matches the
// `ceil((streamLength - corrWinSize) / hopsize)` invariant.
#[test]
fn impulse_single_channel_produces_detection_function() {
    let mut core = Core::new(one_channel_config()).unwrap();
    let len = core.first_chunk_length();
    let mut signal = vec![0.0f32; len];
    signal[0] = 1.0;
    core.set_input_chunk(&signal, true).unwrap();
    let det_func = core.get_detection_function().unwrap();

    let expected_len = ((len - 138) as f64 / 55.0).ceil() as usize;
    assert_eq!(det_func.len(), expected_len);
    assert!(det_func.iter().all(|v| v.is_finite()));
}

// S2 — silence in, silence out.
#[test]
fn silence_yields_all_zero_detection_function() {
    let mut core = Core::new(one_channel_config()).unwrap();
    let len = core.first_chunk_length();
    let signal = vec![0.0f32; len];
    core.set_input_chunk(&signal, true).unwrap();
    let det_func = core.get_detection_function().unwrap();
    assert!(det_func.iter().all(|&v| v == 0.0));
}

// Invariant 1, exercised across a multi-chunk stream rather than a single
// chunk: total detection function length still matches
// `ceil((streamLength - corrWinSize) / hopsize)`, whatever the chunking.
#[test]
fn detection_function_length_matches_stream_length_formula_across_chunks() {
    let mut core = Core::new(one_channel_config()).unwrap();
    let first_len = core.first_chunk_length();
    let normal_len = core.normal_chunk_length();

    let chunk1 = vec![0.1f32; first_len];
    let chunk2 = vec![0.2f32; normal_len];
    let chunk3 = vec![0.05f32; normal_len / 2];

    core.set_input_chunk(&chunk1, false).unwrap();
    core.set_input_chunk(&chunk2, false).unwrap();
    core.set_input_chunk(&chunk3, true).unwrap();

    let det_func = core.get_detection_function().unwrap();
    let stream_length = first_len + normal_len + normal_len / 2;
    let expected_len = ((stream_length - 138) as f64 / 55.0).ceil() as usize;
    assert_eq!(det_func.len(), expected_len);
}

// Invariant 10/11 — the SINGLE_CHUNK boundary around `2 * corr_win_size`.
#[test]
fn single_chunk_at_minimum_length_succeeds() {
    let mut core = Core::new(one_channel_config()).unwrap();
    let minimum = 2 * 138;
    let signal = vec![0.0f32; minimum];
    core.set_input_chunk(&signal, true).unwrap();
    let det_func = core.get_detection_function().unwrap();
    assert!(det_func.len() >= 1);
}

#[test]
fn single_chunk_shorter_than_minimum_fails() {
    let mut core = Core::new(one_channel_config()).unwrap();
    let signal = vec![0.0f32; 2 * 138 - 1];
    let result = core.set_input_chunk(&signal, true);
    assert!(matches!(result, Err(CoreError::StreamTooShort { .. })));
}

// Invariant 12 — a wrong-length normal chunk poisons the core.
#[test]
fn wrong_length_normal_chunk_poisons_core() {
    let mut core = Core::new(one_channel_config()).unwrap();
    let first_len = core.first_chunk_length();
    core.set_input_chunk(&vec![0.0f32; first_len], false).unwrap();
    let bad = core.set_input_chunk(&vec![0.0f32; first_len - 1], false);
    assert!(matches!(bad, Err(CoreError::WrongChunkLength { .. })));
    // subsequent calls return the same poisoned error
    assert!(matches!(
        core.set_input_chunk(&vec![0.0f32; first_len], true),
        Err(CoreError::WrongChunkLength { .. })
    ));
}

// S3 (adapted) — a sine burst in the middle of silence produces exactly two
// transients, an onset then an offset, in increasing order.
#[test]
fn sine_burst_yields_onset_and_offset_pair() {
    let cfg = Config {
        corr_win_size: 32,
        hopsize: 16,
        num_channels: 4,
        sig_win_size: 256,
        scale_factor: correntropy_onset::math::SILVERMAN_SCALE,
        samplerate: 8000,
        min_freq: 200.0,
        max_freq: 2000.0,
        filter_strategy: FilterStrategy::Gammatone,
        corr_strategy: CorrStrategy::Gaussian,
        dedicated_threads: 0,
    };
    let mut core = Core::new(cfg).unwrap();
    let len = core.first_chunk_length();

    let quiet = len / 3;
    let mut signal = vec![0.0f32; len];
    for (i, v) in signal.iter_mut().enumerate().skip(quiet).take(quiet) {
        *v = (2.0 * std::f32::consts::PI * 440.0 * (i as f32) / 8000.0).sin();
    }
    core.set_input_chunk(&signal, true).unwrap();
    let det_func = core.get_detection_function().unwrap();

    let transients = detect_transients(&det_func, MIN_KERNEL.min(4), MAX_KERNEL);
    assert_eq!(transients.len() % 2, 0);
    for w in transients.windows(2) {
        assert!(w[1] > w[0]);
    }
}

// S6 — transient kernel unit test on a synthetic detection function.
#[test]
fn synthetic_step_detection_function_yields_expected_transients() {
    let det_func: Vec<f32> = vec![
        -1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0,
    ];
    let transients = detect_transients(&det_func, 4, 5);
    assert_eq!(transients, vec![4, 8]);
}
