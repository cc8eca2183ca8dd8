//! Integration tests for cynthia-core DSP primitives.
//!
//! Tests cross-module behaviour with signal-level measurements: oscillator
//! pitch by zero-crossing count, detune beating, LFO modulation shape, SVF
//! frequency response, and envelope timing at different sample rates.

use cynthia_core::{
    Envelope, EnvelopeCoefficients, Filter, FilterMode, MorphingLfo, MorphingOscillator,
    SvfFilter, Waveform, WavetableBank, midi_to_freq,
};

const SAMPLE_RATE: f32 = 48000.0;
const TAU: f32 = core::f32::consts::TAU;

/// Generate a sine wave buffer at the given frequency and sample rate.
fn generate_sine(freq_hz: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| libm::sinf(TAU * freq_hz * n as f32 / sample_rate))
        .collect()
}

/// Measure RMS amplitude of a signal buffer.
fn rms(signal: &[f32]) -> f32 {
    let sum_sq: f32 = signal.iter().map(|&s| s * s).sum();
    libm::sqrtf(sum_sq / signal.len() as f32)
}

/// Convert linear amplitude to dB.
fn to_db(linear: f32) -> f32 {
    20.0 * libm::log10f(linear.max(1e-10))
}

/// Count rising zero crossings.
fn rising_crossings(signal: &[f32]) -> usize {
    signal
        .windows(2)
        .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
        .count()
}

// ============================================================================
// 1. Oscillator pitch
// ============================================================================

#[test]
fn oscillator_sine_pitch_matches_midi_note() {
    let freq = midi_to_freq(69);
    let mut osc = MorphingOscillator::new(WavetableBank::shared());
    osc.prepare(freq, SAMPLE_RATE);
    osc.set_waveforms(Waveform::Sine, Waveform::Sine);

    // One second of output has `freq` cycles.
    let out: Vec<f32> = (0..SAMPLE_RATE as usize).map(|_| osc.next_sample()).collect();
    let cycles = rising_crossings(&out) as f32;
    assert!((cycles - 440.0).abs() <= 1.0, "counted {} cycles", cycles);
}

#[test]
fn oscillator_every_waveform_has_same_period() {
    let bank = WavetableBank::shared();
    for waveform in [Waveform::Sawtooth, Waveform::Triangle, Waveform::Square] {
        let mut osc = MorphingOscillator::new(bank.clone());
        osc.prepare(100.0, SAMPLE_RATE);
        osc.set_waveforms(waveform, waveform);
        let out: Vec<f32> = (0..SAMPLE_RATE as usize).map(|_| osc.next_sample()).collect();
        let mean = out.iter().sum::<f32>() / out.len() as f32;
        let centred: Vec<f32> = out.iter().map(|s| s - mean).collect();
        let cycles = rising_crossings(&centred) as f32;
        assert!(
            (cycles - 100.0).abs() <= 1.0,
            "{:?}: counted {} cycles",
            waveform,
            cycles
        );
    }
}

#[test]
fn oscillator_detune_produces_beating() {
    // Two sine sources 20 cents apart at 440 Hz beat at f_b - f_a Hz.
    let mut osc = MorphingOscillator::new(WavetableBank::shared());
    osc.prepare(440.0, SAMPLE_RATE);
    osc.set_waveforms(Waveform::Sine, Waveform::Sine);
    osc.set_morph(0.5);
    osc.set_detune_cents(20.0);

    let window = 480; // 10 ms
    let out: Vec<f32> = (0..SAMPLE_RATE as usize).map(|_| osc.next_sample()).collect();
    let envelope: Vec<f32> = out.chunks(window).map(rms).collect();
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(0.0f32, f32::max);
    assert!(max > 0.6, "constructive peak too low: {}", max);
    assert!(min < 0.2, "destructive trough too high: {}", min);
}

#[test]
fn oscillator_morph_blends_linearly() {
    let bank = WavetableBank::shared();
    let mut a = MorphingOscillator::new(bank.clone());
    let mut b = MorphingOscillator::new(bank.clone());
    let mut mix = MorphingOscillator::new(bank);
    for osc in [&mut a, &mut b, &mut mix] {
        osc.prepare(330.0, SAMPLE_RATE);
    }
    a.set_waveforms(Waveform::Sawtooth, Waveform::Sawtooth);
    b.set_waveforms(Waveform::Triangle, Waveform::Triangle);
    mix.set_waveforms(Waveform::Sawtooth, Waveform::Triangle);
    mix.set_morph(0.25);

    for _ in 0..2000 {
        let expected = 0.75 * a.next_sample() + 0.25 * b.next_sample();
        assert!((mix.next_sample() - expected).abs() < 1e-5);
    }
}

// ============================================================================
// 2. LFO
// ============================================================================

#[test]
fn lfo_completes_rate_cycles_per_second() {
    let mut lfo = MorphingLfo::new(WavetableBank::shared());
    lfo.prepare(4.0, SAMPLE_RATE);
    lfo.set_depth(1.0);
    let out: Vec<f32> = (0..SAMPLE_RATE as usize).map(|_| lfo.next_sample()).collect();
    let cycles = rising_crossings(&out);
    assert!((3..=5).contains(&cycles), "counted {} cycles", cycles);
}

// ============================================================================
// 3. Filter frequency response
// ============================================================================

fn measure_svf_response(svf: &mut SvfFilter, freq_hz: f32) -> f32 {
    let num_samples = 4800;
    let settle_samples = 2400;
    let input = generate_sine(freq_hz, SAMPLE_RATE, num_samples);
    svf.reset();
    let output: Vec<f32> = input.iter().map(|&s| svf.process_sample(s)).collect();
    to_db(rms(&output[settle_samples..]) / rms(&input[settle_samples..]))
}

#[test]
fn svf_lowpass_frequency_response() {
    let mut svf = SvfFilter::new(SAMPLE_RATE);
    svf.set_cutoff(1000.0);
    svf.set_resonance(0.707);
    svf.set_mode(FilterMode::LowPass);

    let pass = measure_svf_response(&mut svf, 100.0);
    let at_cutoff = measure_svf_response(&mut svf, 1000.0);
    let stop = measure_svf_response(&mut svf, 10_000.0);

    assert!(pass.abs() < 1.0, "passband gain {} dB", pass);
    assert!((at_cutoff + 3.0).abs() < 1.5, "cutoff gain {} dB", at_cutoff);
    assert!(stop < -35.0, "stopband gain {} dB", stop);
}

#[test]
fn svf_highpass_frequency_response() {
    let mut svf = SvfFilter::new(SAMPLE_RATE);
    svf.set_cutoff(1000.0);
    svf.set_resonance(0.707);
    svf.set_mode(FilterMode::HighPass);

    let stop = measure_svf_response(&mut svf, 100.0);
    let pass = measure_svf_response(&mut svf, 10_000.0);
    assert!(stop < -35.0, "stopband gain {} dB", stop);
    assert!(pass.abs() < 1.0, "passband gain {} dB", pass);
}

#[test]
fn svf_bandpass_peaks_at_cutoff() {
    let mut svf = SvfFilter::new(SAMPLE_RATE);
    svf.set_cutoff(2000.0);
    svf.set_resonance(1.0);
    svf.set_mode(FilterMode::BandPass);

    let low = measure_svf_response(&mut svf, 200.0);
    let centre = measure_svf_response(&mut svf, 2000.0);
    let high = measure_svf_response(&mut svf, 20_000.0);
    assert!(centre > low + 10.0, "centre {} dB vs low {} dB", centre, low);
    assert!(centre > high + 10.0, "centre {} dB vs high {} dB", centre, high);
    assert!(centre.abs() < 1.0, "unity peak expected, got {} dB", centre);
}

// ============================================================================
// 4. Envelope timing
// ============================================================================

fn samples_until_decay(sample_rate: f32) -> usize {
    let mut env = Envelope::new();
    env.set_coefficients(EnvelopeCoefficients::from_times(
        0.01,
        0.1,
        0.5,
        0.2,
        sample_rate,
    ));
    env.attack();
    let mut n = 0;
    while env.is_in_attack() {
        env.next_value();
        n += 1;
    }
    n
}

#[test]
fn envelope_attack_time_scales_with_sample_rate() {
    let at_48k = samples_until_decay(48000.0) as f32;
    let at_96k = samples_until_decay(96000.0) as f32;
    let ratio = at_96k / at_48k;
    assert!((ratio - 2.0).abs() < 0.05, "ratio {}", ratio);

    // ln(2) time constants to cross unity from zero.
    let expected = core::f32::consts::LN_2 * 0.01 * 48000.0;
    assert!((at_48k - expected).abs() < 3.0, "{} samples, expected ~{}", at_48k, expected);
}

#[test]
fn voice_chain_is_silent_after_release() {
    let sr = SAMPLE_RATE;
    let mut osc = MorphingOscillator::new(WavetableBank::shared());
    osc.prepare(220.0, sr);
    let mut filter = SvfFilter::new(sr);
    filter.set_cutoff(3000.0);
    let mut env = Envelope::new();
    env.set_coefficients(EnvelopeCoefficients::from_times(0.005, 0.05, 0.6, 0.05, sr));

    env.attack();
    for _ in 0..4800 {
        let _ = filter.process_sample(osc.next_sample()) * env.next_value();
    }
    env.release();
    let mut tail = 0;
    while env.is_active() {
        let _ = filter.process_sample(osc.next_sample()) * env.next_value();
        tail += 1;
    }
    // ln(0.6 / 1e-4) ~ 8.7 time constants of 2400 samples.
    assert!((15_000..30_000).contains(&tail), "release tail {} samples", tail);
}
