//! Morphing dual-wavetable oscillator.
//!
//! Two independent phase accumulators (source A and source B) read two tables
//! from the shared [`WavetableBank`]. The outputs are cross-faded by a morph
//! value, and the two sources can be detuned symmetrically around the base
//! pitch for a chorus-like beating.
//!
//! # Detune
//!
//! A detune of `c` cents splits evenly across the two sources:
//!
//! ```text
//! ratio_a = 2^(-c/2/1200)   (source A below the base pitch)
//! ratio_b = 2^(+c/2/1200)   (source B above the base pitch)
//! ```
//!
//! so the interval between the two sources is exactly `c` cents.

use alloc::sync::Arc;

use crate::math::lerp;
use crate::wavetable::{TABLE_SIZE, Waveform, WavetableBank};

/// Maximum detune spread in cents (either direction).
pub const MAX_DETUNE_CENTS: f32 = 100.0;

/// Frequency ratios `(source_a, source_b)` for a detune spread in cents.
///
/// Unclamped; [`MorphingOscillator::set_detune_cents`] clamps before calling.
///
/// # Example
///
/// ```rust
/// use cynthia_core::detune_ratios;
///
/// let (a, b) = detune_ratios(1200.0);
/// assert!((b / a - 2.0).abs() < 1e-6);
/// ```
#[inline]
pub fn detune_ratios(cents: f32) -> (f32, f32) {
    let half = cents * 0.5;
    (
        libm::powf(2.0, -half / 1200.0),
        libm::powf(2.0, half / 1200.0),
    )
}

#[inline]
fn wrap_phase(phase: f64) -> f64 {
    const LEN: f64 = TABLE_SIZE as f64;
    if phase >= LEN {
        let wrapped = phase - LEN;
        if wrapped >= LEN { wrapped % LEN } else { wrapped }
    } else {
        phase
    }
}

/// Wavetable oscillator that cross-fades between two detunable sources.
///
/// ## Parameters
/// - `frequency`: Base pitch in Hz, set by [`prepare`](Self::prepare)
/// - `waveform_a` / `waveform_b`: Tables read by each source (default sine / sawtooth)
/// - `morph`: Cross-fade, 0 = source A only, 1 = source B only (0.0 to 1.0, default 0.0)
/// - `detune_cents`: Spread between sources (-100.0 to 100.0, default 0.0)
///
/// # Example
///
/// ```rust
/// use cynthia_core::{MorphingOscillator, Waveform, WavetableBank};
///
/// let mut osc = MorphingOscillator::new(WavetableBank::shared());
/// osc.prepare(220.0, 48000.0);
/// osc.set_waveforms(Waveform::Sine, Waveform::Square);
/// osc.set_morph(0.25);
/// osc.set_detune_cents(12.0);
///
/// let sample = osc.next_sample();
/// assert!(sample.abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct MorphingOscillator {
    bank: Arc<WavetableBank>,

    // Phase state, in table samples
    phase_a: f64,
    phase_b: f64,
    delta_a: f64,
    delta_b: f64,
    base_delta: f64,

    frequency: f32,
    sample_rate: f32,

    waveform_a: Waveform,
    waveform_b: Waveform,
    morph: f32,
    detune_cents: f32,
}

impl MorphingOscillator {
    /// Create an oscillator reading from `bank`, at 440 Hz / 48 kHz.
    pub fn new(bank: Arc<WavetableBank>) -> Self {
        let mut osc = Self {
            bank,
            phase_a: 0.0,
            phase_b: 0.0,
            delta_a: 0.0,
            delta_b: 0.0,
            base_delta: 0.0,
            frequency: 440.0,
            sample_rate: 48000.0,
            waveform_a: Waveform::Sine,
            waveform_b: Waveform::Sawtooth,
            morph: 0.0,
            detune_cents: 0.0,
        };
        osc.prepare(440.0, 48000.0);
        osc
    }

    /// Set base frequency and sample rate, recomputing both phase deltas.
    ///
    /// Base delta is `frequency * TABLE_SIZE / sample_rate`. Phase is kept.
    pub fn prepare(&mut self, frequency: f32, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_frequency(frequency);
    }

    /// Change the base frequency at the current sample rate. Phase is kept.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.base_delta = f64::from(frequency) * TABLE_SIZE as f64 / f64::from(self.sample_rate);
        self.update_detune();
    }

    /// Set the detune spread in cents, clamped to ±[`MAX_DETUNE_CENTS`].
    pub fn set_detune_cents(&mut self, cents: f32) {
        self.detune_cents = cents.clamp(-MAX_DETUNE_CENTS, MAX_DETUNE_CENTS);
        self.update_detune();
    }

    /// Set the morph position, clamped to `[0, 1]`.
    pub fn set_morph(&mut self, morph: f32) {
        self.morph = morph.clamp(0.0, 1.0);
    }

    /// Select the tables read by source A and source B.
    pub fn set_waveforms(&mut self, a: Waveform, b: Waveform) {
        self.waveform_a = a;
        self.waveform_b = b;
    }

    /// Zero both phase accumulators. Deltas and parameters are kept.
    pub fn reset(&mut self) {
        self.phase_a = 0.0;
        self.phase_b = 0.0;
    }

    /// Produce one sample and advance both sources.
    ///
    /// Output is `(1 - morph) * a + morph * b`, each source linearly
    /// interpolated from its table at the current fractional phase.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let a = self.bank.table(self.waveform_a).read(self.phase_a);
        let b = self.bank.table(self.waveform_b).read(self.phase_b);
        let output = lerp(a, b, self.morph);

        self.phase_a = wrap_phase(self.phase_a + self.delta_a);
        self.phase_b = wrap_phase(self.phase_b + self.delta_b);

        output
    }

    /// Base frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Current morph position.
    pub fn morph(&self) -> f32 {
        self.morph
    }

    /// Current detune spread in cents (after clamping).
    pub fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    /// Tables read by source A and source B.
    pub fn waveforms(&self) -> (Waveform, Waveform) {
        (self.waveform_a, self.waveform_b)
    }

    /// Per-sample phase increments `(source_a, source_b)`, in table samples.
    pub fn phase_deltas(&self) -> (f64, f64) {
        (self.delta_a, self.delta_b)
    }

    /// Current phases `(source_a, source_b)`, in table samples.
    pub fn phases(&self) -> (f64, f64) {
        (self.phase_a, self.phase_b)
    }

    fn update_detune(&mut self) {
        let (ratio_a, ratio_b) = detune_ratios(self.detune_cents);
        self.delta_a = self.base_delta * f64::from(ratio_a);
        self.delta_b = self.base_delta * f64::from(ratio_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn osc() -> MorphingOscillator {
        MorphingOscillator::new(WavetableBank::shared())
    }

    #[test]
    fn test_base_phase_delta() {
        let mut o = osc();
        o.prepare(480.0, 48000.0);
        let (a, b) = o.phase_deltas();
        let expected = 480.0 * TABLE_SIZE as f64 / 48000.0;
        assert!((a - expected).abs() < 1e-9);
        assert!((b - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_detune_equal_deltas() {
        let mut o = osc();
        o.prepare(261.63, 44100.0);
        o.set_detune_cents(0.0);
        let (a, b) = o.phase_deltas();
        assert_eq!(a, b);
    }

    #[test]
    fn test_detune_is_symmetric() {
        let mut o = osc();
        o.prepare(440.0, 48000.0);
        o.set_detune_cents(50.0);
        let (a, b) = o.phase_deltas();
        let base = 440.0 * TABLE_SIZE as f64 / 48000.0;
        assert!(a < base && b > base);
        // Geometric mean of the two sources is the base pitch.
        assert!(((a * b).sqrt() - base).abs() < 1e-4);
        // Interval between the sources is the full spread.
        let cents = 1200.0 * (b / a).log2();
        assert!((cents - 50.0).abs() < 1e-3, "interval {}", cents);
    }

    #[test]
    fn test_detune_clamped() {
        let mut o = osc();
        o.set_detune_cents(500.0);
        assert_eq!(o.detune_cents(), 100.0);
        o.set_detune_cents(-500.0);
        assert_eq!(o.detune_cents(), -100.0);
    }

    #[test]
    fn test_detune_survives_frequency_change() {
        let mut o = osc();
        o.set_detune_cents(20.0);
        o.prepare(110.0, 48000.0);
        let (a, b) = o.phase_deltas();
        assert!(b > a, "detune must be recomputed after prepare");
    }

    #[test]
    fn test_octave_ratio() {
        let (a, b) = detune_ratios(1200.0);
        assert!((b / a - 2.0).abs() < 1e-6);
        let (a, b) = detune_ratios(0.0);
        assert_eq!(a, 1.0);
        assert_eq!(b, 1.0);
    }

    #[test]
    fn test_morph_zero_is_source_a() {
        let bank = WavetableBank::shared();
        let mut o = MorphingOscillator::new(bank.clone());
        o.prepare(440.0, 48000.0);
        o.set_waveforms(Waveform::Sine, Waveform::Square);
        o.set_morph(0.0);
        let mut phase = 0.0f64;
        let delta = 440.0 * TABLE_SIZE as f64 / 48000.0;
        for _ in 0..500 {
            let expected = bank.table(Waveform::Sine).read(phase);
            assert!((o.next_sample() - expected).abs() < 1e-6);
            phase = wrap_phase(phase + delta);
        }
    }

    #[test]
    fn test_morph_one_is_source_b() {
        let bank = WavetableBank::shared();
        let mut o = MorphingOscillator::new(bank.clone());
        o.set_waveforms(Waveform::Sine, Waveform::Square);
        o.set_morph(1.0);
        o.set_detune_cents(40.0);
        let (_, delta_b) = o.phase_deltas();
        let samples: Vec<f32> = (0..500).map(|_| o.next_sample()).collect();
        let mut phase = 0.0f64;
        for s in samples {
            let expected = bank.table(Waveform::Square).read(phase);
            assert!((s - expected).abs() < 1e-6);
            phase = wrap_phase(phase + delta_b);
        }
    }

    #[test]
    fn test_morph_clamped() {
        let mut o = osc();
        o.set_morph(-1.0);
        assert_eq!(o.morph(), 0.0);
        o.set_morph(2.0);
        assert_eq!(o.morph(), 1.0);
    }

    #[test]
    fn test_phase_wraps() {
        let mut o = osc();
        o.prepare(12000.0, 48000.0);
        for _ in 0..10_000 {
            o.next_sample();
            let (a, b) = o.phases();
            assert!((0.0..TABLE_SIZE as f64).contains(&a));
            assert!((0.0..TABLE_SIZE as f64).contains(&b));
        }
    }

    #[test]
    fn test_reset_zeroes_phase_keeps_deltas() {
        let mut o = osc();
        o.set_detune_cents(30.0);
        for _ in 0..100 {
            o.next_sample();
        }
        let deltas = o.phase_deltas();
        o.reset();
        assert_eq!(o.phases(), (0.0, 0.0));
        assert_eq!(o.phase_deltas(), deltas);
    }

    #[test]
    fn test_output_bounded() {
        let mut o = osc();
        o.set_waveforms(Waveform::Sawtooth, Waveform::Triangle);
        o.set_morph(0.5);
        o.set_detune_cents(-37.0);
        for _ in 0..5000 {
            let s = o.next_sample();
            assert!((-1.0..=1.0).contains(&s), "sample out of range: {}", s);
        }
    }
}
