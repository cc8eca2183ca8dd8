//! Morphing low-frequency oscillator for amplitude modulation.
//!
//! Same dual-wavetable mechanism as [`MorphingOscillator`], run at sub-audio
//! rates and scaled by a depth factor. Output is bipolar in `[-depth, depth]`.

use alloc::sync::Arc;

use crate::oscillator::MorphingOscillator;
use crate::wavetable::{Waveform, WavetableBank};

/// Lowest LFO rate in Hz.
pub const MIN_LFO_RATE: f32 = 1.0;
/// Highest LFO rate in Hz.
pub const MAX_LFO_RATE: f32 = 500.0;

/// Morphing LFO: a [`MorphingOscillator`] scaled by a modulation depth.
///
/// ## Parameters
/// - `rate`: LFO frequency in Hz (1.0 to 500.0, default 1.0)
/// - `depth`: Output scale (0.0 to 1.0, default 0.0)
/// - `morph`, `detune_cents`, waveforms: as for [`MorphingOscillator`]
///
/// # Example
///
/// ```rust
/// use cynthia_core::{MorphingLfo, WavetableBank};
///
/// let mut lfo = MorphingLfo::new(WavetableBank::shared());
/// lfo.prepare(5.0, 48000.0);
/// lfo.set_depth(0.5);
///
/// let value = lfo.next_sample();
/// assert!(value.abs() <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct MorphingLfo {
    osc: MorphingOscillator,
    depth: f32,
}

impl MorphingLfo {
    /// Create an LFO at 1 Hz with zero depth.
    pub fn new(bank: Arc<WavetableBank>) -> Self {
        let mut osc = MorphingOscillator::new(bank);
        osc.prepare(MIN_LFO_RATE, osc.sample_rate());
        Self { osc, depth: 0.0 }
    }

    /// Set rate and sample rate, then restart the cycle from phase zero.
    ///
    /// Rate is clamped to `[MIN_LFO_RATE, MAX_LFO_RATE]`.
    pub fn prepare(&mut self, rate: f32, sample_rate: f32) {
        self.osc
            .prepare(rate.clamp(MIN_LFO_RATE, MAX_LFO_RATE), sample_rate);
        self.osc.reset();
    }

    /// Change the rate without restarting the cycle.
    pub fn set_rate(&mut self, rate: f32) {
        self.osc
            .set_frequency(rate.clamp(MIN_LFO_RATE, MAX_LFO_RATE));
    }

    /// Set modulation depth, clamped to `[0, 1]`.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    /// Set morph position between the two sources.
    pub fn set_morph(&mut self, morph: f32) {
        self.osc.set_morph(morph);
    }

    /// Set the detune spread between the two sources in cents.
    pub fn set_detune_cents(&mut self, cents: f32) {
        self.osc.set_detune_cents(cents);
    }

    /// Select the tables read by the two sources.
    pub fn set_waveforms(&mut self, a: Waveform, b: Waveform) {
        self.osc.set_waveforms(a, b);
    }

    /// Restart the cycle from phase zero.
    pub fn reset(&mut self) {
        self.osc.reset();
    }

    /// Next modulation value: oscillator output times depth.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.osc.next_sample() * self.depth
    }

    /// Current rate in Hz.
    pub fn rate(&self) -> f32 {
        self.osc.frequency()
    }

    /// Current depth.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Underlying oscillator, for inspecting phase and morph state.
    pub fn oscillator(&self) -> &MorphingOscillator {
        &self.osc
    }
}
