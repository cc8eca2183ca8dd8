//! Resonant filter capability and its state-variable implementation.
//!
//! [`Filter`] is the per-voice filter seam. The voice is generic over it, so
//! alternative topologies plug in without dynamic dispatch. [`SvfFilter`] is
//! the one implementation shipped.
//!
//! # Topology
//!
//! [`SvfFilter`] is the Topology-Preserving Transform (TPT) state-variable
//! filter after Zavalishin, "The Art of VA Filter Design" (2012). Trapezoidal
//! integration keeps the analog prototype's response and stays stable while
//! cutoff is swept. Low-pass, high-pass and band-pass are read from the same
//! two integrators; [`FilterMode`] selects which tap is returned.
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 3.

use core::f32::consts::PI;
use libm::tanf;

use crate::math::flush_denormal;

/// Filter response selected by [`Filter::set_mode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Passes frequencies below the cutoff.
    #[default]
    LowPass,
    /// Passes frequencies above the cutoff.
    HighPass,
    /// Passes frequencies near the cutoff.
    BandPass,
}

impl FilterMode {
    /// All modes in index order.
    pub const ALL: [FilterMode; 3] = [
        FilterMode::LowPass,
        FilterMode::HighPass,
        FilterMode::BandPass,
    ];

    /// Mode for index 0 (low-pass), 1 (high-pass) or 2 (band-pass).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Index of this mode.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in patch files.
    pub fn name(self) -> &'static str {
        match self {
            FilterMode::LowPass => "lowpass",
            FilterMode::HighPass => "highpass",
            FilterMode::BandPass => "bandpass",
        }
    }

    /// Parse a mode name (case-insensitive, `"lp"`/`"hp"`/`"bp"` accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("lowpass") || name.eq_ignore_ascii_case("lp") {
            Some(FilterMode::LowPass)
        } else if name.eq_ignore_ascii_case("highpass") || name.eq_ignore_ascii_case("hp") {
            Some(FilterMode::HighPass)
        } else if name.eq_ignore_ascii_case("bandpass") || name.eq_ignore_ascii_case("bp") {
            Some(FilterMode::BandPass)
        } else {
            None
        }
    }
}

/// Per-voice mono filter.
///
/// Cutoff and resonance are taken as given. Range checking belongs to the
/// caller (the control snapshot clamps cutoff below Nyquist and resonance to
/// `(0, 1]`).
///
/// None of these methods may allocate; all are called from the audio thread.
pub trait Filter {
    /// Set the sample rate and recompute coefficients. Clears state.
    fn prepare(&mut self, sample_rate: f32);

    /// Clear internal state without changing parameters.
    fn reset(&mut self);

    /// Set cutoff frequency in Hz.
    fn set_cutoff(&mut self, hz: f32);

    /// Set resonance (Q).
    fn set_resonance(&mut self, q: f32);

    /// Select which response [`process_sample`](Self::process_sample) returns.
    fn set_mode(&mut self, mode: FilterMode);

    /// Filter one sample.
    fn process_sample(&mut self, input: f32) -> f32;
}

/// Simultaneous outputs of one [`SvfFilter`] tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SvfOutputs {
    /// Low-pass tap.
    pub lowpass: f32,
    /// High-pass tap.
    pub highpass: f32,
    /// Band-pass tap.
    pub bandpass: f32,
}

/// TPT state-variable filter (2-pole, 12 dB/oct).
///
/// ## Parameters
/// - `cutoff`: Cutoff frequency in Hz (above 0 and below Nyquist, default 1000.0)
/// - `resonance`: Q factor (0.01 to 1.0 from the control layer, default 0.707)
/// - `mode`: Returned tap (default `LowPass`)
///
/// # Example
///
/// ```rust
/// use cynthia_core::{Filter, FilterMode, SvfFilter};
///
/// let mut svf = SvfFilter::new(48000.0);
/// svf.set_cutoff(2000.0);
/// svf.set_resonance(0.5);
/// svf.set_mode(FilterMode::BandPass);
///
/// let output = svf.process_sample(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct SvfFilter {
    // Integrator state
    ic1eq: f32,
    ic2eq: f32,

    // Coefficients
    g: f32,
    k: f32,

    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    mode: FilterMode,
}

impl Default for SvfFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl SvfFilter {
    /// Smallest resonance used for the damping term, guarding `1/q`.
    const MIN_RESONANCE: f32 = 1e-3;

    /// Create a low-pass SVF at 1000 Hz, Q = 0.707.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            k: 0.0,
            sample_rate,
            cutoff: 1000.0,
            resonance: core::f32::consts::FRAC_1_SQRT_2,
            mode: FilterMode::LowPass,
        };
        svf.update_coefficients();
        svf
    }

    /// Current cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Current resonance (Q).
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Current mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Run one sample and return all three taps.
    #[inline]
    pub fn process_all(&mut self, input: f32) -> SvfOutputs {
        let v3 = input - self.ic2eq;
        let v1 = (self.g * v3 + self.ic1eq) / (1.0 + self.g * (self.g + self.k));
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = flush_denormal(2.0 * v1 - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        SvfOutputs {
            lowpass: v2,
            highpass: input - self.k * v1 - v2,
            bandpass: v1,
        }
    }

    fn update_coefficients(&mut self) {
        self.g = tanf(PI * self.cutoff / self.sample_rate);
        self.k = 1.0 / self.resonance.max(Self::MIN_RESONANCE);
    }
}

impl Filter for SvfFilter {
    fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
        self.reset();
    }

    fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    fn set_cutoff(&mut self, hz: f32) {
        self.cutoff = hz;
        self.update_coefficients();
    }

    fn set_resonance(&mut self, q: f32) {
        self.resonance = q;
        self.update_coefficients();
    }

    fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let out = self.process_all(input);
        match self.mode {
            FilterMode::LowPass => out.lowpass,
            FilterMode::HighPass => out.highpass,
            FilterMode::BandPass => out.bandpass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(svf: &mut SvfFilter, input: f32, samples: usize) -> f32 {
        let mut out = 0.0;
        for _ in 0..samples {
            out = svf.process_sample(input);
        }
        out
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut svf = SvfFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        let out = settle(&mut svf, 1.0, 2000);
        assert!((out - 1.0).abs() < 0.05, "DC should pass, got {}", out);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut svf = SvfFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        svf.set_mode(FilterMode::HighPass);
        let out = settle(&mut svf, 1.0, 2000);
        assert!(out.abs() < 0.05, "DC should be blocked, got {}", out);
    }

    #[test]
    fn test_bandpass_blocks_dc() {
        let mut svf = SvfFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        svf.set_mode(FilterMode::BandPass);
        let out = settle(&mut svf, 1.0, 4000);
        assert!(out.abs() < 0.05, "DC should be blocked, got {}", out);
    }

    #[test]
    fn test_lowpass_attenuates_nyquist() {
        let mut svf = SvfFilter::new(48000.0);
        svf.set_cutoff(500.0);
        svf.set_resonance(0.5);
        let mut peak = 0.0f32;
        for i in 0..4000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = svf.process_sample(x);
            if i > 2000 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.01, "Nyquist should be rejected, peak {}", peak);
    }

    #[test]
    fn test_taps_sum_to_input() {
        // At Q = 1 (k = 1): lp + k*bp + hp == input.
        let mut svf = SvfFilter::new(48000.0);
        svf.set_cutoff(3000.0);
        svf.set_resonance(1.0);
        for i in 0..500 {
            let x = libm::sinf(i as f32 * 0.07);
            let o = svf.process_all(x);
            assert!((o.lowpass + o.bandpass + o.highpass - x).abs() < 1e-5);
        }
    }

    #[test]
    fn test_mode_selects_tap() {
        let mut a = SvfFilter::new(48000.0);
        let mut b = SvfFilter::new(48000.0);
        b.set_mode(FilterMode::HighPass);
        for i in 0..64 {
            let x = libm::sinf(i as f32 * 0.3);
            let all = a.process_all(x);
            let hp = b.process_sample(x);
            assert!((all.highpass - hp).abs() < 1e-7);
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut svf = SvfFilter::new(48000.0);
        settle(&mut svf, 1.0, 100);
        svf.reset();
        assert_eq!(svf.ic1eq, 0.0);
        assert_eq!(svf.ic2eq, 0.0);
    }

    #[test]
    fn test_prepare_recomputes_and_clears() {
        let mut svf = SvfFilter::new(48000.0);
        svf.set_cutoff(1000.0);
        let g48 = svf.g;
        settle(&mut svf, 1.0, 100);
        svf.prepare(96000.0);
        assert!(svf.g < g48);
        assert_eq!(svf.ic1eq, 0.0);
        assert_eq!(svf.sample_rate(), 96000.0);
    }

    #[test]
    fn test_low_resonance_stable() {
        let mut svf = SvfFilter::new(44100.0);
        svf.set_cutoff(10_000.0);
        svf.set_resonance(0.01);
        for i in 0..4000 {
            let y = svf.process_sample(libm::sinf(i as f32 * 0.5));
            assert!(y.is_finite());
        }
    }

    #[test]
    fn test_mode_names() {
        for mode in FilterMode::ALL {
            assert_eq!(FilterMode::from_name(mode.name()), Some(mode));
            assert_eq!(FilterMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(FilterMode::from_index(3), None);
        assert_eq!(FilterMode::from_name("notch"), None);
    }
}
