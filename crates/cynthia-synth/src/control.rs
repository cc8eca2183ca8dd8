//! Control snapshot: every user-facing setting of the engine in one struct.
//!
//! The control surface (UI, host automation, patch loader) produces
//! [`ControlSnapshot`] values; the engine consumes them at block boundaries.
//! Fields are named and typed, so there is no string lookup on the audio
//! thread. Each field is re-clamped independently by
//! [`ControlSnapshot::sanitized`] when the snapshot is applied.
//!
//! [`VoiceParams`] is the applied form: the sanitized snapshot with envelope
//! times converted to per-sample multipliers and cutoff limited below Nyquist
//! for the current sample rate.

use cynthia_core::{
    EnvelopeCoefficients, FilterMode, MAX_DETUNE_CENTS, MAX_LFO_RATE, MIN_LFO_RATE, Waveform,
};

/// Longest envelope stage time in seconds.
pub const MAX_ENVELOPE_TIME: f32 = 5.0;
/// Lowest filter cutoff in Hz.
pub const MIN_CUTOFF_HZ: f32 = 1.0;
/// Highest filter cutoff in Hz, before the Nyquist limit.
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
/// Fraction of the sample rate the cutoff may reach.
pub const NYQUIST_FRACTION: f32 = 0.49;
/// Lowest filter resonance.
pub const MIN_RESONANCE: f32 = 0.01;
/// Highest filter resonance.
pub const MAX_RESONANCE: f32 = 1.0;

/// Clamp a value into `[min, max]`, replacing NaN and infinities with `default`.
#[inline]
fn clamp_or(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Voice allocation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VoiceMode {
    /// Every note-on retriggers voice 0.
    Mono,
    /// Notes are spread over the whole pool, stealing when full.
    #[default]
    Poly,
}

impl VoiceMode {
    /// Lowercase name used in patch files.
    pub fn name(self) -> &'static str {
        match self {
            VoiceMode::Mono => "mono",
            VoiceMode::Poly => "poly",
        }
    }

    /// Parse a mode name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("mono") {
            Some(VoiceMode::Mono)
        } else if name.eq_ignore_ascii_case("poly") {
            Some(VoiceMode::Poly)
        } else {
            None
        }
    }
}

/// Audio oscillator settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorControls {
    /// Table read by source A.
    pub wave_a: Waveform,
    /// Table read by source B.
    pub wave_b: Waveform,
    /// Cross-fade from A (0.0) to B (1.0).
    pub morph: f32,
    /// Spread between the sources in cents (-100.0 to 100.0).
    pub detune_cents: f32,
}

impl Default for OscillatorControls {
    fn default() -> Self {
        Self {
            wave_a: Waveform::Sine,
            wave_b: Waveform::Sawtooth,
            morph: 0.0,
            detune_cents: 0.0,
        }
    }
}

impl OscillatorControls {
    fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            wave_a: self.wave_a,
            wave_b: self.wave_b,
            morph: clamp_or(self.morph, 0.0, 1.0, d.morph),
            detune_cents: clamp_or(
                self.detune_cents,
                -MAX_DETUNE_CENTS,
                MAX_DETUNE_CENTS,
                d.detune_cents,
            ),
        }
    }
}

/// Amplitude LFO settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LfoControls {
    /// Table read by source A.
    pub wave_a: Waveform,
    /// Table read by source B.
    pub wave_b: Waveform,
    /// Cross-fade from A (0.0) to B (1.0).
    pub morph: f32,
    /// Spread between the sources in cents (-100.0 to 100.0).
    pub detune_cents: f32,
    /// Modulation depth (0.0 to 1.0).
    pub depth: f32,
    /// Rate in Hz (1.0 to 500.0).
    pub rate_hz: f32,
}

impl Default for LfoControls {
    fn default() -> Self {
        Self {
            wave_a: Waveform::Sine,
            wave_b: Waveform::Sawtooth,
            morph: 0.0,
            detune_cents: 0.0,
            depth: 0.0,
            rate_hz: 1.0,
        }
    }
}

impl LfoControls {
    fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            wave_a: self.wave_a,
            wave_b: self.wave_b,
            morph: clamp_or(self.morph, 0.0, 1.0, d.morph),
            detune_cents: clamp_or(
                self.detune_cents,
                -MAX_DETUNE_CENTS,
                MAX_DETUNE_CENTS,
                d.detune_cents,
            ),
            depth: clamp_or(self.depth, 0.0, 1.0, d.depth),
            rate_hz: clamp_or(self.rate_hz, MIN_LFO_RATE, MAX_LFO_RATE, d.rate_hz),
        }
    }
}

/// Amplitude envelope settings, as stage times.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeControls {
    /// Attack time constant in seconds.
    pub attack_s: f32,
    /// Decay time constant in seconds.
    pub decay_s: f32,
    /// Sustain level (0.0 to 1.0).
    pub sustain: f32,
    /// Release time constant in seconds.
    pub release_s: f32,
}

impl Default for EnvelopeControls {
    fn default() -> Self {
        Self {
            attack_s: 0.01,
            decay_s: 0.1,
            sustain: 0.8,
            release_s: 0.5,
        }
    }
}

impl EnvelopeControls {
    /// Per-sample multipliers for these times at `sample_rate`.
    pub fn coefficients(&self, sample_rate: f32) -> EnvelopeCoefficients {
        EnvelopeCoefficients::from_times(
            self.attack_s,
            self.decay_s,
            self.sustain,
            self.release_s,
            sample_rate,
        )
    }

    fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            attack_s: clamp_or(self.attack_s, 0.0, MAX_ENVELOPE_TIME, d.attack_s),
            decay_s: clamp_or(self.decay_s, 0.0, MAX_ENVELOPE_TIME, d.decay_s),
            sustain: clamp_or(self.sustain, 0.0, 1.0, d.sustain),
            release_s: clamp_or(self.release_s, 0.0, MAX_ENVELOPE_TIME, d.release_s),
        }
    }
}

/// Filter settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterControls {
    /// Returned filter tap.
    pub mode: FilterMode,
    /// Cutoff in Hz (1.0 to 20000.0, further limited below Nyquist).
    pub cutoff_hz: f32,
    /// Resonance (0.01 to 1.0).
    pub resonance: f32,
}

impl Default for FilterControls {
    fn default() -> Self {
        Self {
            mode: FilterMode::LowPass,
            cutoff_hz: 10_000.0,
            resonance: 0.5,
        }
    }
}

impl FilterControls {
    /// Cutoff limited to [`NYQUIST_FRACTION`] of `sample_rate`.
    pub fn cutoff_for(&self, sample_rate: f32) -> f32 {
        self.cutoff_hz
            .min(sample_rate * NYQUIST_FRACTION)
            .max(MIN_CUTOFF_HZ)
    }

    fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            mode: self.mode,
            cutoff_hz: clamp_or(self.cutoff_hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ, d.cutoff_hz),
            resonance: clamp_or(self.resonance, MIN_RESONANCE, MAX_RESONANCE, d.resonance),
        }
    }
}

/// All engine settings at one point in time.
///
/// `Copy`, so it can be handed across the control boundary by value and
/// applied without allocation.
///
/// # Example
///
/// ```rust
/// use cynthia_synth::{ControlSnapshot, VoiceMode};
/// use cynthia_core::{FilterMode, Waveform};
///
/// let mut snapshot = ControlSnapshot::default();
/// snapshot.oscillator.wave_b = Waveform::Square;
/// snapshot.oscillator.morph = 0.4;
/// snapshot.filter.mode = FilterMode::BandPass;
/// snapshot.voice_mode = VoiceMode::Mono;
///
/// let applied = snapshot.sanitized();
/// assert_eq!(applied.oscillator.morph, 0.4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSnapshot {
    /// Audio oscillator.
    pub oscillator: OscillatorControls,
    /// Amplitude LFO.
    pub lfo: LfoControls,
    /// Amplitude envelope.
    pub envelope: EnvelopeControls,
    /// Per-voice filter.
    pub filter: FilterControls,
    /// Output gain applied to every voice's amplitude (0.0 to 1.0, default 0.3).
    pub output_gain: f32,
    /// Allocation mode.
    pub voice_mode: VoiceMode,
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSnapshot {
    /// Default output gain.
    pub const DEFAULT_OUTPUT_GAIN: f32 = 0.3;

    /// Default settings.
    pub fn new() -> Self {
        Self {
            oscillator: OscillatorControls::default(),
            lfo: LfoControls::default(),
            envelope: EnvelopeControls::default(),
            filter: FilterControls::default(),
            output_gain: Self::DEFAULT_OUTPUT_GAIN,
            voice_mode: VoiceMode::Poly,
        }
    }

    /// Copy with every field clamped to its documented range.
    ///
    /// Fields are handled independently. Non-finite values fall back to
    /// the field's default.
    pub fn sanitized(&self) -> Self {
        Self {
            oscillator: self.oscillator.sanitized(),
            lfo: self.lfo.sanitized(),
            envelope: self.envelope.sanitized(),
            filter: self.filter.sanitized(),
            output_gain: clamp_or(self.output_gain, 0.0, 1.0, Self::DEFAULT_OUTPUT_GAIN),
            voice_mode: self.voice_mode,
        }
    }
}

/// A snapshot resolved for one sample rate, ready to hand to voices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    /// Sample rate the parameters were resolved for.
    pub sample_rate: f32,
    /// Audio oscillator.
    pub oscillator: OscillatorControls,
    /// Amplitude LFO.
    pub lfo: LfoControls,
    /// Filter, with cutoff already limited below Nyquist.
    pub filter: FilterControls,
    /// Envelope multipliers and sustain.
    pub envelope: EnvelopeCoefficients,
    /// Output gain.
    pub output_gain: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self::from_snapshot(&ControlSnapshot::new(), 48000.0)
    }
}

impl VoiceParams {
    /// Sanitize `snapshot` and resolve it for `sample_rate`.
    pub fn from_snapshot(snapshot: &ControlSnapshot, sample_rate: f32) -> Self {
        let s = snapshot.sanitized();
        Self {
            sample_rate,
            oscillator: s.oscillator,
            lfo: s.lfo,
            filter: FilterControls {
                cutoff_hz: s.filter.cutoff_for(sample_rate),
                ..s.filter
            },
            envelope: s.envelope.coefficients(sample_rate),
            output_gain: s.output_gain,
        }
    }
}
