//! A single synthesizer voice.
//!
//! One voice plays one note. It owns an audio oscillator, an amplitude LFO,
//! an envelope and a filter, and produces one sample per [`Voice::render`]
//! call:
//!
//! ```text
//! osc ──► filter ──► × envelope ──► × amplitude ──► × clamp(1 + lfo, -1, 1) ──► out
//! ```
//!
//! Voices are created once by the pool and recycled. A voice is never
//! destroyed; once its envelope falls silent the pool resets it to idle.

use alloc::sync::Arc;

use cynthia_core::{
    Envelope, EnvelopeStage, Filter, MorphingLfo, MorphingOscillator, SvfFilter, WavetableBank,
};

use crate::control::VoiceParams;

/// Lifecycle state of a voice, derived from its envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceState {
    /// Silent and free for allocation.
    #[default]
    Idle,
    /// Attacking, decaying or sustaining.
    Active,
    /// Note released, envelope still above the silence threshold.
    Releasing,
}

/// One note's worth of signal chain.
///
/// Generic over the [`Filter`] implementation; [`SvfFilter`] by default.
///
/// # Example
///
/// ```rust
/// use cynthia_core::{WavetableBank, midi_to_freq};
/// use cynthia_synth::{Voice, VoiceParams, VoiceState};
///
/// let mut voice: Voice = Voice::new(WavetableBank::shared());
/// let params = VoiceParams::default();
///
/// voice.start(60, 100, midi_to_freq(60), &params);
/// for _ in 0..1000 {
///     let sample = voice.render();
/// }
///
/// voice.stop();
/// assert_eq!(voice.state(), VoiceState::Releasing);
/// ```
#[derive(Debug, Clone)]
pub struct Voice<F: Filter + Default = SvfFilter> {
    note: Option<u8>,
    velocity: u8,
    amplitude: f32,

    osc: MorphingOscillator,
    lfo: MorphingLfo,
    env: Envelope,
    filter: F,

    sample_rate: f32,
}

impl<F: Filter + Default> Voice<F> {
    /// Create an idle voice reading from `bank`.
    pub fn new(bank: Arc<WavetableBank>) -> Self {
        let osc = MorphingOscillator::new(Arc::clone(&bank));
        let sample_rate = osc.sample_rate();
        let mut filter = F::default();
        filter.prepare(sample_rate);
        Self {
            note: None,
            velocity: 0,
            amplitude: 0.0,
            osc,
            lfo: MorphingLfo::new(bank),
            env: Envelope::new(),
            filter,
            sample_rate,
        }
    }

    /// Set the sample rate for every component and return to idle.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.osc.prepare(self.osc.frequency(), sample_rate);
        self.lfo.prepare(self.lfo.rate(), sample_rate);
        self.filter.prepare(sample_rate);
        self.reset();
    }

    /// Begin playing `note`.
    ///
    /// Oscillator and LFO restart from phase zero, filter state is cleared
    /// and every parameter in `params` is installed. The envelope keeps its
    /// current level and enters Attack, so stealing a sounding voice does not
    /// jump to zero.
    pub fn start(&mut self, note: u8, velocity: u8, frequency: f32, params: &VoiceParams) {
        self.note = Some(note);
        self.velocity = velocity;
        self.amplitude = f32::from(velocity) / 127.0 * params.output_gain;

        if params.sample_rate != self.sample_rate {
            self.sample_rate = params.sample_rate;
            self.filter.prepare(params.sample_rate);
        }

        self.osc.prepare(frequency, params.sample_rate);
        self.osc.reset();
        self.lfo.prepare(params.lfo.rate_hz, params.sample_rate);

        self.filter.reset();
        self.update_params(params);

        self.env.set_coefficients(params.envelope);
        self.env.attack();
    }

    /// Push the continuously settable parameters into this voice.
    ///
    /// Filter, oscillator and LFO settings change at once without resetting
    /// phase or filter state. Envelope shape and amplitude are not touched;
    /// they are fixed at [`start`](Self::start).
    pub fn update_params(&mut self, params: &VoiceParams) {
        let osc = &params.oscillator;
        self.osc.set_waveforms(osc.wave_a, osc.wave_b);
        self.osc.set_morph(osc.morph);
        self.osc.set_detune_cents(osc.detune_cents);

        let lfo = &params.lfo;
        self.lfo.set_waveforms(lfo.wave_a, lfo.wave_b);
        self.lfo.set_morph(lfo.morph);
        self.lfo.set_detune_cents(lfo.detune_cents);
        self.lfo.set_depth(lfo.depth);
        self.lfo.set_rate(lfo.rate_hz);

        let filter = &params.filter;
        self.filter.set_cutoff(filter.cutoff_hz);
        self.filter.set_resonance(filter.resonance);
        self.filter.set_mode(filter.mode);
    }

    /// Begin the release stage. Phase and filter state carry on.
    pub fn stop(&mut self) {
        self.env.release();
    }

    /// Return to idle: no note, all state cleared.
    pub fn reset(&mut self) {
        self.note = None;
        self.velocity = 0;
        self.amplitude = 0.0;
        self.osc.reset();
        self.lfo.reset();
        self.env.reset();
        self.filter.reset();
    }

    /// Produce the next output sample and advance every component.
    #[inline]
    pub fn render(&mut self) -> f32 {
        let sample = self.osc.next_sample();
        let envelope = self.env.next_value();
        let filtered = self.filter.process_sample(sample);
        let modulator = (1.0 + self.lfo.next_sample()).clamp(-1.0, 1.0);
        filtered * envelope * self.amplitude * modulator
    }

    /// Forget the note number while the voice keeps sounding.
    pub(crate) fn clear_note(&mut self) {
        self.note = None;
    }

    /// Note currently assigned, if any.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Velocity of the current note.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Amplitude scalar: `velocity / 127 * output_gain`.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Whether the envelope is above the silence threshold.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    /// Whether the envelope is still in its attack stage.
    #[inline]
    pub fn is_in_attack(&self) -> bool {
        self.env.is_in_attack()
    }

    /// Current envelope level.
    #[inline]
    pub fn level(&self) -> f32 {
        self.env.level()
    }

    /// Lifecycle state.
    pub fn state(&self) -> VoiceState {
        match self.env.stage() {
            EnvelopeStage::Idle => VoiceState::Idle,
            EnvelopeStage::Release => VoiceState::Releasing,
            EnvelopeStage::Attack | EnvelopeStage::DecaySustain => VoiceState::Active,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Audio oscillator.
    pub fn oscillator(&self) -> &MorphingOscillator {
        &self.osc
    }

    /// Amplitude LFO.
    pub fn lfo(&self) -> &MorphingLfo {
        &self.lfo
    }

    /// Amplitude envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    /// Filter.
    pub fn filter(&self) -> &F {
        &self.filter
    }
}
