//! One-pole ADSR envelope generator with an overshooting attack.
//!
//! The envelope has no timers or sample counters. Every stage runs the same
//! recurrence, once per output sample:
//!
//! ```text
//! level = multiplier * (level - target) + target
//! ```
//!
//! and a stage is nothing more than a `(target, multiplier)` pair:
//!
//! | Stage | Target | Multiplier |
//! |-------|--------|------------|
//! | Attack | [`ATTACK_TARGET`] (2.0) | attack |
//! | Decay / Sustain | sustain level | decay |
//! | Release | 0.0 | release |
//!
//! # Overshoot attack
//!
//! The attack aims at 2.0 rather than 1.0, so the exponential curve crosses
//! unity while it is still steep instead of creeping up on it asymptotically.
//! The crossing is detected every sample by `level + target > 3.0`
//! ([`DECAY_GUARD`]); with the attack target at 2.0 that is exactly
//! `level > 1.0`. At that point target and multiplier switch to the decay
//! stage. The target value and the guard constant are coupled and must be
//! changed together.
//!
//! # Termination
//!
//! Release decays toward zero but never reaches it. The envelope is
//! considered finished once `level` falls to [`SILENCE_THRESHOLD`] or below;
//! [`Envelope::is_active`] is the sole end-of-note signal.

use crate::math::time_to_multiplier;

/// Level at or below which the envelope is considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Attack target. Deliberately above the nominal peak of 1.0.
pub const ATTACK_TARGET: f32 = 2.0;

/// Attack-to-decay transition guard, compared against `level + target`.
pub const DECAY_GUARD: f32 = 3.0;

/// Envelope stage, tracked for inspection only.
///
/// The curve itself is fully determined by the current target and multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Silent; level at or below [`SILENCE_THRESHOLD`].
    #[default]
    Idle,
    /// Rising toward the overshoot target.
    Attack,
    /// Falling toward, or holding at, the sustain level.
    DecaySustain,
    /// Falling toward zero after note-off.
    Release,
}

/// Per-sample multipliers and sustain level for one envelope shape.
///
/// Computed once from stage times and the sample rate by
/// [`EnvelopeCoefficients::from_times`], never on the per-sample path.
///
/// ## Parameters
/// - `attack`, `decay`, `release`: One-pole multipliers in `(0, 1)`
/// - `sustain`: Sustain level (0.0 to 1.0, default 0.8)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeCoefficients {
    /// Attack multiplier.
    pub attack: f32,
    /// Decay multiplier.
    pub decay: f32,
    /// Sustain level, relative to the peak of 1.0.
    pub sustain: f32,
    /// Release multiplier.
    pub release: f32,
}

impl Default for EnvelopeCoefficients {
    fn default() -> Self {
        Self::from_times(0.01, 0.1, 0.8, 0.5, 48000.0)
    }
}

impl EnvelopeCoefficients {
    /// Derive multipliers from stage times in seconds.
    ///
    /// Each multiplier is `exp(-1 / (seconds * sample_rate))`; see
    /// [`time_to_multiplier`]. Sustain is clamped to `[0, 1]`.
    pub fn from_times(
        attack_s: f32,
        decay_s: f32,
        sustain: f32,
        release_s: f32,
        sample_rate: f32,
    ) -> Self {
        Self {
            attack: time_to_multiplier(attack_s, sample_rate),
            decay: time_to_multiplier(decay_s, sample_rate),
            sustain: sustain.clamp(0.0, 1.0),
            release: time_to_multiplier(release_s, sample_rate),
        }
    }
}

/// Overshoot-attack ADSR envelope.
///
/// # Example
///
/// ```rust
/// use cynthia_core::{Envelope, EnvelopeCoefficients};
///
/// let mut env = Envelope::new();
/// env.set_coefficients(EnvelopeCoefficients::from_times(0.005, 0.1, 0.6, 0.3, 48000.0));
///
/// env.attack();
/// for _ in 0..1000 {
///     let level = env.next_value();
///     // scale the voice by `level`
/// }
///
/// env.release();
/// while env.is_active() {
///     env.next_value();
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    level: f32,
    target: f32,
    multiplier: f32,
    coefficients: EnvelopeCoefficients,
    stage: EnvelopeStage,
}

impl Envelope {
    /// Create an idle envelope with default coefficients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install new coefficients.
    ///
    /// Takes effect at the next stage transition; the running stage keeps its
    /// current multiplier.
    pub fn set_coefficients(&mut self, coefficients: EnvelopeCoefficients) {
        self.coefficients = coefficients;
    }

    /// Installed coefficients.
    pub fn coefficients(&self) -> EnvelopeCoefficients {
        self.coefficients
    }

    /// Begin the attack stage.
    ///
    /// Bumps the level by twice the silence threshold so that a fully idle
    /// envelope escapes the exact-zero fixed point and reports active at once.
    pub fn attack(&mut self) {
        self.level += SILENCE_THRESHOLD + SILENCE_THRESHOLD;
        self.target = ATTACK_TARGET;
        self.multiplier = self.coefficients.attack;
        self.stage = EnvelopeStage::Attack;
    }

    /// Begin the release stage from the current level.
    pub fn release(&mut self) {
        self.target = 0.0;
        self.multiplier = self.coefficients.release;
        self.stage = EnvelopeStage::Release;
    }

    /// Return to fully idle: level, target and multiplier all zero.
    pub fn reset(&mut self) {
        self.level = 0.0;
        self.target = 0.0;
        self.multiplier = 0.0;
        self.stage = EnvelopeStage::Idle;
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.level = self.multiplier * (self.level - self.target) + self.target;

        if self.level + self.target > DECAY_GUARD {
            self.multiplier = self.coefficients.decay;
            self.target = self.coefficients.sustain;
            self.stage = EnvelopeStage::DecaySustain;
        }

        self.level
    }

    /// Whether the level is above [`SILENCE_THRESHOLD`].
    #[inline]
    pub fn is_active(&self) -> bool {
        self.level > SILENCE_THRESHOLD
    }

    /// Whether the envelope is still heading for the overshoot target.
    #[inline]
    pub fn is_in_attack(&self) -> bool {
        self.target >= ATTACK_TARGET
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current target level.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current per-sample multiplier.
    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Current stage; [`EnvelopeStage::Idle`] whenever the envelope is silent.
    pub fn stage(&self) -> EnvelopeStage {
        if self.is_active() {
            self.stage
        } else {
            EnvelopeStage::Idle
        }
    }
}
