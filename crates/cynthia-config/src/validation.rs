//! Parameter ranges and patch validation.
//!
//! [`PARAM_RANGES`] is the single table of every scalar patch field with its
//! range and default. Patches are checked against it once, when they cross
//! into the engine; the engine itself never sees an out-of-range value from a
//! patch file.
//!
//! # Example
//!
//! ```rust
//! use cynthia_config::{ValidationError, param_range, validate_param};
//!
//! let cutoff = param_range("filter.cutoff_hz").expect("known parameter");
//! assert_eq!(cutoff.max, 20000.0);
//!
//! assert!(validate_param("lfo.depth", 0.5).is_ok());
//! assert!(matches!(
//!     validate_param("lfo.depth", 1.5),
//!     Err(ValidationError::OutOfRange { .. })
//! ));
//! ```

use cynthia_core::{FilterMode, MAX_DETUNE_CENTS, MAX_LFO_RATE, MIN_LFO_RATE, Waveform};
use cynthia_synth::{
    MAX_CUTOFF_HZ, MAX_ENVELOPE_TIME, MAX_RESONANCE, MIN_CUTOFF_HZ, MIN_RESONANCE, VoiceMode,
};
use thiserror::Error;

use crate::patch::Patch;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// NaN or infinite parameter value.
    #[error("parameter '{param}' is not a finite number")]
    NonFinite {
        /// Name of the parameter.
        param: String,
    },

    /// Waveform name not recognized.
    #[error("unknown waveform '{name}' for '{param}'")]
    UnknownWaveform {
        /// Field holding the name.
        param: String,
        /// The unrecognized name.
        name: String,
    },

    /// Filter mode name not recognized.
    #[error("unknown filter mode: {0}")]
    UnknownFilterMode(String),

    /// Voice mode name not recognized.
    #[error("unknown voice mode: {0}")]
    UnknownVoiceMode(String),

    /// Parameter name not in [`PARAM_RANGES`].
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Range and default of one scalar patch field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Dotted field name, as written in patch files (`"filter.cutoff_hz"`).
    pub name: &'static str,
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// Default value.
    pub default: f32,
}

impl ParamRange {
    /// Check `value` against this range.
    pub fn check(&self, value: f32) -> ValidationResult<()> {
        if !value.is_finite() {
            Err(ValidationError::NonFinite {
                param: self.name.to_string(),
            })
        } else if value < self.min || value > self.max {
            Err(ValidationError::OutOfRange {
                param: self.name.to_string(),
                value,
                min: self.min,
                max: self.max,
            })
        } else {
            Ok(())
        }
    }

    /// Whether `value` is finite and inside the range.
    pub fn contains(&self, value: f32) -> bool {
        self.check(value).is_ok()
    }
}

const fn range(name: &'static str, min: f32, max: f32, default: f32) -> ParamRange {
    ParamRange {
        name,
        min,
        max,
        default,
    }
}

/// Every scalar patch field with its range and default.
pub const PARAM_RANGES: &[ParamRange] = &[
    range("oscillator.morph", 0.0, 1.0, 0.0),
    range("oscillator.detune_cents", -MAX_DETUNE_CENTS, MAX_DETUNE_CENTS, 0.0),
    range("lfo.morph", 0.0, 1.0, 0.0),
    range("lfo.detune_cents", -MAX_DETUNE_CENTS, MAX_DETUNE_CENTS, 0.0),
    range("lfo.depth", 0.0, 1.0, 0.0),
    range("lfo.rate_hz", MIN_LFO_RATE, MAX_LFO_RATE, 1.0),
    range("envelope.attack_s", 0.0, MAX_ENVELOPE_TIME, 0.01),
    range("envelope.decay_s", 0.0, MAX_ENVELOPE_TIME, 0.1),
    range("envelope.sustain", 0.0, 1.0, 0.8),
    range("envelope.release_s", 0.0, MAX_ENVELOPE_TIME, 0.5),
    range("filter.cutoff_hz", MIN_CUTOFF_HZ, MAX_CUTOFF_HZ, 10_000.0),
    range("filter.resonance", MIN_RESONANCE, MAX_RESONANCE, 0.5),
    range("output_gain", 0.0, 1.0, 0.3),
];

/// Look up a parameter range by dotted name (case-insensitive).
pub fn param_range(name: &str) -> Option<&'static ParamRange> {
    PARAM_RANGES
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
}

/// Validate one scalar parameter by name.
pub fn validate_param(name: &str, value: f32) -> ValidationResult<()> {
    param_range(name)
        .ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?
        .check(value)
}

/// Parse a waveform name for field `param`.
pub fn parse_waveform(param: &str, name: &str) -> ValidationResult<Waveform> {
    Waveform::from_name(name).ok_or_else(|| ValidationError::UnknownWaveform {
        param: param.to_string(),
        name: name.to_string(),
    })
}

/// Parse a filter mode name.
pub fn parse_filter_mode(name: &str) -> ValidationResult<FilterMode> {
    FilterMode::from_name(name).ok_or_else(|| ValidationError::UnknownFilterMode(name.to_string()))
}

/// Parse a voice mode name.
pub fn parse_voice_mode(name: &str) -> ValidationResult<VoiceMode> {
    VoiceMode::from_name(name).ok_or_else(|| ValidationError::UnknownVoiceMode(name.to_string()))
}

/// Validate every field of a patch.
///
/// All failures are collected; a single failure is returned on its own,
/// several are wrapped in [`ValidationError::Multiple`].
///
/// # Example
///
/// ```rust
/// use cynthia_config::{Patch, ValidationError, validate_patch};
///
/// let mut patch = Patch::new("Broken");
/// patch.filter.mode = "comb".to_string();
/// patch.lfo.rate_hz = 9000.0;
///
/// match validate_patch(&patch) {
///     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
///     other => panic!("expected two errors, got {other:?}"),
/// }
/// ```
pub fn validate_patch(patch: &Patch) -> ValidationResult<()> {
    let mut errors = Vec::new();

    for (name, value) in patch.scalar_params() {
        if let Err(e) = validate_param(name, value) {
            errors.push(e);
        }
    }

    for (param, name) in patch.waveform_names() {
        if let Err(e) = parse_waveform(param, name) {
            errors.push(e);
        }
    }

    if let Err(e) = parse_filter_mode(&patch.filter.mode) {
        errors.push(e);
    }
    if let Err(e) = parse_voice_mode(&patch.voice_mode) {
        errors.push(e);
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
