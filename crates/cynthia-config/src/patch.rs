//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use cynthia_synth::{
    ControlSnapshot, EnvelopeControls, FilterControls, LfoControls, OscillatorControls,
};

use crate::error::ConfigError;
use crate::validation::{self, ValidationResult};

/// A complete synth setting, as stored on disk.
///
/// Patches mirror [`ControlSnapshot`] with names in place of enums so that a
/// hand-edited file can be validated with useful messages before anything
/// reaches the engine. Every section is optional; missing sections and
/// fields take their defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Soft Pad"
/// description = "Slow attack, gentle tremolo"
/// voice_mode = "poly"
/// output_gain = 0.25
///
/// [oscillator]
/// wave_a = "sine"
/// wave_b = "triangle"
/// morph = 0.4
/// detune_cents = 6.0
///
/// [lfo]
/// depth = 0.15
/// rate_hz = 3.0
///
/// [envelope]
/// attack_s = 0.6
/// release_s = 1.5
///
/// [filter]
/// mode = "lowpass"
/// cutoff_hz = 2500.0
/// resonance = 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Name of the patch.
    pub name: String,

    /// Optional description of the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `"mono"` or `"poly"`.
    #[serde(default = "default_voice_mode")]
    pub voice_mode: String,

    /// Output gain (0.0 to 1.0).
    #[serde(default = "default_output_gain")]
    pub output_gain: f32,

    /// Audio oscillator section.
    #[serde(default)]
    pub oscillator: OscillatorSection,

    /// Amplitude LFO section.
    #[serde(default)]
    pub lfo: LfoSection,

    /// Amplitude envelope section.
    #[serde(default)]
    pub envelope: EnvelopeSection,

    /// Filter section.
    #[serde(default)]
    pub filter: FilterSection,
}

fn default_voice_mode() -> String {
    "poly".to_string()
}

fn default_output_gain() -> f32 {
    ControlSnapshot::DEFAULT_OUTPUT_GAIN
}

/// `[oscillator]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OscillatorSection {
    /// Waveform name of source A.
    pub wave_a: String,
    /// Waveform name of source B.
    pub wave_b: String,
    /// Cross-fade from A to B.
    pub morph: f32,
    /// Spread between the sources in cents.
    pub detune_cents: f32,
}

impl Default for OscillatorSection {
    fn default() -> Self {
        Self::from(&OscillatorControls::default())
    }
}

impl From<&OscillatorControls> for OscillatorSection {
    fn from(c: &OscillatorControls) -> Self {
        Self {
            wave_a: c.wave_a.name().to_string(),
            wave_b: c.wave_b.name().to_string(),
            morph: c.morph,
            detune_cents: c.detune_cents,
        }
    }
}

/// `[lfo]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LfoSection {
    /// Waveform name of source A.
    pub wave_a: String,
    /// Waveform name of source B.
    pub wave_b: String,
    /// Cross-fade from A to B.
    pub morph: f32,
    /// Spread between the sources in cents.
    pub detune_cents: f32,
    /// Modulation depth.
    pub depth: f32,
    /// Rate in Hz.
    pub rate_hz: f32,
}

impl Default for LfoSection {
    fn default() -> Self {
        Self::from(&LfoControls::default())
    }
}

impl From<&LfoControls> for LfoSection {
    fn from(c: &LfoControls) -> Self {
        Self {
            wave_a: c.wave_a.name().to_string(),
            wave_b: c.wave_b.name().to_string(),
            morph: c.morph,
            detune_cents: c.detune_cents,
            depth: c.depth,
            rate_hz: c.rate_hz,
        }
    }
}

/// `[envelope]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvelopeSection {
    /// Attack time constant in seconds.
    pub attack_s: f32,
    /// Decay time constant in seconds.
    pub decay_s: f32,
    /// Sustain level.
    pub sustain: f32,
    /// Release time constant in seconds.
    pub release_s: f32,
}

impl Default for EnvelopeSection {
    fn default() -> Self {
        Self::from(&EnvelopeControls::default())
    }
}

impl From<&EnvelopeControls> for EnvelopeSection {
    fn from(c: &EnvelopeControls) -> Self {
        Self {
            attack_s: c.attack_s,
            decay_s: c.decay_s,
            sustain: c.sustain,
            release_s: c.release_s,
        }
    }
}

/// `[filter]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterSection {
    /// `"lowpass"`, `"highpass"` or `"bandpass"`.
    pub mode: String,
    /// Cutoff in Hz.
    pub cutoff_hz: f32,
    /// Resonance.
    pub resonance: f32,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self::from(&FilterControls::default())
    }
}

impl From<&FilterControls> for FilterSection {
    fn from(c: &FilterControls) -> Self {
        Self {
            mode: c.mode.name().to_string(),
            cutoff_hz: c.cutoff_hz,
            resonance: c.resonance,
        }
    }
}

impl Patch {
    /// Create a patch with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_snapshot(name, &ControlSnapshot::default())
    }

    /// Create a patch with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Capture a control snapshot as a patch.
    pub fn from_snapshot(name: impl Into<String>, snapshot: &ControlSnapshot) -> Self {
        Self {
            name: name.into(),
            description: None,
            voice_mode: snapshot.voice_mode.name().to_string(),
            output_gain: snapshot.output_gain,
            oscillator: OscillatorSection::from(&snapshot.oscillator),
            lfo: LfoSection::from(&snapshot.lfo),
            envelope: EnvelopeSection::from(&snapshot.envelope),
            filter: FilterSection::from(&snapshot.filter),
        }
    }

    /// Load a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let patch: Patch = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), name = %patch.name, "patch loaded");
        Ok(patch)
    }

    /// Load a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the patch to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), name = %self.name, "patch saved");
        Ok(())
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against [`PARAM_RANGES`](crate::PARAM_RANGES) and
    /// every name against its enum.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_patch(self)
    }

    /// Validate and convert to a control snapshot for the engine.
    pub fn to_snapshot(&self) -> Result<ControlSnapshot, ConfigError> {
        self.validate()?;

        let osc = &self.oscillator;
        let lfo = &self.lfo;
        let env = &self.envelope;
        let filter = &self.filter;

        Ok(ControlSnapshot {
            oscillator: OscillatorControls {
                wave_a: validation::parse_waveform("oscillator.wave_a", &osc.wave_a)?,
                wave_b: validation::parse_waveform("oscillator.wave_b", &osc.wave_b)?,
                morph: osc.morph,
                detune_cents: osc.detune_cents,
            },
            lfo: LfoControls {
                wave_a: validation::parse_waveform("lfo.wave_a", &lfo.wave_a)?,
                wave_b: validation::parse_waveform("lfo.wave_b", &lfo.wave_b)?,
                morph: lfo.morph,
                detune_cents: lfo.detune_cents,
                depth: lfo.depth,
                rate_hz: lfo.rate_hz,
            },
            envelope: EnvelopeControls {
                attack_s: env.attack_s,
                decay_s: env.decay_s,
                sustain: env.sustain,
                release_s: env.release_s,
            },
            filter: FilterControls {
                mode: validation::parse_filter_mode(&filter.mode)?,
                cutoff_hz: filter.cutoff_hz,
                resonance: filter.resonance,
            },
            output_gain: self.output_gain,
            voice_mode: validation::parse_voice_mode(&self.voice_mode)?,
        })
    }

    /// Every scalar field with its dotted name, in [`PARAM_RANGES`](crate::PARAM_RANGES) order.
    pub fn scalar_params(&self) -> [(&'static str, f32); 13] {
        [
            ("oscillator.morph", self.oscillator.morph),
            ("oscillator.detune_cents", self.oscillator.detune_cents),
            ("lfo.morph", self.lfo.morph),
            ("lfo.detune_cents", self.lfo.detune_cents),
            ("lfo.depth", self.lfo.depth),
            ("lfo.rate_hz", self.lfo.rate_hz),
            ("envelope.attack_s", self.envelope.attack_s),
            ("envelope.decay_s", self.envelope.decay_s),
            ("envelope.sustain", self.envelope.sustain),
            ("envelope.release_s", self.envelope.release_s),
            ("filter.cutoff_hz", self.filter.cutoff_hz),
            ("filter.resonance", self.filter.resonance),
            ("output_gain", self.output_gain),
        ]
    }

    pub(crate) fn waveform_names(&self) -> [(&'static str, &str); 4] {
        [
            ("oscillator.wave_a", self.oscillator.wave_a.as_str()),
            ("oscillator.wave_b", self.oscillator.wave_b.as_str()),
            ("lfo.wave_a", self.lfo.wave_a.as_str()),
            ("lfo.wave_b", self.lfo.wave_b.as_str()),
        ]
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
