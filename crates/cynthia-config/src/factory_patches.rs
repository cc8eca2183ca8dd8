//! Factory patches bundled with the cynthia library.
//!
//! These patches are embedded at compile time and always available without
//! external files. They cover the main corners of the voice architecture and
//! serve as starting points for user patches.

use std::path::Path;

use crate::{ConfigError, Patch};

/// Array of factory patch names for external access.
pub static FACTORY_PATCH_NAMES: &[&str] = &["init", "soft_pad", "pluck", "wobble_bass", "mono_lead"];

/// TOML content for factory patches.
static FACTORY_PATCHES_TOML: &[(&str, &str)] = &[
    ("init", INIT_PATCH),
    ("soft_pad", SOFT_PAD_PATCH),
    ("pluck", PLUCK_PATCH),
    ("wobble_bass", WOBBLE_BASS_PATCH),
    ("mono_lead", MONO_LEAD_PATCH),
];

/// Initialization patch - every setting at its default.
const INIT_PATCH: &str = r#"
name = "Init"
description = "Default settings - plain sine through an open filter"
"#;

/// Slow, wide pad with a gentle tremolo.
const SOFT_PAD_PATCH: &str = r#"
name = "Soft Pad"
description = "Slow attack, detuned sine/triangle blend, gentle tremolo"
voice_mode = "poly"
output_gain = 0.25

[oscillator]
wave_a = "sine"
wave_b = "triangle"
morph = 0.4
detune_cents = 9.0

[lfo]
wave_a = "sine"
wave_b = "sine"
depth = 0.15
rate_hz = 3.0

[envelope]
attack_s = 0.6
decay_s = 1.0
sustain = 0.85
release_s = 1.5

[filter]
mode = "lowpass"
cutoff_hz = 2500.0
resonance = 0.3
"#;

/// Short percussive pluck.
const PLUCK_PATCH: &str = r#"
name = "Pluck"
description = "Fast decay to silence, bright saw through a resonant low-pass"
voice_mode = "poly"
output_gain = 0.35

[oscillator]
wave_a = "sawtooth"
wave_b = "square"
morph = 0.2
detune_cents = 3.0

[envelope]
attack_s = 0.001
decay_s = 0.15
sustain = 0.0
release_s = 0.2

[filter]
mode = "lowpass"
cutoff_hz = 3500.0
resonance = 0.7
"#;

/// Square bass with a fast amplitude wobble.
const WOBBLE_BASS_PATCH: &str = r#"
name = "Wobble Bass"
description = "Square/saw bass chopped by a deep square-wave LFO"
voice_mode = "poly"
output_gain = 0.4

[oscillator]
wave_a = "square"
wave_b = "sawtooth"
morph = 0.5
detune_cents = -5.0

[lfo]
wave_a = "square"
wave_b = "triangle"
morph = 0.3
depth = 0.8
rate_hz = 6.0

[envelope]
attack_s = 0.005
decay_s = 0.3
sustain = 0.9
release_s = 0.1

[filter]
mode = "lowpass"
cutoff_hz = 900.0
resonance = 0.6
"#;

/// Monophonic lead.
const MONO_LEAD_PATCH: &str = r#"
name = "Mono Lead"
description = "Single-voice saw lead with band-pass bite"
voice_mode = "mono"
output_gain = 0.3

[oscillator]
wave_a = "sawtooth"
wave_b = "sawtooth"
morph = 0.5
detune_cents = 14.0

[lfo]
depth = 0.05
rate_hz = 5.5

[envelope]
attack_s = 0.01
decay_s = 0.2
sustain = 0.7
release_s = 0.25

[filter]
mode = "bandpass"
cutoff_hz = 1800.0
resonance = 0.4
"#;

/// Get all factory patches.
///
/// # Example
///
/// ```rust
/// use cynthia_config::factory_patches;
///
/// for patch in &factory_patches() {
///     println!("  - {}: {}", patch.name, patch.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_patches() -> Vec<Patch> {
    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(_, toml)| Patch::from_toml(toml).ok())
        .collect()
}

/// Get a factory patch by name.
///
/// Matches the internal identifier (`"soft_pad"`) or the display name
/// (`"Soft Pad"`), case-insensitively.
///
/// # Example
///
/// ```rust
/// use cynthia_config::get_factory_patch;
///
/// let patch = get_factory_patch("pluck").expect("factory patch");
/// assert_eq!(patch.name, "Pluck");
/// ```
pub fn get_factory_patch(name: &str) -> Option<Patch> {
    let name = name.trim();

    if let Some((_, toml)) = FACTORY_PATCHES_TOML
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(name))
    {
        return Patch::from_toml(toml).ok();
    }

    factory_patches()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Get the names of all factory patches.
pub fn factory_patch_names() -> Vec<&'static str> {
    FACTORY_PATCHES_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name refers to a factory patch (case-insensitive).
///
/// # Example
///
/// ```rust
/// use cynthia_config::is_factory_patch;
///
/// assert!(is_factory_patch("wobble_bass"));
/// assert!(is_factory_patch("Wobble Bass"));
/// assert!(!is_factory_patch("my_custom_patch"));
/// ```
pub fn is_factory_patch(name: &str) -> bool {
    get_factory_patch(name).is_some()
}

/// Resolve a factory patch name or a path to a patch file.
///
/// Factory names take precedence. Anything else is treated as a path.
pub fn find_patch(name_or_path: &str) -> Result<Patch, ConfigError> {
    if let Some(patch) = get_factory_patch(name_or_path) {
        return Ok(patch);
    }

    let path = Path::new(name_or_path);
    if path.is_file() {
        Patch::load(path)
    } else {
        Err(ConfigError::PatchNotFound(name_or_path.to_string()))
    }
}
