//! Patch files and validation for the cynthia wavetable synthesizer.
//!
//! The engine in `cynthia-synth` takes typed [`ControlSnapshot`]s and never
//! fails. This crate is the boundary where fallible input lives: TOML patch
//! files are parsed here, checked against a single parameter range table, and
//! only then turned into snapshots.
//!
//! # Features
//!
//! - **Patches**: Load and save synth settings as TOML
//! - **Validation**: Range checks for every scalar, name checks for every enum
//! - **Factory Patches**: Built-in starting points, always available
//!
//! # Example
//!
//! ```rust,no_run
//! use cynthia_config::{Patch, find_patch};
//! use cynthia_synth::SynthEngine;
//!
//! // A factory patch by name, or a patch file by path
//! let patch = find_patch("soft_pad").unwrap();
//! let custom = Patch::load("my_patch.toml").unwrap();
//!
//! // Validate once, then hand the snapshot to the engine
//! let snapshot = patch.to_snapshot().unwrap();
//! let mut engine: SynthEngine<8> = SynthEngine::new();
//! engine.prepare(48000.0, 512);
//! engine.apply_snapshot(&snapshot);
//!
//! // Save a tweaked copy
//! let mut tweaked = snapshot;
//! tweaked.filter.cutoff_hz = 1200.0;
//! Patch::from_snapshot("Darker Pad", &tweaked)
//!     .save("patches/darker_pad.toml")
//!     .unwrap();
//! ```
//!
//! [`ControlSnapshot`]: cynthia_synth::ControlSnapshot

mod error;
mod patch;

/// Parameter ranges and patch validation.
pub mod validation;

/// Factory patches bundled with the library.
pub mod factory_patches;

pub use error::ConfigError;
pub use factory_patches::{
    FACTORY_PATCH_NAMES, factory_patch_names, factory_patches, find_patch, get_factory_patch,
    is_factory_patch,
};
pub use patch::{EnvelopeSection, FilterSection, LfoSection, OscillatorSection, Patch};
pub use validation::{
    PARAM_RANGES, ParamRange, ValidationError, ValidationResult, param_range, parse_filter_mode,
    parse_voice_mode, parse_waveform, validate_param, validate_patch,
};
