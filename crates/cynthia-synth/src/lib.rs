//! Cynthia Synth - Polyphonic engine for the cynthia wavetable synthesizer
//!
//! This crate turns the DSP primitives of `cynthia-core` into a playable
//! instrument: voices, a fixed voice pool with stealing, MIDI dispatch, and a
//! block renderer with sample-accurate event timing and an output guard.
//!
//! # Core Components
//!
//! ## Voices
//!
//! - [`Voice`] - Oscillator, LFO, envelope and filter for one note
//! - [`VoicePool`] - Fixed array of voices with allocation and stealing
//! - [`VoiceState`] - Idle / Active / Releasing
//!
//! ## MIDI
//!
//! - [`MidiEvent`] - Raw three-byte message with a frame offset
//! - [`MidiMessage`] - Decoded note-on / note-off
//!
//! ```rust
//! use cynthia_synth::MidiMessage;
//!
//! assert_eq!(
//!     MidiMessage::decode(0x91, 60, 100),
//!     MidiMessage::NoteOn { note: 60, velocity: 100 },
//! );
//! ```
//!
//! ## Rendering
//!
//! - [`SynthEngine`] - Block processing, event splitting, control polling
//! - [`protect_block`] - Output guard against NaN, infinity and runaway levels
//!
//! ## Controls
//!
//! - [`ControlSnapshot`] - Every setting in one typed, `Copy` struct
//! - [`ControlMailbox`] - Lock-free handoff from the control thread (`std` only)
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Without `std` there
//! is no [`ControlMailbox`]; apply snapshots directly with
//! [`SynthEngine::apply_snapshot`].
//!
//! ```toml
//! [dependencies]
//! cynthia-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example: Playing a Chord
//!
//! ```rust
//! use cynthia_synth::{ControlSnapshot, MidiEvent, SynthEngine};
//! use cynthia_core::Waveform;
//!
//! let mut engine: SynthEngine<8> = SynthEngine::new();
//! engine.prepare(48000.0, 512);
//!
//! let mut controls = ControlSnapshot::default();
//! controls.oscillator.wave_b = Waveform::Square;
//! controls.oscillator.morph = 0.5;
//! controls.oscillator.detune_cents = 12.0;
//! engine.apply_snapshot(&controls);
//!
//! let chord = [
//!     MidiEvent::note_on(60, 100, 0),
//!     MidiEvent::note_on(64, 100, 0),
//!     MidiEvent::note_on(67, 100, 0),
//! ];
//!
//! let mut mono = vec![0.0f32; 512];
//! let mut output: [&mut [f32]; 1] = [&mut mono];
//! engine.process_block(&mut output, &chord);
//!
//! assert_eq!(engine.active_voice_count(), 3);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod control;
pub mod engine;
#[cfg(feature = "std")]
pub mod mailbox;
pub mod midi;
pub mod pool;
pub mod render;
pub mod voice;

pub use control::{
    ControlSnapshot, EnvelopeControls, FilterControls, LfoControls, MAX_CUTOFF_HZ,
    MAX_ENVELOPE_TIME, MAX_RESONANCE, MIN_CUTOFF_HZ, MIN_RESONANCE, NYQUIST_FRACTION,
    OscillatorControls, VoiceMode, VoiceParams,
};
pub use engine::{DEFAULT_SAMPLE_RATE, SynthEngine};
#[cfg(feature = "std")]
pub use mailbox::ControlMailbox;
pub use midi::{MidiEvent, MidiMessage, NOTE_OFF, NOTE_ON, dispatch};
pub use pool::VoicePool;
pub use render::{
    Anomaly, GUARD_LIMIT, GuardOutcome, protect_block, protect_channels, render_segment,
};
pub use voice::{Voice, VoiceState};
