//! Cynthia Core - DSP primitives for a polyphonic wavetable synthesizer
//!
//! This crate holds the per-sample building blocks every voice is made of.
//! Nothing here allocates on the audio path; the only allocation is the
//! one-time generation of the shared wavetable bank.
//!
//! # Components
//!
//! ## Wavetables
//!
//! - [`WavetableBank`] - Four single-cycle tables (sine, sawtooth, triangle, square)
//! - [`Wavetable`] - One table with wrapping linear-interpolated reads
//! - [`Waveform`] - Table selector
//!
//! ## Oscillators
//!
//! - [`MorphingOscillator`] - Two detunable wavetable sources cross-faded by a morph value
//! - [`MorphingLfo`] - The same mechanism at 1-500 Hz, scaled by a depth
//!
//! ## Envelope
//!
//! - [`Envelope`] - One-pole ADSR with an overshooting attack
//! - [`EnvelopeCoefficients`] - Multipliers derived from stage times
//!
//! ## Filters
//!
//! - [`Filter`] - Per-voice filter capability
//! - [`SvfFilter`] - TPT state-variable filter (low-pass, high-pass, band-pass)
//!
//! ## Utilities
//!
//! - Pitch: [`midi_to_freq`], [`cents_to_ratio`], [`detune_ratios`]
//! - Envelope timing: [`time_to_multiplier`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for the wavetable bank).
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cynthia-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use cynthia_core::{
//!     Envelope, EnvelopeCoefficients, Filter, MorphingOscillator, SvfFilter, Waveform,
//!     WavetableBank, midi_to_freq,
//! };
//!
//! let sample_rate = 48000.0;
//! let bank = WavetableBank::shared();
//!
//! let mut osc = MorphingOscillator::new(bank);
//! osc.prepare(midi_to_freq(57), sample_rate);
//! osc.set_waveforms(Waveform::Sawtooth, Waveform::Square);
//! osc.set_morph(0.3);
//!
//! let mut filter = SvfFilter::new(sample_rate);
//! filter.set_cutoff(2500.0);
//!
//! let mut env = Envelope::new();
//! env.set_coefficients(EnvelopeCoefficients::from_times(0.01, 0.2, 0.7, 0.4, sample_rate));
//! env.attack();
//!
//! let block: Vec<f32> = (0..256)
//!     .map(|_| filter.process_sample(osc.next_sample()) * env.next_value())
//!     .collect();
//! assert!(block.iter().all(|s| s.is_finite()));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod envelope;
pub mod filter;
pub mod lfo;
pub mod math;
pub mod oscillator;
pub mod wavetable;

// Re-export main types at crate root
pub use envelope::{
    ATTACK_TARGET, DECAY_GUARD, Envelope, EnvelopeCoefficients, EnvelopeStage, SILENCE_THRESHOLD,
};
pub use filter::{Filter, FilterMode, SvfFilter, SvfOutputs};
pub use lfo::{MAX_LFO_RATE, MIN_LFO_RATE, MorphingLfo};
pub use math::{cents_to_ratio, flush_denormal, lerp, midi_to_freq, time_to_multiplier};
pub use oscillator::{MAX_DETUNE_CENTS, MorphingOscillator, detune_ratios};
pub use wavetable::{TABLE_SIZE, Waveform, Wavetable, WavetableBank};
