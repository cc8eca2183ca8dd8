//! Mathematical utility functions for synthesis.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Pitch
//!
//! - [`midi_to_freq`] - MIDI note number to Hz (A4 = 440 Hz)
//! - [`cents_to_ratio`] - Pitch offset in cents to frequency ratio
//!
//! # Envelope Timing
//!
//! - [`time_to_multiplier`] - Stage duration to one-pole recurrence coefficient
//!
//! # Utilities
//!
//! - [`lerp`] - Linear interpolation
//! - [`flush_denormal`] - Subnormal flushing for feedback paths

use libm::{expf, powf};

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
///
/// # Example
/// ```rust
/// use cynthia_core::midi_to_freq;
///
/// assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
/// assert!((midi_to_freq(81) - 880.0).abs() < 1e-2);
/// ```
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Convert a pitch offset in cents to a frequency ratio.
///
/// 100 cents = 1 semitone, 1200 cents = 1 octave: `2^(cents / 1200)`.
///
/// # Example
/// ```rust
/// use cynthia_core::cents_to_ratio;
///
/// assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-6);
/// assert!((cents_to_ratio(0.0) - 1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    powf(2.0, cents / 1200.0)
}

/// Convert a stage duration into a per-sample one-pole multiplier.
///
/// Returns `exp(-1 / (seconds * sample_rate))`, the coefficient of the
/// recurrence `level = m * (level - target) + target`. After `seconds` the
/// remaining distance to the target has shrunk to `1/e` (~37%).
///
/// Durations shorter than one sample collapse to a one-sample time constant,
/// so the result always lies in `(0, 1)`.
///
/// # Arguments
/// * `seconds` - Stage duration in seconds
/// * `sample_rate` - Sample rate in Hz
#[inline]
pub fn time_to_multiplier(seconds: f32, sample_rate: f32) -> f32 {
    let samples = seconds * sample_rate;
    expf(-1.0 / samples.max(1.0))
}

/// Linear interpolation between two values.
///
/// # Arguments
/// * `a` - Start value (at t=0)
/// * `b` - End value (at t=1)
/// * `t` - Interpolation factor (0.0 to 1.0)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Flush subnormal values to zero.
///
/// Subnormal floats cause severe CPU slowdowns on most architectures.
/// Values below 1e-20 are replaced with zero, leaving margin before the
/// IEEE 754 subnormal range begins. Used on filter integrator state, where
/// a decaying signal can approach zero indefinitely.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
