//! Single-cycle wavetables and the shared wavetable bank.
//!
//! Every oscillator in the engine reads from one immutable [`WavetableBank`]
//! holding four naive single-cycle tables of [`TABLE_SIZE`] samples:
//!
//! | Index | [`Waveform`] | Sample `i` of `N` |
//! |-------|--------------|-------------------|
//! | 0 | Sine | `sin(2π·i/N)` |
//! | 1 | Sawtooth | `2·(i/N) − 1` |
//! | 2 | Triangle | `4·|i/N − 0.5| − 1` |
//! | 3 | Square | `+1` for `i/N < 0.5`, else `−1` |
//!
//! The bank is generated once and shared behind an `Arc`, so voices never
//! allocate or regenerate tables on the audio thread.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::f64::consts::TAU;

/// Number of samples in one wavetable cycle.
pub const TABLE_SIZE: usize = 2048;

/// Waveform shapes available in the wavetable bank.
///
/// The discriminant order (sine, sawtooth, triangle, square) is the table
/// index order used by [`Waveform::from_index`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Pure sine, no harmonics.
    #[default]
    Sine,
    /// Rising ramp from -1 to +1, all harmonics.
    Sawtooth,
    /// Symmetric triangle, odd harmonics falling at 12 dB/oct.
    Triangle,
    /// 50% duty square, odd harmonics falling at 6 dB/oct.
    Square,
}

impl Waveform {
    /// All waveforms in table order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Sawtooth,
        Waveform::Triangle,
        Waveform::Square,
    ];

    /// Select a waveform by table index, clamping out-of-range indices to 3.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Table index of this waveform.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in patch files.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
        }
    }

    /// Parse a waveform name (case-insensitive). `"saw"` and `"tri"` are accepted
    /// as short forms.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("sine") || name.eq_ignore_ascii_case("sin") {
            Some(Waveform::Sine)
        } else if name.eq_ignore_ascii_case("sawtooth") || name.eq_ignore_ascii_case("saw") {
            Some(Waveform::Sawtooth)
        } else if name.eq_ignore_ascii_case("triangle") || name.eq_ignore_ascii_case("tri") {
            Some(Waveform::Triangle)
        } else if name.eq_ignore_ascii_case("square") {
            Some(Waveform::Square)
        } else {
            None
        }
    }

    /// Evaluate sample `index` of an `len`-sample cycle of this shape.
    ///
    /// Pure function of the index; every value lies in `[-1.0, 1.0]`.
    pub fn sample_at(self, index: usize, len: usize) -> f32 {
        let t = index as f32 / len as f32;
        match self {
            Waveform::Sine => libm::sin(TAU * index as f64 / len as f64) as f32,
            Waveform::Sawtooth => 2.0 * t - 1.0,
            Waveform::Triangle => 4.0 * (t - 0.5).abs() - 1.0,
            Waveform::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// One precomputed cycle of a waveform.
///
/// Immutable after generation. Read with [`Wavetable::read`], which linearly
/// interpolates between neighbouring samples and wraps at the table end.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Box<[f32]>,
}

impl Wavetable {
    /// Generate one cycle of `shape` at [`TABLE_SIZE`] samples.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cynthia_core::{Waveform, Wavetable, TABLE_SIZE};
    ///
    /// let saw = Wavetable::generate(Waveform::Sawtooth);
    /// assert_eq!(saw.len(), TABLE_SIZE);
    /// assert_eq!(saw.samples()[0], -1.0);
    /// ```
    pub fn generate(shape: Waveform) -> Self {
        let samples: Vec<f32> = (0..TABLE_SIZE)
            .map(|i| shape.sample_at(i, TABLE_SIZE))
            .collect();
        Self {
            samples: samples.into_boxed_slice(),
        }
    }

    /// Raw table samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples in the cycle.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for generated tables.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Read the table at a fractional index with linear interpolation.
    ///
    /// `phase` must lie in `[0, len)`; the upper neighbour of the last sample
    /// wraps to index 0.
    #[inline]
    pub fn read(&self, phase: f64) -> f32 {
        let len = self.samples.len();
        let index0 = (phase as usize).min(len - 1);
        let index1 = (index0 + 1) % len;
        let frac = (phase - index0 as f64) as f32;
        let s0 = self.samples[index0];
        let s1 = self.samples[index1];
        s0 + frac * (s1 - s0)
    }
}

/// The four wavetables, generated once and shared read-only by every voice.
///
/// # Example
///
/// ```rust
/// use cynthia_core::{Waveform, WavetableBank};
///
/// let bank = WavetableBank::shared();
/// let sine = bank.table(Waveform::Sine);
/// assert!(sine.read(512.0) > 0.99);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WavetableBank {
    tables: [Wavetable; 4],
}

impl Default for WavetableBank {
    fn default() -> Self {
        Self::new()
    }
}

impl WavetableBank {
    /// Generate all four tables.
    pub fn new() -> Self {
        Self {
            tables: Waveform::ALL.map(Wavetable::generate),
        }
    }

    /// Generate the bank behind an `Arc`, ready to hand to oscillators.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Table for a waveform.
    #[inline]
    pub fn table(&self, waveform: Waveform) -> &Wavetable {
        &self.tables[waveform.index()]
    }

    /// Iterate tables in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Waveform, &Wavetable)> {
        Waveform::ALL.into_iter().zip(self.tables.iter())
    }
}
