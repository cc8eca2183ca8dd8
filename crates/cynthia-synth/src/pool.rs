//! Fixed-size voice pool with note allocation and voice stealing.
//!
//! ## Allocation
//!
//! - **Mono**: every note-on retriggers voice 0.
//! - **Poly**: [`VoicePool::find_free_voice`] picks the first idle voice. With
//!   no idle voice it steals the quietest voice that is not in its attack
//!   stage, so a note that was just struck is never cut off. Ties go to the
//!   lowest index. If every voice is in attack, voice 0 is taken.
//!
//! ## Note bookkeeping
//!
//! A note-off releases every voice holding that note and clears the voice's
//! note number at once. The voice keeps sounding through its release, but a
//! second note-off for the same note is a no-op and the note number is free
//! for the next note-on.

use alloc::sync::Arc;

use cynthia_core::{Filter, SvfFilter, WavetableBank, midi_to_freq};

use crate::control::{VoiceMode, VoiceParams};
use crate::voice::{Voice, VoiceState};

/// `N` voices and the allocation policy that shares them out.
///
/// # Example
///
/// ```rust
/// use cynthia_core::WavetableBank;
/// use cynthia_synth::{VoiceParams, VoicePool};
///
/// let mut pool: VoicePool<8> = VoicePool::new(WavetableBank::shared());
/// let params = VoiceParams::default();
///
/// pool.note_on(60, 100, &params);
/// pool.note_on(64, 100, &params);
/// assert_eq!(pool.active_voice_count(), 2);
///
/// let sample = pool.render_sample();
/// pool.note_off(60);
/// ```
#[derive(Debug, Clone)]
pub struct VoicePool<const N: usize, F: Filter + Default = SvfFilter> {
    voices: [Voice<F>; N],
    mode: VoiceMode,
}

impl<const N: usize, F: Filter + Default> VoicePool<N, F> {
    /// Create `N` idle voices sharing one wavetable bank.
    pub fn new(bank: Arc<WavetableBank>) -> Self {
        const { assert!(N > 0, "a voice pool needs at least one voice") };
        Self {
            voices: core::array::from_fn(|_| Voice::new(Arc::clone(&bank))),
            mode: VoiceMode::Poly,
        }
    }

    /// Set the sample rate for every voice and return them all to idle.
    pub fn prepare(&mut self, sample_rate: f32) {
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
    }

    /// Return every voice to idle.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    /// Set the allocation mode. Sounding voices are left to finish.
    pub fn set_voice_mode(&mut self, mode: VoiceMode) {
        self.mode = mode;
    }

    /// Current allocation mode.
    pub fn voice_mode(&self) -> VoiceMode {
        self.mode
    }

    /// Index of the voice the next polyphonic note-on would use.
    ///
    /// First idle voice in index order; otherwise the lowest-level voice not
    /// in attack (strictly lower wins, so ties keep the lower index);
    /// otherwise 0.
    pub fn find_free_voice(&self) -> usize {
        let mut candidate = 0;
        let mut reference = f32::INFINITY;

        for (index, voice) in self.voices.iter().enumerate() {
            if !voice.is_active() {
                return index;
            }
            if !voice.is_in_attack() && voice.level() < reference {
                reference = voice.level();
                candidate = index;
            }
        }

        candidate
    }

    /// Start `note` on an allocated voice and return its index.
    ///
    /// Any voice still holding the same note is released first, so a note
    /// number is held by at most one voice at a time.
    pub fn note_on(&mut self, note: u8, velocity: u8, params: &VoiceParams) -> usize {
        let index = match self.mode {
            VoiceMode::Mono => 0,
            VoiceMode::Poly => {
                self.note_off(note);
                self.find_free_voice()
            }
        };
        self.voices[index].start(note, velocity, midi_to_freq(note), params);
        index
    }

    /// Release every voice holding `note` and clear its note number.
    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.note() == Some(note) {
                voice.stop();
                voice.clear_note();
            }
        }
    }

    /// Release every voice holding a note.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            if voice.note().is_some() {
                voice.stop();
                voice.clear_note();
            }
        }
    }

    /// Push continuously settable parameters into every sounding voice.
    pub fn update_params(&mut self, params: &VoiceParams) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.update_params(params);
        }
    }

    /// Sum one sample from every active voice. Unclamped.
    #[inline]
    pub fn render_sample(&mut self) -> f32 {
        let mut sum = 0.0;
        for voice in &mut self.voices {
            if voice.is_active() {
                sum += voice.render();
            }
        }
        sum
    }

    /// Fully reset every voice whose envelope has fallen silent.
    pub fn reclaim_silent(&mut self) {
        for voice in &mut self.voices {
            if !voice.is_active() {
                voice.reset();
            }
        }
    }

    /// Number of voices (`N`).
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Number of voices above the silence threshold.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// State of each voice, in index order.
    pub fn voice_states(&self) -> [VoiceState; N] {
        core::array::from_fn(|i| self.voices[i].state())
    }

    /// All voices, in index order.
    pub fn voices(&self) -> &[Voice<F>; N] {
        &self.voices
    }

    /// Voice at `index`, if in range.
    pub fn voice(&self, index: usize) -> Option<&Voice<F>> {
        self.voices.get(index)
    }
}
