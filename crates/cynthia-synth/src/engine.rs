//! Block-level synthesis engine.
//!
//! [`SynthEngine`] is the surface a host drives from its audio callback. One
//! call to [`SynthEngine::process_block`] does the whole job for one buffer:
//!
//! 1. Clear the output.
//! 2. Poll the control mailbox once and apply a fresh snapshot, if any.
//! 3. Walk the block's MIDI events in order. Render up to each event's
//!    offset, then apply the event, so note-on and note-off land on the exact
//!    frame.
//! 4. Render the remainder.
//! 5. Run the safety guard over the whole block.
//!
//! Nothing in this path allocates, locks or blocks.
//!
//! # Event offsets
//!
//! - Offsets at or beyond the block length are applied after the block has
//!   been rendered.
//! - An offset earlier than the current render position (events out of
//!   order) is applied at the current position.

use alloc::sync::Arc;

use cynthia_core::{Filter, SvfFilter, WavetableBank};

use crate::control::{ControlSnapshot, VoiceMode, VoiceParams};
#[cfg(feature = "std")]
use crate::mailbox::ControlMailbox;
use crate::midi::{self, MidiEvent, MidiMessage};
use crate::pool::VoicePool;
use crate::render::{GuardOutcome, protect_channels, render_segment};
use crate::voice::VoiceState;

/// Default sample rate before [`SynthEngine::prepare`] is called.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// Polyphonic wavetable synthesizer with `N` voices.
///
/// # Example
///
/// ```rust
/// use cynthia_synth::{MidiEvent, SynthEngine};
///
/// let mut engine: SynthEngine<8> = SynthEngine::new();
/// engine.prepare(48000.0, 256);
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// let events = [MidiEvent::note_on(60, 100, 0), MidiEvent::note_on(64, 100, 128)];
///
/// let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
/// engine.process_block(&mut channels, &events);
///
/// assert_eq!(engine.active_voice_count(), 2);
/// assert!(left.iter().all(|s| s.is_finite()));
/// ```
#[derive(Debug)]
pub struct SynthEngine<const N: usize, F: Filter + Default = SvfFilter> {
    pool: VoicePool<N, F>,
    snapshot: ControlSnapshot,
    params: VoiceParams,
    sample_rate: f32,
    max_block_size: usize,
    last_guard: GuardOutcome,
    #[cfg(feature = "std")]
    mailbox: Option<Arc<ControlMailbox>>,
}

impl<const N: usize, F: Filter + Default> Default for SynthEngine<N, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, F: Filter + Default> SynthEngine<N, F> {
    /// Create an engine with its own wavetable bank and default controls.
    pub fn new() -> Self {
        Self::with_bank(WavetableBank::shared())
    }

    /// Create an engine reading from an existing wavetable bank.
    pub fn with_bank(bank: Arc<WavetableBank>) -> Self {
        let snapshot = ControlSnapshot::default();
        Self {
            pool: VoicePool::new(bank),
            snapshot,
            params: VoiceParams::from_snapshot(&snapshot, DEFAULT_SAMPLE_RATE),
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: 0,
            last_guard: GuardOutcome::Clean,
            #[cfg(feature = "std")]
            mailbox: None,
        }
    }

    /// Configure for a sample rate and maximum block size.
    ///
    /// Re-resolves the current snapshot for the new rate and returns every
    /// voice to idle. Call before the first block and whenever the host
    /// changes its stream settings.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.params = VoiceParams::from_snapshot(&self.snapshot, sample_rate);
        self.pool.prepare(sample_rate);
        self.last_guard = GuardOutcome::Clean;

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, max_block_size, voices = N, "engine prepared");
    }

    /// Silence every voice immediately.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.last_guard = GuardOutcome::Clean;

        #[cfg(feature = "tracing")]
        tracing::debug!("engine reset");
    }

    /// Sanitize and apply a control snapshot.
    ///
    /// Voice mode and armed parameters change at once. Filter, oscillator and
    /// LFO settings are also pushed into every sounding voice; envelope and
    /// gain changes reach only notes started afterwards.
    pub fn apply_snapshot(&mut self, snapshot: &ControlSnapshot) {
        self.snapshot = snapshot.sanitized();
        self.params = VoiceParams::from_snapshot(&self.snapshot, self.sample_rate);
        self.pool.set_voice_mode(self.snapshot.voice_mode);
        self.pool.update_params(&self.params);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            voice_mode = self.snapshot.voice_mode.name(),
            cutoff_hz = self.params.filter.cutoff_hz,
            "control snapshot applied"
        );
    }

    /// Decode and apply one raw MIDI message at the current position.
    pub fn handle_event(&mut self, status: u8, data1: u8, data2: u8) -> MidiMessage {
        midi::dispatch(&mut self.pool, status, data1, data2, &self.params)
    }

    /// Render `frame_count` frames at `start_offset` into every channel and
    /// guard that range.
    ///
    /// Frames already in the buffer outside the range are left untouched.
    pub fn render_block(
        &mut self,
        output: &mut [&mut [f32]],
        frame_count: usize,
        start_offset: usize,
    ) -> GuardOutcome {
        render_segment(&mut self.pool, output, start_offset, frame_count);
        let end = start_offset.saturating_add(frame_count);
        let outcome = protect_channels(output, start_offset, end);
        self.record_guard(outcome);
        outcome
    }

    /// Render one complete block, applying `events` at their frame offsets.
    ///
    /// `events` must be sorted by offset for sample-accurate timing; see the
    /// module docs for how stray offsets are handled.
    pub fn process_block(
        &mut self,
        output: &mut [&mut [f32]],
        events: &[MidiEvent],
    ) -> GuardOutcome {
        for channel in output.iter_mut() {
            channel.fill(0.0);
        }

        self.poll_controls();

        let len = output.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut position = 0;

        for event in events {
            let at = event.offset.clamp(position, len);
            if at > position {
                render_segment(&mut self.pool, output, position, at - position);
                position = at;
            }
            self.handle_event(event.status, event.data1, event.data2);
        }

        if position < len {
            render_segment(&mut self.pool, output, position, len - position);
        }

        let outcome = protect_channels(output, 0, len);
        self.record_guard(outcome);
        outcome
    }

    /// Poll the connected mailbox and apply a fresh snapshot, if any.
    ///
    /// Returns whether a snapshot was applied. Without the `std` feature
    /// there is no mailbox and this always returns `false`.
    pub fn poll_controls(&mut self) -> bool {
        #[cfg(feature = "std")]
        {
            let fresh = self.mailbox.as_ref().and_then(|m| m.take());
            if let Some(snapshot) = fresh {
                self.apply_snapshot(&snapshot);
                return true;
            }
        }
        false
    }

    /// Receive control snapshots from `mailbox` at the start of every block.
    #[cfg(feature = "std")]
    pub fn connect(&mut self, mailbox: Arc<ControlMailbox>) {
        self.mailbox = Some(mailbox);
    }

    /// Stop polling the connected mailbox.
    #[cfg(feature = "std")]
    pub fn disconnect(&mut self) -> Option<Arc<ControlMailbox>> {
        self.mailbox.take()
    }

    fn record_guard(&mut self, outcome: GuardOutcome) {
        #[cfg(feature = "tracing")]
        if let GuardOutcome::Silenced(anomaly) = outcome {
            tracing::warn!(?anomaly, "output guard silenced block");
        }
        self.last_guard = outcome;
    }

    /// Number of voices above the silence threshold.
    pub fn active_voice_count(&self) -> usize {
        self.pool.active_voice_count()
    }

    /// State of every voice, in pool order.
    pub fn voice_states(&self) -> [VoiceState; N] {
        self.pool.voice_states()
    }

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Largest block size announced by [`prepare`](Self::prepare).
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Applied (sanitized) control snapshot.
    pub fn snapshot(&self) -> &ControlSnapshot {
        &self.snapshot
    }

    /// Parameters handed to the next note-on.
    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    /// Allocation mode.
    pub fn voice_mode(&self) -> VoiceMode {
        self.pool.voice_mode()
    }

    /// Outcome of the most recent guard pass.
    pub fn last_guard_outcome(&self) -> GuardOutcome {
        self.last_guard
    }

    /// Voice pool, for inspection.
    pub fn pool(&self) -> &VoicePool<N, F> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiEvent;

    fn engine<const N: usize>() -> SynthEngine<N> {
        let mut e = SynthEngine::new();
        e.prepare(48000.0, 512);
        e
    }

    fn first_nonzero(buffer: &[f32]) -> Option<usize> {
        buffer.iter().position(|&s| s != 0.0)
    }

    #[test]
    fn test_silent_without_notes() {
        let mut e = engine::<4>();
        let mut mono = vec![1.0f32; 256];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        assert_eq!(e.process_block(&mut channels, &[]), GuardOutcome::Clean);
        assert!(mono.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_note_on_lands_on_its_frame() {
        let mut e = engine::<4>();
        let mut mono = vec![0.0f32; 256];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        e.process_block(&mut channels, &[MidiEvent::note_on(69, 127, 100)]);

        // Sine starts at phase zero, so the first sounding frame is 101.
        assert!(mono[..=100].iter().all(|&s| s == 0.0));
        assert_eq!(first_nonzero(&mono), Some(101));
    }

    #[test]
    fn test_note_off_lands_on_its_frame() {
        let mut s = ControlSnapshot::default();
        s.envelope.release_s = 0.0;
        s.envelope.attack_s = 0.0;
        s.oscillator.wave_a = cynthia_core::Waveform::Square;
        s.filter.cutoff_hz = 20_000.0;

        let mut e = engine::<4>();
        e.apply_snapshot(&s);
        let mut mono = vec![0.0f32; 512];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        e.process_block(
            &mut channels,
            &[MidiEvent::note_on(60, 127, 0), MidiEvent::note_off(60, 300)],
        );

        // Release with a one-sample time constant is inaudible within ~10 frames.
        assert!(mono[200..300].iter().any(|s| s.abs() > 0.05));
        assert!(mono[320..].iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn test_late_events_apply_after_block() {
        let mut e = engine::<4>();
        let mut mono = vec![0.0f32; 128];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        e.process_block(&mut channels, &[MidiEvent::note_on(60, 100, 500)]);
        assert!(mono.iter().all(|&s| s == 0.0));
        assert_eq!(e.active_voice_count(), 1);
    }

    #[test]
    fn test_out_of_order_events_apply_at_position() {
        let mut e = engine::<4>();
        let mut mono = vec![0.0f32; 256];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        e.process_block(
            &mut channels,
            &[MidiEvent::note_on(69, 100, 128), MidiEvent::note_on(76, 100, 10)],
        );
        // Both notes start at frame 128.
        assert!(mono[..=128].iter().all(|&s| s == 0.0));
        assert_eq!(e.active_voice_count(), 2);
    }

    #[test]
    fn test_render_block_respects_offset() {
        let mut e = engine::<4>();
        e.handle_event(0x90, 69, 100);
        let mut mono = vec![0.5f32; 256];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        e.render_block(&mut channels, 64, 32);
        assert!(mono[..32].iter().all(|&s| s == 0.5));
        assert!(mono[96..].iter().all(|&s| s == 0.5));
        assert!(mono[33..96].iter().any(|&s| s != 0.5));
    }

    #[test]
    fn test_apply_snapshot_updates_sounding_voices() {
        let mut e = engine::<4>();
        e.handle_event(0x90, 60, 100);
        let mut s = ControlSnapshot::default();
        s.oscillator.morph = 0.9;
        s.filter.cutoff_hz = 1500.0;
        s.envelope.attack_s = 1.0;
        e.apply_snapshot(&s);

        let voice = &e.pool().voices()[0];
        assert_eq!(voice.oscillator().morph(), 0.9);
        assert_eq!(voice.filter().cutoff(), 1500.0);
        // Envelope shape is only armed for the next note.
        assert_ne!(voice.envelope().coefficients(), e.params().envelope);
    }

    #[test]
    fn test_apply_snapshot_sanitizes() {
        let mut e = engine::<2>();
        let mut s = ControlSnapshot::default();
        s.filter.cutoff_hz = 40_000.0;
        s.output_gain = f32::NAN;
        e.apply_snapshot(&s);
        assert_eq!(e.snapshot().filter.cutoff_hz, 20_000.0);
        assert_eq!(e.snapshot().output_gain, ControlSnapshot::DEFAULT_OUTPUT_GAIN);
        assert_eq!(e.params().filter.cutoff_hz, 20_000.0);
    }

    #[test]
    fn test_prepare_rescales_params() {
        let mut e = engine::<2>();
        e.prepare(22050.0, 128);
        assert_eq!(e.sample_rate(), 22050.0);
        assert_eq!(e.max_block_size(), 128);
        assert!(e.params().filter.cutoff_hz <= 22050.0 * 0.49);
    }

    #[test]
    fn test_mono_mode_from_snapshot() {
        let mut e = engine::<4>();
        let mut s = ControlSnapshot::default();
        s.voice_mode = VoiceMode::Mono;
        e.apply_snapshot(&s);
        assert_eq!(e.voice_mode(), VoiceMode::Mono);
        e.handle_event(0x90, 60, 100);
        e.handle_event(0x90, 67, 100);
        assert_eq!(e.active_voice_count(), 1);
        assert_eq!(e.pool().voices()[0].note(), Some(67));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_mailbox_polled_once_per_block() {
        let mut e = engine::<4>();
        let mailbox = Arc::new(ControlMailbox::default());
        e.connect(Arc::clone(&mailbox));

        let mut s = ControlSnapshot::default();
        s.output_gain = 0.7;
        mailbox.publish(s);
        assert_eq!(e.snapshot().output_gain, 0.3);

        let mut mono = vec![0.0f32; 64];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        e.process_block(&mut channels, &[]);
        assert_eq!(e.snapshot().output_gain, 0.7);
        assert!(!mailbox.is_dirty());

        assert!(e.disconnect().is_some());
        mailbox.publish(ControlSnapshot::default());
        e.process_block(&mut channels, &[]);
        assert_eq!(e.snapshot().output_gain, 0.7);
    }

    #[test]
    fn test_reset_silences() {
        let mut e = engine::<4>();
        e.handle_event(0x90, 60, 100);
        e.handle_event(0x90, 64, 100);
        e.reset();
        assert_eq!(e.active_voice_count(), 0);
        assert!(e.voice_states().iter().all(|&s| s == VoiceState::Idle));
    }
}
