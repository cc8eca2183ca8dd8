//! Block rendering and the output safety guard.
//!
//! [`render_segment`] pulls one sample per frame from the voice pool, clamps
//! the mix to `[-1, 1]` and writes it to every output channel.
//!
//! [`protect_block`] is the last line of defence before samples leave the
//! engine. It scans a rendered buffer and contains numerical failures:
//!
//! | Sample | Action |
//! |--------|--------|
//! | NaN or infinite | silence the whole buffer |
//! | `abs(x) > GUARD_LIMIT` | silence the whole buffer |
//! | `1.0 < abs(x) <= GUARD_LIMIT` | hard-clamp to ±1 |
//!
//! Nothing is reported upward as an error; the [`GuardOutcome`] is returned
//! for inspection and logging only.

use cynthia_core::Filter;

use crate::pool::VoicePool;

/// Magnitude above which a block is treated as runaway and silenced.
pub const GUARD_LIMIT: f32 = 2.0;

/// Kind of numerical failure that silenced a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// A NaN sample.
    NotANumber,
    /// An infinite sample.
    Infinite,
    /// A finite sample beyond [`GUARD_LIMIT`].
    OutOfRange,
}

/// What [`protect_block`] did to a buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Every sample was in `[-1, 1]`.
    #[default]
    Clean,
    /// This many borderline samples were hard-clamped.
    Clamped(usize),
    /// The buffer was zeroed because of the first anomaly found.
    Silenced(Anomaly),
}

impl GuardOutcome {
    /// Whether the buffer was zeroed.
    pub fn is_silenced(self) -> bool {
        matches!(self, GuardOutcome::Silenced(_))
    }

    /// Combine the outcomes of two buffers of one block.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (GuardOutcome::Silenced(a), _) => GuardOutcome::Silenced(a),
            (_, GuardOutcome::Silenced(b)) => GuardOutcome::Silenced(b),
            (GuardOutcome::Clamped(a), GuardOutcome::Clamped(b)) => GuardOutcome::Clamped(a + b),
            (GuardOutcome::Clamped(n), GuardOutcome::Clean)
            | (GuardOutcome::Clean, GuardOutcome::Clamped(n)) => GuardOutcome::Clamped(n),
            (GuardOutcome::Clean, GuardOutcome::Clean) => GuardOutcome::Clean,
        }
    }
}

/// Scan `samples`, clamping borderline values and silencing on anomalies.
///
/// # Example
///
/// ```rust
/// use cynthia_synth::{Anomaly, GuardOutcome, protect_block};
///
/// let mut block = [0.5, 1.5, -0.2];
/// assert_eq!(protect_block(&mut block), GuardOutcome::Clamped(1));
/// assert_eq!(block, [0.5, 1.0, -0.2]);
///
/// let mut block = [0.5, f32::NAN, -0.2];
/// assert_eq!(protect_block(&mut block), GuardOutcome::Silenced(Anomaly::NotANumber));
/// assert_eq!(block, [0.0; 3]);
/// ```
pub fn protect_block(samples: &mut [f32]) -> GuardOutcome {
    let mut clamped = 0;

    for i in 0..samples.len() {
        let x = samples[i];
        let anomaly = if x.is_nan() {
            Some(Anomaly::NotANumber)
        } else if x.is_infinite() {
            Some(Anomaly::Infinite)
        } else if x.abs() > GUARD_LIMIT {
            Some(Anomaly::OutOfRange)
        } else {
            None
        };

        if let Some(anomaly) = anomaly {
            samples.fill(0.0);
            return GuardOutcome::Silenced(anomaly);
        }

        if x.abs() > 1.0 {
            samples[i] = x.clamp(-1.0, 1.0);
            clamped += 1;
        }
    }

    if clamped > 0 {
        GuardOutcome::Clamped(clamped)
    } else {
        GuardOutcome::Clean
    }
}

/// Guard frames `start..end` of every channel as one block.
///
/// If any channel holds an anomaly, the range is silenced on all channels.
/// Ranges are truncated to each channel's length.
pub fn protect_channels(channels: &mut [&mut [f32]], start: usize, end: usize) -> GuardOutcome {
    let mut outcome = GuardOutcome::Clean;

    for channel in channels.iter_mut() {
        let end = end.min(channel.len());
        let start = start.min(end);
        outcome = outcome.merge(protect_block(&mut channel[start..end]));
        if outcome.is_silenced() {
            break;
        }
    }

    if outcome.is_silenced() {
        for channel in channels.iter_mut() {
            let end = end.min(channel.len());
            let start = start.min(end);
            channel[start..end].fill(0.0);
        }
    }

    outcome
}

/// Render `frame_count` frames starting at `start` into every channel.
///
/// Each frame is the sum of all active voices, clamped to `[-1, 1]` and
/// written to every channel. Frames beyond the shortest channel are not
/// rendered. Afterwards every voice that has fallen silent is reset.
pub fn render_segment<const N: usize, F: Filter + Default>(
    pool: &mut VoicePool<N, F>,
    channels: &mut [&mut [f32]],
    start: usize,
    frame_count: usize,
) {
    let available = channels.iter().map(|c| c.len()).min().unwrap_or(0);
    let end = start.saturating_add(frame_count).min(available);

    for frame in start..end {
        let output = pool.render_sample().clamp(-1.0, 1.0);
        for channel in channels.iter_mut() {
            channel[frame] = output;
        }
    }

    pool.reclaim_silent();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::VoiceParams;
    use cynthia_core::WavetableBank;

    #[test]
    fn test_clean_block_untouched() {
        let mut block = [0.0, 0.5, -1.0, 1.0];
        assert_eq!(protect_block(&mut block), GuardOutcome::Clean);
        assert_eq!(block, [0.0, 0.5, -1.0, 1.0]);
    }

    #[test]
    fn test_borderline_values_clamped() {
        let mut block = [1.2, -2.0, 0.3, 2.0];
        assert_eq!(protect_block(&mut block), GuardOutcome::Clamped(3));
        assert_eq!(block, [1.0, -1.0, 0.3, 1.0]);
    }

    #[test]
    fn test_anomalies_silence() {
        let cases = [
            (f32::NAN, Anomaly::NotANumber),
            (f32::INFINITY, Anomaly::Infinite),
            (f32::NEG_INFINITY, Anomaly::Infinite),
            (2.5, Anomaly::OutOfRange),
            (-1000.0, Anomaly::OutOfRange),
        ];
        for (bad, anomaly) in cases {
            let mut block = [0.1, 1.5, bad, 0.2];
            assert_eq!(protect_block(&mut block), GuardOutcome::Silenced(anomaly));
            assert!(block.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_empty_block_clean() {
        let mut block: [f32; 0] = [];
        assert_eq!(protect_block(&mut block), GuardOutcome::Clean);
    }

    #[test]
    fn test_outcome_merge() {
        use GuardOutcome::*;
        assert_eq!(Clean.merge(Clean), Clean);
        assert_eq!(Clean.merge(Clamped(2)), Clamped(2));
        assert_eq!(Clamped(1).merge(Clamped(2)), Clamped(3));
        assert_eq!(
            Clamped(1).merge(Silenced(Anomaly::Infinite)),
            Silenced(Anomaly::Infinite)
        );
    }

    #[test]
    fn test_protect_channels_silences_all() {
        let mut left = [0.1f32, 0.2, 0.3, 0.4];
        let mut right = [0.1f32, f32::NAN, 0.3, 0.4];
        let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
        let outcome = protect_channels(&mut channels, 1, 3);
        assert_eq!(outcome, GuardOutcome::Silenced(Anomaly::NotANumber));
        assert_eq!(left, [0.1, 0.0, 0.0, 0.4]);
        assert_eq!(right, [0.1, 0.0, 0.0, 0.4]);
    }

    #[test]
    fn test_render_segment_writes_all_channels() {
        let mut pool: VoicePool<4> = VoicePool::new(WavetableBank::shared());
        pool.note_on(69, 127, &VoiceParams::default());

        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        {
            let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
            render_segment(&mut pool, &mut channels, 64, 128);
        }
        assert!(left[..64].iter().all(|&s| s == 0.0));
        assert!(left[192..].iter().all(|&s| s == 0.0));
        assert!(left[64..192].iter().any(|&s| s != 0.0));
        assert_eq!(left, right);
        assert!(left.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_render_segment_truncates_to_buffer() {
        let mut pool: VoicePool<2> = VoicePool::new(WavetableBank::shared());
        pool.note_on(60, 100, &VoiceParams::default());
        let mut mono = vec![0.0f32; 32];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        render_segment(&mut pool, &mut channels, 16, 1000);
        render_segment(&mut pool, &mut channels, 100, 10);
    }

    #[test]
    fn test_render_segment_clamps_mix() {
        let mut s = crate::control::ControlSnapshot::new();
        s.output_gain = 1.0;
        s.oscillator.wave_a = cynthia_core::Waveform::Square;
        s.envelope.attack_s = 0.0;
        s.envelope.sustain = 1.0;
        let params = VoiceParams::from_snapshot(&s, 48000.0);

        let mut pool: VoicePool<8> = VoicePool::new(WavetableBank::shared());
        for note in [48, 52, 55, 60, 64, 67, 72, 76] {
            pool.note_on(note, 127, &params);
        }
        let mut mono = vec![0.0f32; 2048];
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        render_segment(&mut pool, &mut channels, 0, 2048);
        assert!(mono.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(mono.iter().any(|s| s.abs() == 1.0), "eight full-scale voices should hit the clamp");
    }
}
