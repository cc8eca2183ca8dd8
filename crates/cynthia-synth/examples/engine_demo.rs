//! Engine demo: a chord through the block engine with live control changes.
//!
//! Run with: cargo run -p cynthia-synth --example engine_demo --features tracing
//!
//! Set `RUST_LOG=debug` to see the engine's own prepare / snapshot events.

use std::sync::Arc;

use cynthia_core::{FilterMode, Waveform};
use cynthia_synth::{ControlMailbox, ControlSnapshot, MidiEvent, SynthEngine, VoiceMode};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK: usize = 480;

fn rms(block: &[f32]) -> f32 {
    (block.iter().map(|s| s * s).sum::<f32>() / block.len() as f32).sqrt()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut engine: SynthEngine<8> = SynthEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK);

    let mailbox = Arc::new(ControlMailbox::default());
    engine.connect(Arc::clone(&mailbox));

    let mut controls = ControlSnapshot::default();
    controls.oscillator.wave_b = Waveform::Sawtooth;
    controls.oscillator.morph = 0.3;
    controls.oscillator.detune_cents = 8.0;
    controls.lfo.depth = 0.2;
    controls.lfo.rate_hz = 4.0;
    controls.envelope.release_s = 0.2;
    mailbox.publish(controls);

    let mut left = vec![0.0f32; BLOCK];
    let mut right = vec![0.0f32; BLOCK];

    // 10 ms blocks: chord at 0, filter sweep while held, release at block 30.
    println!("Block | Time (ms) | Voices | RMS     | Guard");
    println!("------+-----------+--------+---------+-----------");

    for block in 0..60usize {
        let events: Vec<MidiEvent> = match block {
            0 => [60, 64, 67]
                .into_iter()
                .enumerate()
                .map(|(i, n)| MidiEvent::note_on(n, 100, i * 120))
                .collect(),
            30 => [60, 64, 67]
                .into_iter()
                .map(|n| MidiEvent::note_off(n, 0))
                .collect(),
            _ => Vec::new(),
        };

        if (5..30).contains(&block) {
            controls.filter.cutoff_hz = 400.0 + block as f32 * 300.0;
            mailbox.publish(controls);
        }
        if block == 20 {
            controls.filter.mode = FilterMode::BandPass;
            mailbox.publish(controls);
            tracing::info!(mode = controls.filter.mode.name(), "filter mode switched");
        }

        let outcome = {
            let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
            engine.process_block(&mut channels, &events)
        };

        if block % 5 == 0 {
            println!(
                "{:>5} | {:>9} | {:>6} | {:>7.4} | {:?}",
                block,
                block * 10,
                engine.active_voice_count(),
                rms(&left),
                outcome
            );
        }
    }

    tracing::info!(active = engine.active_voice_count(), "chord released");

    // Mono mode: a quick legato line always lands on voice 0.
    controls.voice_mode = VoiceMode::Mono;
    mailbox.publish(controls);

    for (i, note) in [62u8, 65, 69, 72].into_iter().enumerate() {
        let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
        engine.process_block(&mut channels, &[MidiEvent::note_on(note, 90, 0)]);
        tracing::info!(
            step = i,
            note,
            holder = ?engine.pool().voices()[0].note(),
            active = engine.active_voice_count(),
            "mono step"
        );
    }
}
