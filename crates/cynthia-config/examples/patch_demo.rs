//! Patch demo: factory patches, validation, and saving a tweaked patch.
//!
//! Run with: cargo run -p cynthia-config --example patch_demo [patch-name-or-path]

use cynthia_config::{
    PARAM_RANGES, Patch, factory_patch_names, find_patch, get_factory_patch, is_factory_patch,
};
use cynthia_synth::{MidiEvent, SynthEngine};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // --- Factory patches ---
    println!("=== Factory Patches ===\n");
    for name in factory_patch_names() {
        if let Some(patch) = get_factory_patch(name) {
            println!(
                "{:<12} {:<12} {}",
                name,
                patch.voice_mode,
                patch.description.as_deref().unwrap_or("")
            );
        }
    }

    // --- Parameter ranges ---
    println!("\n=== Parameter Ranges ===\n");
    println!("{:<24} {:>9} {:>9} {:>9}", "Parameter", "Min", "Max", "Default");
    println!("{:-<24} {:->9} {:->9} {:->9}", "", "", "", "");
    for r in PARAM_RANGES {
        println!("{:<24} {:>9} {:>9} {:>9}", r.name, r.min, r.max, r.default);
    }

    // --- Validation ---
    println!("\n=== Validation ===\n");
    let mut broken = Patch::new("Broken");
    broken.filter.mode = "comb".to_string();
    broken.envelope.attack_s = 30.0;
    match broken.validate() {
        Ok(()) => println!("unexpectedly valid"),
        Err(e) => println!("{e}"),
    }

    // --- Play a patch ---
    let requested = std::env::args().nth(1).unwrap_or_else(|| "soft_pad".to_string());
    let patch = match find_patch(&requested) {
        Ok(patch) => patch,
        Err(e) => {
            tracing::error!(error = %e, "could not resolve patch");
            return;
        }
    };
    let snapshot = match patch.to_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(patch = %patch.name, error = %e, "patch rejected");
            return;
        }
    };
    tracing::info!(
        patch = %patch.name,
        factory = is_factory_patch(&requested),
        "patch applied"
    );

    let mut engine: SynthEngine<8> = SynthEngine::new();
    engine.prepare(48000.0, 480);
    engine.apply_snapshot(&snapshot);

    println!("\n=== Rendering '{}' (C major triad, 0.5 s) ===\n", patch.name);
    let mut mono = vec![0.0f32; 480];
    let mut events: Vec<MidiEvent> = [60, 64, 67]
        .into_iter()
        .map(|n| MidiEvent::note_on(n, 100, 0))
        .collect();
    for block in 0..50 {
        let mut channels: [&mut [f32]; 1] = [&mut mono];
        engine.process_block(&mut channels, &events);
        events.clear();
        if block % 10 == 0 {
            let peak = mono.iter().fold(0.0f32, |p, s| p.max(s.abs()));
            println!(
                "{:>4} ms  peak {:.4}  voices {}",
                block * 10,
                peak,
                engine.active_voice_count()
            );
        }
    }

    // --- Save a variation ---
    let mut darker = snapshot;
    darker.filter.cutoff_hz = (darker.filter.cutoff_hz * 0.5).max(100.0);
    let path = std::env::temp_dir().join("cynthia_darker.toml");
    let variation = Patch::from_snapshot(format!("{} (darker)", patch.name), &darker)
        .with_description("Half the cutoff of the original");
    match variation.save(&path) {
        Ok(()) => println!("\nSaved variation to {}", path.display()),
        Err(e) => tracing::error!(error = %e, "save failed"),
    }
}
