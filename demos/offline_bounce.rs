//! Render a short phrase offline and print a level meter per note.
//!
//! Run with: cargo run --example offline_bounce

use phasepluck::{dsp::Excitation, Algorithm, Engine, EngineConfig, ParamId, SharedParams};

const SAMPLE_RATE: f32 = 48_000.0;
const NOTE_SECONDS: f32 = 0.4;

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|x| x * x).sum::<f32>() / samples.len().max(1) as f32).sqrt()
}

fn main() -> Result<(), phasepluck::ConfigError> {
    let phrase = [60.0, 64.0, 67.0, 72.0, 67.0, 64.0];
    let frames_per_note = (SAMPLE_RATE * NOTE_SECONDS) as usize;
    let mut block = vec![0.0f32; 256];

    for (algorithm, excitation) in [
        (Algorithm::Pulse, Excitation::Noise),
        (Algorithm::String, Excitation::Noise),
        (Algorithm::String, Excitation::Impulse),
    ] {
        let config = EngineConfig::default()
            .with_sample_rate(SAMPLE_RATE)
            .with_algorithm(algorithm)
            .with_excitation(excitation);
        let mut engine = Engine::offline(config)?;
        let params = SharedParams::new();
        params.set_gain_db(-6.0);
        params.set(ParamId::PulseWidth, 0.3);
        params.set(ParamId::Decay, 0.8);

        println!("{algorithm:?} ({excitation:?})");
        for &note in &phrase {
            params.set_note(note);
            engine.pluck();

            let mut note_rms = Vec::new();
            let mut rendered = 0;
            while rendered < frames_per_note {
                let n = block.len().min(frames_per_note - rendered);
                engine.process_interleaved(&params, &mut block[..n], 1);
                note_rms.push(rms(&block[..n]));
                rendered += n;
            }

            let level = note_rms.iter().sum::<f32>() / note_rms.len() as f32;
            let bar = "#".repeat((level * 60.0).round() as usize);
            println!(
                "  note {:>3}  {:>7.1} Hz  rms {:.3}  {}",
                note,
                params.get(ParamId::Frequency),
                level,
                bar
            );
        }
        println!();
    }

    Ok(())
}
