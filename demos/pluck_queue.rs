//! Drive the engine from a simulated audio thread while a control thread
//! plucks it through the lock-free queue.
//!
//! Run with: cargo run --example pluck_queue

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use phasepluck::{Algorithm, Engine, EngineConfig, ParamId, SharedParams};

fn main() -> Result<(), phasepluck::ConfigError> {
    let config = EngineConfig::default().with_algorithm(Algorithm::String);
    let (mut engine, mut pluck) = Engine::with_pluck_queue(config)?;
    let params = Arc::new(SharedParams::new());
    let running = Arc::new(AtomicBool::new(true));

    // Audio thread: one 256-frame stereo callback every ~5ms
    let audio_params = Arc::clone(&params);
    let audio_running = Arc::clone(&running);
    let audio = thread::spawn(move || {
        let mut data = vec![0.0f32; 512];
        let mut blocks = 0usize;
        while audio_running.load(Ordering::Relaxed) {
            engine.process_interleaved(&audio_params, &mut data, 2);
            let peak = data.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
            if blocks % 20 == 0 {
                println!("block {blocks:>4}  {:?}  peak {peak:.3}", engine.string_state());
            }
            blocks += 1;
            thread::sleep(Duration::from_millis(5));
        }
        blocks
    });

    // Control thread: walk down a scale, plucking each note
    for note in [72.0, 71.0, 69.0, 67.0, 65.0, 64.0, 62.0, 60.0] {
        params.set_note(note);
        params.set(ParamId::Decay, 0.9);
        if !pluck.pluck() {
            println!("queue full, pluck dropped");
        }
        thread::sleep(Duration::from_millis(250));
    }

    running.store(false, Ordering::Relaxed);
    let blocks = audio.join().unwrap_or(0);
    println!("rendered {blocks} blocks");
    Ok(())
}
