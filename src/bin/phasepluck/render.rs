//! Offline rendering without an audio device

use clap::Args;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

use phasepluck::{Algorithm, Engine, SharedParams};

use crate::{
    analysis::{estimate_fundamental, AudioStats},
    VoiceArgs,
};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    voice: VoiceArgs,

    /// Length of the render in seconds
    #[arg(short, long, default_value = "1.0")]
    seconds: f32,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: f32,
}

/// Result of one offline render
pub struct Report {
    pub stats: AudioStats,
    /// Stats of the last tenth of the render, to show decay
    pub tail: AudioStats,
    pub fundamental: Option<f32>,
    pub frames: usize,
}

/// Render `args` into a mono buffer. The string is plucked before the first
/// block.
pub fn render(args: &RenderArgs) -> EyreResult<(Vec<f32>, Report)> {
    let config = args.voice.engine_config(args.sample_rate);
    let mut engine = Engine::offline(config).wrap_err("invalid render settings")?;
    let params = SharedParams::new();
    args.voice.apply(&params);

    if engine.algorithm() == Algorithm::String {
        engine.pluck();
    }

    let frames = (args.seconds.max(0.0) * args.sample_rate).round() as usize;
    let mut output = vec![0.0f32; frames];
    for block in output.chunks_mut(config.max_block_size) {
        engine.process_interleaved(&params, block, 1);
    }

    // Pitch from the first half second, where a string is loudest
    let window = frames.min((args.sample_rate * 0.5) as usize);
    let report = Report {
        stats: AudioStats::from_buffer(&output),
        tail: AudioStats::from_buffer(&output[frames - frames / 10..]),
        fundamental: estimate_fundamental(&output[..window], args.sample_rate),
        frames,
    };
    Ok((output, report))
}

pub fn run(args: RenderArgs) -> EyreResult<()> {
    let (_, report) = render(&args)?;

    println!("=== phasepluck render ===");
    println!("Algorithm: {:?}", args.voice.algorithm);
    println!("Sample rate: {} Hz", args.sample_rate);
    println!("Frames: {}", report.frames);
    println!();
    println!("Peak: {:.4}", report.stats.peak);
    println!("RMS:  {:.4}", report.stats.rms);
    println!("Tail RMS: {:.4}", report.tail.rms);
    match report.fundamental {
        Some(hz) => println!("Fundamental: {:.2} Hz (requested {:.2} Hz)", hz, args.voice.frequency),
        None => println!("Fundamental: none detected"),
    }
    if report.stats.non_finite > 0 {
        println!("Non-finite samples: {}", report.stats.non_finite);
    }

    Ok(())
}
