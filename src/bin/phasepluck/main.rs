//! phasepluck - terminal front end for the pulse oscillator and plucked string
//!
//! Run with: cargo run -- play
//!       or: cargo run -- render --algorithm string --frequency 220

mod analysis;
mod app;
mod render;
mod ui;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use phasepluck::{dsp::Excitation, Algorithm, EngineConfig, ParamId, SharedParams};

#[derive(Parser)]
#[command(name = "phasepluck")]
#[command(version, about = "Pulse oscillator and plucked string synth", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings for `play` when no subcommand is given
    #[command(flatten)]
    voice: VoiceArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Play through the default output device with a live control panel
    Play(VoiceArgs),

    /// Render offline and print level and pitch statistics
    Render(render::RenderArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    Pulse,
    String,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Pulse => Algorithm::Pulse,
            AlgorithmArg::String => Algorithm::String,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ExcitationArg {
    Noise,
    Impulse,
}

impl From<ExcitationArg> for Excitation {
    fn from(arg: ExcitationArg) -> Self {
        match arg {
            ExcitationArg::Noise => Excitation::Noise,
            ExcitationArg::Impulse => Excitation::Impulse,
        }
    }
}

/// Voice settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct VoiceArgs {
    /// Synthesis algorithm
    #[arg(short, long, value_enum, default_value = "pulse")]
    algorithm: AlgorithmArg,

    /// Frequency in Hz
    #[arg(short, long, default_value = "440")]
    frequency: f32,

    /// Pulse width, 0..1
    #[arg(long, default_value = "0.5")]
    pulse_width: f32,

    /// String decay, 0..0.999
    #[arg(long, default_value = "0.5")]
    decay: f32,

    /// String loop damping, 0..1
    #[arg(long, default_value = "0.5")]
    filter: f32,

    /// Output gain in dB, -60..0
    #[arg(long, default_value = "-6")]
    gain_db: f32,

    /// What a pluck writes into the string
    #[arg(long, value_enum, default_value = "noise")]
    excitation: ExcitationArg,
}

impl VoiceArgs {
    fn engine_config(&self, sample_rate: f32) -> EngineConfig {
        EngineConfig::default()
            .with_sample_rate(sample_rate)
            .with_algorithm(self.algorithm.into())
            .with_excitation(self.excitation.into())
    }

    /// Write the initial control values. The store clamps each one.
    fn apply(&self, params: &SharedParams) {
        params.set(ParamId::Frequency, self.frequency);
        params.set(ParamId::PulseWidth, self.pulse_width);
        params.set(ParamId::Decay, self.decay);
        params.set(ParamId::FilterAmount, self.filter);
        params.set_gain_db(self.gain_db);
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // stderr keeps log lines out of the terminal UI's stdout frames
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Render(args)) => render::run(args),
        Some(Commands::Play(args)) => app::run(args),
        None => app::run(cli.voice),
    }
}
