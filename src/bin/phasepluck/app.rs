//! Live playback: cpal output stream plus the terminal control panel

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{error, info};

use phasepluck::{Algorithm, Engine, SharedParams};

use crate::{
    ui::{UiApp, VIS_BUFFER_SIZE},
    VoiceArgs,
};

pub fn run(args: VoiceArgs) -> EyreResult<()> {
    // Set up audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = (config.channels() as usize).max(1);
    info!(sample_rate, channels, "output device ready");

    let (mut engine, pluck) = Engine::with_pluck_queue(args.engine_config(sample_rate))
        .wrap_err("failed to create engine")?;

    let params = Arc::new(SharedParams::new());
    args.apply(&params);
    let string_mode = Arc::new(AtomicBool::new(engine.algorithm() == Algorithm::String));

    // Mono samples for the oscilloscope; dropped when the UI falls behind
    let (mut vis_tx, vis_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 8);

    let audio_params = Arc::clone(&params);
    let audio_mode = Arc::clone(&string_mode);
    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let algorithm = if audio_mode.load(Ordering::Relaxed) {
                    Algorithm::String
                } else {
                    Algorithm::Pulse
                };
                engine.set_algorithm(algorithm);
                engine.process_interleaved(&audio_params, data, channels);

                for frame in data.chunks_exact(channels) {
                    let _ = vis_tx.push(frame[0]);
                }
            },
            |err| error!(%err, "audio stream error"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let mut terminal = ratatui::init();
    let mut app = UiApp::new(vis_rx, params, pluck, string_mode, sample_rate);
    let result = app.run(&mut terminal);
    ratatui::restore();

    drop(stream);
    result
}
