/*
Engine
======

The engine is the piece a host talks to. It owns the voices, a preallocated
mono scratch block, and the audio-side end of the control queue. Everything
the host callback touches is allocation-free.

Per Callback
------------

    process_interleaved(shared, data, channels)
        │
        ├─ snapshot = shared.snapshot()      read continuous params once
        ├─ drain control queue               every pending pluck, once
        │
        └─ for each chunk of ≤ max_block_size frames:
               voice.render(scratch[..n], &snapshot)
               broadcast scratch[i] to every channel of frame i

Parameters are held constant across the whole callback. A torn snapshot (one
field from before a control update, one from after) is harmless and settles
on the next callback.

Plucks queued during one callback collapse into a single restart: the string
is retuned to the block's frequency and then re-excited once, before the
first sample of the block.
Plucks that arrive while the pulse voice is selected are discarded, so a
later switch to the string starts from whatever it held before.

Both voices are built up front and `Algorithm` only selects which one is
rendered, so switching algorithms is a field write and safe on the audio
thread. The voice that is not selected keeps its state and resumes where it
stopped.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "rtrb")]
use rtrb::Consumer;
use tracing::{info, warn};

#[cfg(feature = "rtrb")]
use crate::control::{control_channel, PluckHandle};
use crate::{
    config::EngineConfig,
    control::{ControlEvent, ControlReceiver, NoControl},
    dsp::{
        pulse::PulseOscillator,
        string::{Excitation, KarplusString, StringState},
    },
    error::Result,
    params::{ParameterSnapshot, SharedParams},
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Phase-distortion pulse oscillator
    #[default]
    Pulse,
    /// Karplus-Strong plucked string
    String,
}

impl Algorithm {
    pub fn toggled(self) -> Self {
        match self {
            Algorithm::Pulse => Algorithm::String,
            Algorithm::String => Algorithm::Pulse,
        }
    }
}

pub struct Engine<R: ControlReceiver> {
    config: EngineConfig,
    pulse: PulseOscillator,
    string: KarplusString,
    control: R,
    pluck_pending: bool,
    scratch: Vec<f32>,
}

impl Engine<NoControl> {
    /// Engine without a control thread (offline rendering, tests).
    pub fn offline(config: EngineConfig) -> Result<Self> {
        Self::new(config, NoControl)
    }
}

#[cfg(feature = "rtrb")]
impl Engine<Consumer<ControlEvent>> {
    /// Engine plus the handle a control thread uses to pluck it.
    pub fn with_pluck_queue(config: EngineConfig) -> Result<(Self, PluckHandle)> {
        config.validate()?;
        let (handle, rx) = control_channel(config.control_queue_capacity);
        let engine = Self::new(config, rx)?;
        Ok((engine, handle))
    }
}

impl<R: ControlReceiver> Engine<R> {
    pub fn new(config: EngineConfig, control: R) -> Result<Self> {
        if let Err(err) = config.validate() {
            warn!(?config, %err, "rejected engine config");
            return Err(err);
        }

        let mut string = KarplusString::with_seed(config.sample_rate, config.seed);
        string.set_excitation(config.excitation);

        info!(
            sample_rate = config.sample_rate,
            max_block_size = config.max_block_size,
            algorithm = ?config.algorithm,
            string_capacity = string.capacity(),
            "engine created"
        );

        Ok(Self {
            config,
            pulse: PulseOscillator::new(),
            string,
            control,
            pluck_pending: false,
            scratch: vec![0.0; config.max_block_size],
        })
    }

    /// Adopt a new sample rate. Reallocates the string's delay line; call
    /// only while the stream is stopped.
    pub fn prepare(&mut self, sample_rate: f32) -> Result<()> {
        let config = self.config.with_sample_rate(sample_rate);
        if let Err(err) = config.validate() {
            warn!(sample_rate, %err, "rejected sample rate");
            return Err(err);
        }

        self.config = config;
        self.string.set_sample_rate(sample_rate);
        self.pulse.reset();
        info!(
            sample_rate,
            string_capacity = self.string.capacity(),
            "engine prepared"
        );
        Ok(())
    }

    /// Clear every history and the delay line. Parameters and the selected
    /// algorithm are kept; a pluck not yet applied is dropped.
    pub fn reset(&mut self) {
        self.pulse.reset();
        self.string.reset();
        self.pluck_pending = false;
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.algorithm = algorithm;
    }

    pub fn set_excitation(&mut self, excitation: Excitation) {
        self.config.excitation = excitation;
        self.string.set_excitation(excitation);
    }

    /// Pluck the string at the start of the next block, bypassing the
    /// control queue. Ignored unless the string is selected by then.
    pub fn pluck(&mut self) {
        self.pluck_pending = true;
    }

    /// Pull every queued control event. Returns how many were drained.
    ///
    /// Events take effect at the start of the next block.
    pub fn drain_events(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.control.pop() {
            count += 1;
            match event {
                ControlEvent::Pluck => self.pluck_pending = true,
            }
        }
        count
    }

    fn begin_block(&mut self, params: &ParameterSnapshot) {
        self.drain_events();
        // The string only hears plucks while it is the selected voice
        if std::mem::take(&mut self.pluck_pending) && self.config.algorithm == Algorithm::String {
            // Excite a line already sized for this block's pitch
            self.string.set_frequency(params.frequency);
            self.string.pluck();
        }
    }

    /// Apply pending events, then render mono samples into `out`.
    ///
    /// `out` may be any length; it is rendered in one pass with `params`
    /// held constant.
    pub fn render_block(&mut self, params: &ParameterSnapshot, out: &mut [f32]) {
        self.begin_block(params);
        render_voice(&self.config, &mut self.pulse, &mut self.string, params, out);
    }

    /// Host callback entry: render into an interleaved buffer, copying the
    /// mono voice to every channel.
    ///
    /// Frames that do not fill a whole channel group at the end of `data`
    /// are zeroed.
    pub fn process_interleaved(&mut self, shared: &SharedParams, data: &mut [f32], channels: usize) {
        if channels == 0 {
            data.fill(0.0);
            return;
        }

        let params = shared.snapshot();
        self.begin_block(&params);

        // Destructure to borrow the scratch block alongside the voices
        let Self {
            config,
            pulse,
            string,
            scratch,
            ..
        } = self;

        let total_frames = data.len() / channels;
        let mut frames_written = 0;
        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(scratch.len());
            let block = &mut scratch[..frames];
            render_voice(config, pulse, string, &params, block);

            let offset = frames_written * channels;
            let out = &mut data[offset..offset + frames * channels];
            for (frame, &sample) in out.chunks_exact_mut(channels).zip(block.iter()) {
                frame.fill(sample);
            }

            frames_written += frames;
        }

        data[total_frames * channels..].fill(0.0);
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn string_state(&self) -> StringState {
        self.string.state()
    }

    pub fn string(&self) -> &KarplusString {
        &self.string
    }

    pub fn pulse(&self) -> &PulseOscillator {
        &self.pulse
    }
}

fn render_voice(
    config: &EngineConfig,
    pulse: &mut PulseOscillator,
    string: &mut KarplusString,
    params: &ParameterSnapshot,
    out: &mut [f32],
) {
    match config.algorithm {
        Algorithm::Pulse => pulse.render(out, params, config.sample_rate),
        Algorithm::String => string.render(out, params),
    }
}
