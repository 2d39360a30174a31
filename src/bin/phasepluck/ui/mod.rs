//! TUI module for phasepluck
//!
//! Live parameter controls plus oscilloscope and spectrum views of the
//! audio output.

mod controls;
mod help;
mod spectrum;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use phasepluck::{control::PluckHandle, Algorithm, SharedParams};

use crate::analysis::{estimate_fundamental, AudioStats};
use controls::{render_controls, ControlPanel, PanelView};
use help::render_help;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Audio visualization buffer size
pub const VIS_BUFFER_SIZE: usize = 2048;

/// Keyboard row played as a chromatic octave from C4
const PIANO_KEYS: &str = "awsedftgyhujk";
const PIANO_BASE_NOTE: f32 = 60.0;

/// UI application state
pub struct UiApp {
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    params: Arc<SharedParams>,
    pluck: PluckHandle,
    string_mode: Arc<AtomicBool>,
    sample_rate: f32,
    panel: ControlPanel,
    spectrum: SpectrumAnalyzer,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    stats: AudioStats,
    pitch: Option<f32>,
    dropped_plucks: usize,
    show_help: bool,
    /// Whether the app should quit
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        params: Arc<SharedParams>,
        pluck: PluckHandle,
        string_mode: Arc<AtomicBool>,
        sample_rate: f32,
    ) -> Self {
        Self {
            audio_rx,
            params,
            pluck,
            string_mode,
            sample_rate,
            panel: ControlPanel::default(),
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            stats: AudioStats::default(),
            pitch: None,
            dropped_plucks: 0,
            show_help: false,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn algorithm(&self) -> Algorithm {
        if self.string_mode.load(Ordering::Relaxed) {
            Algorithm::String
        } else {
            Algorithm::Pulse
        }
    }

    /// Pull new samples from the ring, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        let keep = available.min(VIS_BUFFER_SIZE);
        for _ in keep..available {
            let _ = self.audio_rx.pop();
        }
        self.audio_buffer.rotate_left(keep);
        let start = VIS_BUFFER_SIZE - keep;
        for slot in &mut self.audio_buffer[start..] {
            *slot = self.audio_rx.pop().unwrap_or(0.0);
        }

        self.stats = AudioStats::from_buffer(&self.audio_buffer);
        self.pitch = estimate_fundamental(&self.audio_buffer, self.sample_rate);
        self.spectrum.update(&self.audio_buffer);
    }

    fn trigger_pluck(&mut self) {
        if !self.pluck.pluck() {
            self.dropped_plucks += 1;
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char(' ') => self.trigger_pluck(),
            KeyCode::Tab => {
                let next = self.algorithm().toggled();
                self.string_mode
                    .store(next == Algorithm::String, Ordering::Relaxed);
            }
            KeyCode::Up => self.panel.select_previous(),
            KeyCode::Down => self.panel.select_next(),
            KeyCode::Left => self.panel.nudge(&self.params, -1),
            KeyCode::Right => self.panel.nudge(&self.params, 1),
            KeyCode::Char('-') => self.panel.nudge(&self.params, -10),
            KeyCode::Char('+') | KeyCode::Char('=') => self.panel.nudge(&self.params, 10),
            KeyCode::Char(c) => {
                if let Some(offset) = PIANO_KEYS.find(c) {
                    self.params.set_note(PIANO_BASE_NOTE + offset as f32);
                    if self.algorithm() == Algorithm::String {
                        self.trigger_pluck();
                    }
                }
            }
            _ => {}
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: controls, waveform, spectrum, help bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),  // Controls
                Constraint::Min(6),     // Waveform
                Constraint::Length(10), // Spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let view = PanelView {
            algorithm: self.algorithm(),
            sample_rate: self.sample_rate,
            stats: self.stats,
            pitch: self.pitch,
            dropped_plucks: self.dropped_plucks,
        };
        render_controls(frame, chunks[0], &self.panel, &self.params, &view);
        render_waveform(frame, chunks[1], &self.audio_buffer, view.algorithm);
        render_spectrum(frame, chunks[2], self.spectrum.data(), self.pitch);

        let help = Paragraph::new(
            " [Q] Quit  [Space] Pluck  [Tab] Algorithm  [↑↓] Select  [←→] Adjust  [?] Help",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);

        if self.show_help {
            render_help(frame, area);
        }
    }
}
