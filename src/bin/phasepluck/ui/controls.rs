//! Parameter panel: one row per control, with a status line on top

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use phasepluck::{
    dsp::math::{amp_to_db, ftom},
    params::decay_to_feedback,
    Algorithm, ParamId, SharedParams,
};

use crate::analysis::AudioStats;

/// Fraction of the control travel moved by one arrow press
const NUDGE_STEP: f32 = 0.01;
const BAR_WIDTH: usize = 24;

#[derive(Debug, Default)]
pub struct ControlPanel {
    selected: usize,
}

impl ControlPanel {
    pub fn selected(&self) -> ParamId {
        ParamId::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % ParamId::ALL.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + ParamId::ALL.len() - 1) % ParamId::ALL.len();
    }

    /// Move the selected control by `steps` increments of its travel.
    pub fn nudge(&self, params: &SharedParams, steps: i32) {
        let id = self.selected();
        let spec = id.spec();
        let position = spec.normalize(params.get(id)) + steps as f32 * NUDGE_STEP;
        params.set(id, spec.denormalize(position));
    }
}

/// Live values shown alongside the controls
pub struct PanelView {
    pub algorithm: Algorithm,
    pub sample_rate: f32,
    pub stats: AudioStats,
    pub pitch: Option<f32>,
    pub dropped_plucks: usize,
}

fn applies_to(id: ParamId, algorithm: Algorithm) -> bool {
    match id {
        ParamId::PulseWidth => algorithm == Algorithm::Pulse,
        ParamId::Decay | ParamId::FilterAmount => algorithm == Algorithm::String,
        ParamId::Gain | ParamId::Frequency => true,
    }
}

fn format_value(id: ParamId, value: f32) -> String {
    match id {
        ParamId::Gain => format!("{:>6.1} dB", amp_to_db(value).max(-99.9)),
        ParamId::Frequency => format!("{:>8.1} Hz  (note {:.1})", value, ftom(value)),
        ParamId::PulseWidth => format!("{:>6.3}", value),
        ParamId::Decay => format!("{:>6.3}  (feedback {:.4})", value, decay_to_feedback(value)),
        ParamId::FilterAmount => format!("{:>6.3}", value),
    }
}

fn bar(position: f32) -> String {
    let filled = (position.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn status_line(view: &PanelView) -> Line<'static> {
    let algorithm = match view.algorithm {
        Algorithm::Pulse => "Pulse",
        Algorithm::String => "String",
    };
    let pitch = view
        .pitch
        .map(|hz| format!("{hz:.1} Hz"))
        .unwrap_or_else(|| "--".to_string());

    let mut spans = vec![
        Span::styled(format!(" {algorithm}  "), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{:.1}kHz  ", view.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}  ", view.stats.peak, view.stats.rms),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(format!("Pitch: {pitch}"), Style::default().fg(Color::Green)),
    ];
    if view.dropped_plucks > 0 {
        spans.push(Span::styled(
            format!("  dropped plucks: {}", view.dropped_plucks),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

pub fn render_controls(
    frame: &mut Frame,
    area: Rect,
    panel: &ControlPanel,
    params: &SharedParams,
    view: &PanelView,
) {
    let block = Block::default()
        .title(" phasepluck ")
        .borders(Borders::ALL);

    let mut lines = vec![status_line(view), Line::raw("")];
    for id in ParamId::ALL {
        let spec = id.spec();
        let value = params.get(id);
        let active = applies_to(id, view.algorithm);
        let selected = id == panel.selected();

        let mut style = if active {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }

        lines.push(Line::from(vec![
            Span::styled(format!(" {:<14}", spec.name), style),
            Span::styled(
                format!(" {} ", bar(spec.normalize(value))),
                Style::default().fg(if active { Color::Yellow } else { Color::DarkGray }),
            ),
            Span::styled(format_value(id, value), Style::default().fg(Color::Gray)),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        let mut panel = ControlPanel::default();
        assert_eq!(panel.selected(), ParamId::Gain);
        panel.select_previous();
        assert_eq!(panel.selected(), ParamId::FilterAmount);
        panel.select_next();
        panel.select_next();
        assert_eq!(panel.selected(), ParamId::Frequency);
    }

    #[test]
    fn test_nudge_moves_along_curve() {
        let params = SharedParams::new();
        let mut panel = ControlPanel::default();
        panel.select_next();

        panel.nudge(&params, 10);
        let up = params.get(ParamId::Frequency);
        assert!(up > 440.0);
        panel.nudge(&params, -10);
        assert!((params.get(ParamId::Frequency) - 440.0).abs() < 0.5);

        panel.nudge(&params, 1_000);
        assert_eq!(params.get(ParamId::Frequency), 20_000.0);
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar(0.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(2.0).chars().filter(|&c| c == '█').count(), BAR_WIDTH);
    }

    #[test]
    fn test_string_controls_dim_for_pulse() {
        assert!(applies_to(ParamId::PulseWidth, Algorithm::Pulse));
        assert!(!applies_to(ParamId::Decay, Algorithm::Pulse));
        assert!(applies_to(ParamId::FilterAmount, Algorithm::String));
    }
}
