//! Triggered oscilloscope

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use phasepluck::Algorithm;

/// Index of the first upward zero crossing in the first half of `buffer`.
///
/// Starting the trace there keeps a periodic signal still between frames.
fn trigger_point(buffer: &[f32]) -> usize {
    buffer[..buffer.len() / 2]
        .windows(2)
        .position(|pair| pair[0] < 0.0 && pair[1] >= 0.0)
        .map_or(0, |i| i + 1)
}

/// Render the last half-buffer of audio, aligned on a rising edge.
///
/// The vertical range grows past ±1 to fit the pulse oscillator, whose
/// overshoot exceeds unity.
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32], algorithm: Algorithm) {
    let (title, color) = match algorithm {
        Algorithm::Pulse => (" Scope: pulse ", Color::Cyan),
        Algorithm::String => (" Scope: string ", Color::Yellow),
    };

    let start = trigger_point(audio_buffer);
    let visible = &audio_buffer[start..(start + audio_buffer.len() / 2).min(audio_buffer.len())];
    let span = visible.len().max(1) as f64;

    let peak = visible
        .iter()
        .filter(|x| x.is_finite())
        .fold(0.0f32, |acc, &x| acc.max(x.abs()));
    let bound = peak.max(1.0).ceil() as f64;

    let trace: Vec<(f64, f64)> = visible
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / span, s as f64))
        .collect();

    let chart = Chart::new(vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&trace)])
    .block(Block::default().title(title).borders(Borders::ALL))
    .x_axis(
        Axis::default()
            .bounds([0.0, 1.0])
            .style(Style::default().fg(Color::DarkGray)),
    )
    .y_axis(
        Axis::default()
            .bounds([-bound, bound])
            .labels(vec![format!("-{bound}"), "0".to_string(), format!("{bound}")])
            .style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_on_rising_edge() {
        let buffer = [0.5, -0.2, -0.4, 0.1, 0.6, -0.3, 0.2, 0.4];
        assert_eq!(trigger_point(&buffer), 3);
    }

    #[test]
    fn test_trigger_falls_back_to_start() {
        assert_eq!(trigger_point(&[1.0; 8]), 0);
        assert_eq!(trigger_point(&[]), 0);
    }
}
