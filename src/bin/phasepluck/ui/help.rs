//! Key reference overlay

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const KEYS: [(&str, &str); 10] = [
    ("Space", "pluck the string"),
    ("a w s e d f t g y h u j k", "play C4..C5 (plucks in string mode)"),
    ("Tab", "switch pulse / string"),
    ("Up / Down", "select a control"),
    ("Left / Right", "adjust by 1%"),
    ("- / +", "adjust by 10%"),
    ("?", "show this help"),
    ("q / Esc", "quit"),
    ("", ""),
    ("", "any key closes this window"),
];

pub fn render_help(frame: &mut Frame, area: Rect) {
    let [row] = Layout::vertical([Constraint::Length(KEYS.len() as u16 + 2)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(64)])
        .flex(Flex::Center)
        .areas(row);

    let lines: Vec<Line> = KEYS
        .iter()
        .map(|(key, action)| Line::from(format!(" {key:<26} {action}")))
        .collect();

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
