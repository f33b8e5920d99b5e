use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for the popups.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Innermost message of a chained error, which is the one worth showing in
/// the status line.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Footer line built from `(key, action)` pairs.
pub(crate) fn key_hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (idx, (key, action)) in hints.iter().enumerate() {
        spans.push(Span::styled(*key, key_style));
        let gap = if idx + 1 == hints.len() { "" } else { "   " };
        spans.push(Span::raw(format!(" {action}{gap}")));
    }
    Line::from(spans)
}
