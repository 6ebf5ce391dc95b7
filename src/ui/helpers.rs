use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Entry;

/// One row of the session list: `#ctrl  First Last  Jersey: n - Sport`.
pub(crate) fn entry_list_line(entry: &Entry) -> Line<'static> {
    let name = entry.display_name();
    let name = if name.is_empty() {
        "(no name)".to_string()
    } else {
        name
    };

    Line::from(vec![
        Span::styled(
            format!("#{:<5}", entry.control_number),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("{name:<28}")),
        Span::styled(
            format!("Jersey: {} - {}", entry.jersey_number, entry.sport),
            Style::default().fg(Color::Gray),
        ),
    ])
}

/// First visible row so that `active_row` stays on screen in a viewport of
/// `height` rows, keeping one row of context below it when possible.
pub(crate) fn scroll_offset(active_row: usize, height: usize) -> usize {
    if height == 0 {
        return active_row;
    }
    (active_row + 2).saturating_sub(height)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
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

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
