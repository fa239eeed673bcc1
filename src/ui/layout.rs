// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the dashboard.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
}

/// Splits the frame into the input box on top, the footer at the bottom and,
/// in between, the report (70%) next to the summary (30%).
pub fn create_layout(frame_size: Rect) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(main_chunks[1]);

    AppLayout {
        input: main_chunks[0],
        report: content_chunks[0],
        summary: content_chunks[1],
        footer: main_chunks[2],
    }
}
