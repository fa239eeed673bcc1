// src/ui/widgets/input.rs
use ratatui::{prelude::*, widgets::{Block, Borders, Paragraph}};
use crate::app::{App, AppState};

/// Renders the URL input box.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_block = Block::default().borders(Borders::ALL).title("Target URL");
    let text = match (&app.state, &app.scanning_url) {
        (AppState::Scanning, Some(url)) => url.as_str(),
        _ => app.input.as_str(),
    };
    let input_paragraph = Paragraph::new(text)
        .block(input_block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, area);

    // Show the cursor only while typing.
    if app.state == AppState::Idle && !app.show_disclaimer {
        frame.set_cursor_position(Position::new(
            area.x + app.input.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }
}
