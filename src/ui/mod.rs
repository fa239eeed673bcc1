// src/ui/mod.rs

use crate::app::{App, AppState};
use ratatui::prelude::*;

mod layout;
mod widgets;

pub fn render(app: &mut App, frame: &mut Frame) {
    let layout = layout::create_layout(frame.area());

    widgets::input::render_input(frame, app, layout.input);

    // The history table replaces the report while it is open.
    if app.state == AppState::History {
        widgets::history_view::render_history_view(frame, app, layout.report);
    } else {
        widgets::analysis_view::render_analysis_view(frame, app, layout.report);
    }

    widgets::summary::render_summary(frame, app, layout.summary);
    widgets::footer::render_footer(frame, app, layout.footer);

    if app.show_disclaimer {
        widgets::disclaimer_popup::render_disclaimer_popup(frame, frame.area());
    }
}
