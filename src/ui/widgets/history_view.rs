// src/ui/widgets/history_view.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

/// Renders every stored result as a table, newest first.
pub fn render_history_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Scan History ({} stored)", app.history.len()));

    if app.history.is_empty() {
        let empty = Paragraph::new("No completed scans yet.")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows = app.history.iter().map(|result| {
        let (xss, hsts, csp) = match result.report() {
            Some(report) => (
                flag(!report.xss.vulnerable, "Secure", "Vulnerable"),
                flag(report.hsts.present, "Present", "Missing"),
                flag(report.csp.present, "Present", "Missing"),
            ),
            None => (Cell::from("-"), Cell::from("-"), Cell::from("-")),
        };
        Row::new(vec![
            Cell::from(result.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            Cell::from(result.url.clone()),
            xss,
            hsts,
            csp,
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(vec!["Date", "URL", "XSS", "HSTS", "CSP"]).style(Style::new().bold()))
    .row_highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .block(block);

    let mut state = TableState::default().with_selected(app.history_list_state.selected());
    frame.render_stateful_widget(table, area, &mut state);
}

fn flag(ok: bool, good: &'static str, bad: &'static str) -> Cell<'static> {
    if ok {
        Cell::from(good).style(Style::default().fg(Color::Green))
    } else {
        Cell::from(bad).style(Style::default().fg(Color::Red))
    }
}
