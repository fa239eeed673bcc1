// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
    text::Line,
};

/// Renders the summary widget: score, gauge, per-check status and issue counts.
///
/// Content is only drawn once a report is on screen.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Score & Rating section
            Constraint::Length(1), // Gauge chart
            Constraint::Length(2), // Spacer
            Constraint::Length(4), // Security Checks section
            Constraint::Length(2), // Spacer
            Constraint::Length(3), // Issues Found section
            Constraint::Length(2), // Spacer
            Constraint::Min(0),    // Scanned page
        ])
        .split(area);

    if app.state != AppState::Finished {
        return;
    }
    let Some(result) = &app.scan_result else {
        return;
    };

    // --- Score & Rating Section ---
    let (rating_text, rating_style) = match app.summary.score {
        90..=100 => ("Excellent", Style::default().fg(Color::Green)),
        75..=89 => ("Good", Style::default().fg(Color::Cyan)),
        50..=74 => ("Needs Improvement", Style::default().fg(Color::Yellow)),
        _ => ("Poor", Style::default().fg(Color::Red)),
    };
    let score_line =
        Line::from(format!("{}/100 ({})", app.summary.score, rating_text)).style(rating_style);
    let score_text = Text::from(vec![Line::from("Overall Score".bold()), score_line]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), summary_chunks[0]);

    // --- Gauge Chart (Animated) ---
    let score_gauge = Gauge::default()
        .percent(app.displayed_score as u16)
        .label("")
        .style(Style::default().fg(
            if app.displayed_score >= 80 { Color::Green }
            else if app.displayed_score >= 50 { Color::Yellow }
            else { Color::Red }
        ));
    frame.render_widget(score_gauge, summary_chunks[1]);

    // --- Security Checks Section ---
    let checks_block = Block::default().title("SECURITY CHECKS".bold());
    let mut checks_lines = Vec::new();
    let checks_to_render = [
        ("No XSS-prone markup", app.summary.xss_check_passed),
        ("HSTS header", app.summary.hsts_check_passed),
        ("CSP header", app.summary.csp_check_passed),
    ];
    for (name, passed) in checks_to_render {
        let (icon, style) = if passed {
            ("✓", Style::default().fg(Color::Green))
        } else {
            ("✗", Style::default().fg(Color::Red))
        };
        checks_lines.push(Line::from(vec![
            Span::styled(format!("{} ", icon), style),
            Span::raw(name),
        ]));
    }
    frame.render_widget(Paragraph::new(checks_lines).block(checks_block), summary_chunks[3]);

    // --- Issue Details Section ---
    let issues_block = Block::default().title("ISSUES FOUND".bold());
    let details_text = Text::from(vec![
        Line::from(vec![
            Span::raw("Critical: "),
            Span::styled(app.summary.critical_issues.to_string(), Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![
            Span::raw("Warnings: "),
            Span::styled(
                app.summary.warning_issues.to_string(),
                Style::default().fg(Color::Yellow),
            ),
        ]),
    ]);
    frame.render_widget(Paragraph::new(details_text).block(issues_block), summary_chunks[5]);

    // --- Scanned Page Section ---
    let page_block = Block::default().title("PAGE".bold());
    let status = if result.is_completed() {
        Span::styled("completed", Style::default().fg(Color::Green))
    } else {
        Span::styled("failed", Style::default().fg(Color::Red))
    };
    let page_lines = vec![
        Line::from(Span::styled(result.url.clone(), Style::default().fg(Color::Cyan))),
        Line::from(vec![Span::raw("Status: "), status]),
        Line::from(format!("At: {}", result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"))),
    ];
    frame.render_widget(Paragraph::new(page_lines).block(page_block), summary_chunks[7]);
}
