// src/ui/widgets/analysis_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use crate::core::knowledge_base::{self, FindingCategory};
use crate::core::models::{MaxAge, ScanReport, Severity};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    text::Line,
};

pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Analysis Report (Navigate with ↑ ↓)");

    if app.state != AppState::Finished {
        let content = match app.state {
            AppState::Idle => Paragraph::new("Scan results will appear here...")
                .alignment(Alignment::Center),
            AppState::Scanning => {
                let spinner_char = SPINNER_CHARS[app.spinner_frame];
                Paragraph::new(
                    Line::from(vec![
                        Span::styled(
                            format!("{} ", spinner_char),
                            Style::default().fg(Color::Cyan),
                        ),
                        Span::raw("Scanning... Please wait."),
                    ])
                ).alignment(Alignment::Center)
            },
            _ => Paragraph::new(""),
        };
        frame.render_widget(content.block(main_block), area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Min(0),
        ])
        .split(inner_area);

    let items: Vec<ListItem> = app.all_findings.iter().map(|f| {
        let (category, title) = knowledge_base::get_finding_detail(&f.code)
            .map_or((FindingCategory::Scan, "Unknown Finding"), |d| (d.category, d.title));

        let category_prefix = match category {
            FindingCategory::Xss => "[XSS] ",
            FindingCategory::Headers => "[HEADERS] ",
            FindingCategory::Scan => "[SCAN] ",
        };

        let line = Line::from(vec![
            Span::styled(category_prefix, Style::default().fg(Color::DarkGray)),
            Span::styled(title, severity_style(f.severity)),
        ]);

        ListItem::new(line)
    }).collect();

    let findings_list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(findings_list, chunks[0], &mut app.analysis_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let selected = app
        .analysis_list_state
        .selected()
        .and_then(|i| app.all_findings.get(i))
        .and_then(|f| knowledge_base::get_finding_detail(&f.code).map(|d| (f, d)));

    match selected {
        Some((finding, detail)) => {
            let mut text = vec![Line::from("")];
            if let Some(context) = &finding.context {
                text.push(Line::from("FOUND:".yellow().bold()));
                text.push(Line::from(context.as_str()));
                text.push(Line::from(""));
            }
            text.extend([
                Line::from("WHAT IT IS:".yellow().bold()),
                Line::from(detail.description),
                Line::from(""),
                Line::from("HOW TO FIX:".yellow().bold()),
                Line::from(detail.remediation),
            ]);
            let p = Paragraph::new(text).wrap(Wrap { trim: true }).block(detail_block);
            frame.render_widget(p, chunks[1]);
        }
        None => render_placeholder_details(frame, app, detail_block, chunks[1]),
    }
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Info => Style::default().fg(Color::Cyan),
    }
}

/// Shown when nothing is selected: the raw header values, or a clean bill of health.
fn render_placeholder_details(frame: &mut Frame, app: &App, block: Block, area: Rect) {
    let report = app.scan_result.as_ref().and_then(|r| r.report());
    let placeholder_text = match report {
        Some(report) if app.all_findings.is_empty() => {
            let mut lines = vec![
                Line::from(""),
                Line::from("✓ NO ISSUES FOUND".bold().fg(Color::Green)),
                Line::from(""),
            ];
            lines.extend(header_lines(report));
            Text::from(lines)
        }
        _ => Text::from("Select an item above to see details."),
    };

    let p = Paragraph::new(placeholder_text).alignment(Alignment::Center).block(block);
    frame.render_widget(p, area);
}

fn header_lines(report: &ScanReport) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(hsts) = &report.hsts.details {
        let max_age = match hsts.max_age_seconds {
            MaxAge::Seconds(s) => format!("{}s", s),
            MaxAge::Unspecified => "unspecified".to_string(),
        };
        lines.push(Line::from(format!(
            "HSTS: max-age {}, includeSubDomains {}, preload {}",
            max_age, hsts.include_sub_domains, hsts.preload
        )));
    }
    if let Some(csp) = &report.csp.details {
        let directives = csp.policies.iter().filter(|p| !p.is_empty()).count();
        lines.push(Line::from(format!("CSP: {} directive(s)", directives)));
        for policy in csp.policies.iter().filter(|p| !p.is_empty()) {
            lines.push(Line::from(format!("  {}", policy)).fg(Color::DarkGray));
        }
    }
    lines
}
