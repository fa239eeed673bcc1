// src/app.rs

use crate::core::knowledge_base;
use crate::core::models::{AnalysisFinding, ScanResult, Severity};
use crate::core::observer::ScanEvent;
use ratatui::widgets::ListState;
use tracing::error;

pub const SPINNER_CHARS: [char; 10] =
    ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
    Finished,
    History,
}

#[derive(Debug, Default)]
pub struct ScanSummary {
    pub score: u8,
    pub critical_issues: usize,
    pub warning_issues: usize,
    pub xss_check_passed: bool,
    pub hsts_check_passed: bool,
    pub csp_check_passed: bool,
}

pub struct App {
    pub should_quit: bool,
    pub show_disclaimer: bool,
    pub state: AppState,
    pub input: String,
    /// URL of the scan in flight, as sent to the scanner.
    pub scanning_url: Option<String>,
    pub scan_result: Option<ScanResult>,
    pub all_findings: Vec<AnalysisFinding>,
    pub summary: ScanSummary,
    pub displayed_score: u8,
    pub spinner_frame: usize,
    pub analysis_list_state: ListState,
    pub history: Vec<ScanResult>,
    pub history_list_state: ListState,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            show_disclaimer: true,
            state: AppState::Idle,
            input: String::new(),
            scanning_url: None,
            scan_result: None,
            all_findings: Vec::new(),
            summary: ScanSummary::default(),
            displayed_score: 0,
            spinner_frame: 0,
            analysis_list_state: ListState::default(),
            history: Vec::new(),
            history_list_state: ListState::default(),
        }
    }

    pub fn start_scan(&mut self, url: String) {
        self.state = AppState::Scanning;
        self.scanning_url = Some(url);
    }

    /// Updates the state from a scan started by the dashboard.
    pub fn apply_event(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::ScanStatus { url, .. } => self.start_scan(url),
            ScanEvent::ScanResult(result) => self.show_result(result),
            ScanEvent::Error { message } => error!(error = %message, "Scan error event."),
        }
    }

    /// Shows `result` as the current report.
    pub fn show_result(&mut self, result: ScanResult) {
        self.all_findings = knowledge_base::assess(&result);
        self.scan_result = Some(result);
        self.scanning_url = None;
        self.state = AppState::Finished;
        self.displayed_score = 0;
        self.analysis_list_state = ListState::default();
        if !self.all_findings.is_empty() {
            self.analysis_list_state.select(Some(0));
        }
        self.update_summary();
    }

    pub fn show_history(&mut self, mut history: Vec<ScanResult>) {
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.history_list_state = ListState::default();
        if !history.is_empty() {
            self.history_list_state.select(Some(0));
        }
        self.history = history;
        self.state = AppState::History;
    }

    /// Opens the history entry under the cursor as the current report.
    pub fn open_selected_history(&mut self) {
        let selected = self
            .history_list_state
            .selected()
            .and_then(|i| self.history.get(i))
            .cloned();
        if let Some(result) = selected {
            self.show_result(result);
        }
    }

    pub fn scroll_up(&mut self) {
        match self.state {
            AppState::Finished => self.analysis_list_state.select_previous(),
            AppState::History => self.history_list_state.select_previous(),
            _ => {}
        }
    }

    pub fn scroll_down(&mut self) {
        match self.state {
            AppState::Finished => {
                select_next(&mut self.analysis_list_state, self.all_findings.len())
            }
            AppState::History => select_next(&mut self.history_list_state, self.history.len()),
            _ => {}
        }
    }

    pub fn update_summary(&mut self) {
        let count = |severity: Severity| {
            self.all_findings.iter().filter(|a| a.severity == severity).count()
        };
        let criticals = count(Severity::Critical);
        let warnings = count(Severity::Warning);
        let score = 100_i16
            .saturating_sub((criticals * 15) as i16)
            .saturating_sub((warnings * 5) as i16);

        let report = self.scan_result.as_ref().and_then(ScanResult::report);
        self.summary = ScanSummary {
            score: score.max(0) as u8,
            critical_issues: criticals,
            warning_issues: warnings,
            xss_check_passed: report.is_some_and(|r| !r.xss.vulnerable),
            hsts_check_passed: report.is_some_and(|r| r.hsts.present),
            csp_check_passed: report.is_some_and(|r| r.csp.present),
        };
    }

    /// Advances the spinner and the score gauge animation.
    pub fn on_tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        if self.displayed_score < self.summary.score {
            self.displayed_score = (self.displayed_score + 4).min(self.summary.score);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.scanning_url = None;
        self.scan_result = None;
        self.all_findings = Vec::new();
        self.summary = ScanSummary::default();
        self.displayed_score = 0;
        self.analysis_list_state = ListState::default();
    }
}

fn select_next(state: &mut ListState, len: usize) {
    if len == 0 {
        return;
    }
    let next = state.selected().map_or(0, |i| (i + 1).min(len - 1));
    state.select(Some(next));
}
