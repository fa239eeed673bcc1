// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

mod app;
mod cli;
mod config;
mod core;
mod error;
mod logging;
mod server;
mod ui;

use app::{App, AppState};
use cli::{Cli, Command};
use core::observer::{ChannelObserver, ScanEvent, SilentObserver};
use core::scanner::{validator::with_default_scheme, Scanner};
use core::store::ResultStore;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Must start before the runtime spawns worker threads.
    let dashboard = matches!(cli.command, None | Some(Command::Tui));
    logging::initialize_logging(!dashboard)?;

    tokio::runtime::Runtime::new()?.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let store = Arc::new(ResultStore::new());
    let scanner = Scanner::new(&cli.scanner, store)?;

    match cli.command {
        Some(Command::Serve(config)) => server::serve(scanner, &config).await,
        Some(Command::Scan { url }) => {
            let result = scanner.scan(&with_default_scheme(&url), &SilentObserver).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Some(Command::Tui) | None => run_dashboard(scanner).await,
    }
}

async fn run_dashboard(scanner: Scanner) -> Result<()> {
    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    info!("Dashboard started.");

    let outcome = event_loop(&mut terminal, &scanner).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    if let Err(e) = &outcome {
        error!(error = %e, "Dashboard stopped on error.");
    }
    outcome
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, scanner: &Scanner) -> Result<()> {
    let mut app = App::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, scanner, &tx).await?;
        }

        drain_scan_events(&mut app, &mut rx);
        app.on_tick();
    }
    Ok(())
}

fn drain_scan_events(app: &mut App, rx: &mut UnboundedReceiver<ScanEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.apply_event(event);
    }
}

async fn handle_events(
    app: &mut App,
    scanner: &Scanner,
    tx: &UnboundedSender<ScanEvent>,
) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if app.show_disclaimer {
            if key.code == KeyCode::Enter {
                app.show_disclaimer = false;
            }
            return Ok(());
        }
        match app.state {
            AppState::Idle => handle_idle_input(app, key.code, scanner, tx).await,
            AppState::Finished => handle_finished_input(app, key.code, scanner).await,
            AppState::History => handle_history_input(app, key.code),
            AppState::Scanning => {
                if key.code == KeyCode::Esc { app.quit(); }
            }
        }
    }
    Ok(())
}

async fn handle_idle_input(
    app: &mut App,
    key_code: KeyCode,
    scanner: &Scanner,
    tx: &UnboundedSender<ScanEvent>,
) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.show_history(scanner.store().all().await),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => { app.input.pop(); },
        KeyCode::Enter => {
            let raw_input = app.input.trim();
            if raw_input.is_empty() { return; }
            let url = with_default_scheme(raw_input);

            // The `scanning` status event switches the dashboard state.
            let scanner = scanner.clone();
            let observer = ChannelObserver::new(tx.clone());
            tokio::spawn(async move {
                scanner.scan(&url, &observer).await;
            });
        }
        _ => {}
    }
}

async fn handle_finished_input(app: &mut App, key_code: KeyCode, scanner: &Scanner) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('h') => app.show_history(scanner.store().all().await),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}

fn handle_history_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Enter => app.open_selected_history(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}
