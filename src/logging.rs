// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use time::macros::format_description;
use time::UtcOffset;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::{FormatTime, OffsetTime};
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vanguard-rs", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

fn log_filter() -> EnvFilter {
    let level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.clone()))
        .unwrap_or_else(|_| format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME")));
    EnvFilter::new(level)
}

/// Timestamps in the local offset, resolved once.
///
/// The offset can only be read while the process is single-threaded, so this
/// must run before the async runtime starts. Falls back to UTC otherwise.
fn log_timer() -> impl FormatTime + Clone {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
}

/// Initializes logging to a file in the data directory.
///
/// With `console` set, the same events are also written to stderr. The
/// dashboard leaves it off since it owns the terminal.
pub fn initialize_logging(console: bool) -> Result<()> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_path = directory.join(LOG_FILE.clone());
    let log_file = std::fs::File::create(log_path)?;

    let timer = log_timer();

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_timer(timer.clone())
        .with_target(false)
        .with_ansi(false)
        .with_filter(log_filter());

    let console_subscriber = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(timer)
            .with_filter(log_filter())
    });

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(console_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}
