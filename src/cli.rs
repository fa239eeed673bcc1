use clap::{Parser, Subcommand};

use crate::config::{ScannerConfig, ServerConfig};

/// Vanguard Web Scanner: quick XSS-markup, HSTS and CSP checks for a single page.
#[derive(Parser, Debug)]
#[command(name = "vanguard-web-scanner", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub scanner: ScannerConfig,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive terminal dashboard (default)
    Tui,

    /// HTTP API with a WebSocket push channel
    Serve(ServerConfig),

    /// Scan one URL and print the result as JSON
    Scan {
        /// Target URL; https:// is assumed when no scheme is given
        url: String,
    },
}
