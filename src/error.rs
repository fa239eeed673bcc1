//! Error types for the scan engine.
//!
//! `ScanError` is terminal for a scan and ends up as the `error` message of a
//! failed `ScanResult`. `ParseError` never escapes the HTML analyzer: it is
//! recovered into a finding.

use thiserror::Error;

/// Terminal scan failures.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input never reached the network.
    #[error("Invalid URL format")]
    InvalidUrl(String),

    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] FetchError),
}

/// Failures of the single GET performed by the fetcher.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("timeout")]
    Timeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("HTTP error: {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// DNS, connection, TLS or body-read failure.
    #[error("{0}")]
    Transport(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// The HTML body could not be turned into a document.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ParseError(pub String);

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_redirect() {
            FetchError::TooManyRedirects
        } else if e.is_builder() {
            FetchError::Client(e.to_string())
        } else {
            FetchError::Transport(error_chain(&e))
        }
    }
}

/// Flattens an error and its sources into one line, so the DNS or TLS cause
/// behind reqwest's generic "error sending request" is kept.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
