// src/core/scanner/validator.rs

use tracing::debug;
use url::Url;

use crate::error::ScanError;

/// Parses `raw` as an absolute http(s) URL with a host.
///
/// No scheme is guessed here: `example.com` is rejected. Callers that want the
/// dashboard behaviour run the input through [`with_default_scheme`] first.
pub fn validate_url(raw: &str) -> Result<Url, ScanError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        debug!(input = raw, error = %e, "URL failed to parse.");
        ScanError::InvalidUrl(raw.to_string())
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        debug!(input = raw, scheme = url.scheme(), "Unsupported URL scheme.");
        return Err(ScanError::InvalidUrl(raw.to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => {
            debug!(input = raw, "URL has no host.");
            Err(ScanError::InvalidUrl(raw.to_string()))
        }
    }
}

/// Prefixes `https://` when the input carries neither `http://` nor `https://`.
pub fn with_default_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
