// src/core/scanner/fetcher.rs

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ScannerConfig;
use crate::error::FetchError;

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: StatusCode,
    /// Case-insensitive by construction.
    pub headers: HeaderMap,
    /// Empty when the server sent no `content-type`.
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Performs the single bounded GET of a scan.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(config: &ScannerConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetches `url`, following redirects. A final status of 400 or above is
    /// an error, as is any transport failure. Nothing is retried.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        debug!(url = %url, "Sending GET request.");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed.");
            FetchError::from(e)
        })?;

        let status = response.status();
        info!(url = %url, final_url = %response.url(), status = %status, "Received response.");

        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let headers = response.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();

        let body = response.bytes().await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to read response body.");
            FetchError::from(e)
        })?;
        debug!(bytes = body.len(), "Read response body.");

        Ok(FetchedPage { status, headers, content_type, body: body.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::test_target;
    use std::time::Duration;

    fn fetcher() -> Fetcher {
        Fetcher::new(&ScannerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn returns_headers_and_body_of_html_page() {
        let base = test_target::spawn().await;
        let page = fetcher().fetch(&base.join("/html").unwrap()).await.unwrap();

        assert_eq!(page.status, StatusCode::OK);
        assert!(page.content_type.starts_with("text/html"));
        assert!(page.headers.contains_key("Strict-Transport-Security"));
        assert!(String::from_utf8_lossy(&page.body).contains("<input"));
    }

    #[tokio::test]
    async fn sends_browser_user_agent() {
        let base = test_target::spawn().await;
        let page = fetcher().fetch(&base.join("/echo-ua").unwrap()).await.unwrap();
        assert_eq!(String::from_utf8(page.body).unwrap(), crate::config::DEFAULT_USER_AGENT);
    }

    #[tokio::test]
    async fn client_errors_fail_with_status() {
        let base = test_target::spawn().await;
        let err = fetcher().fetch(&base.join("/missing").unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
        assert_eq!(err.to_string(), "HTTP error: 404 Not Found");
    }

    #[tokio::test]
    async fn server_errors_fail_with_status() {
        let base = test_target::spawn().await;
        let err = fetcher().fetch(&base.join("/broken").unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn follows_a_short_redirect_chain() {
        let base = test_target::spawn().await;
        let page = fetcher().fetch(&base.join("/hop/2").unwrap()).await.unwrap();
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn redirect_target_status_is_checked() {
        let base = test_target::spawn().await;
        let err = fetcher().fetch(&base.join("/to-missing").unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn redirect_loops_are_cut_off() {
        let base = test_target::spawn().await;
        let err = fetcher().fetch(&base.join("/loop").unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::TooManyRedirects), "got {err:?}");
        assert_eq!(err.to_string(), "too many redirects");
    }

    #[tokio::test]
    async fn slow_targets_time_out() {
        let base = test_target::spawn().await;
        let config = ScannerConfig { timeout_secs: 1, ..ScannerConfig::default() };
        let fetcher = Fetcher::new(&config).unwrap();

        let err = fetcher.fetch(&base.join("/slow").unwrap()).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout), "got {err:?}");
        assert_eq!(err.to_string(), "timeout");
    }

    #[tokio::test]
    async fn unreachable_hosts_are_transport_errors() {
        let config = ScannerConfig { timeout_secs: 5, ..ScannerConfig::default() };
        let fetcher = Fetcher::new(&config).unwrap();
        // Port 9 on localhost: nothing listens there in the test environment.
        let url = Url::parse("http://127.0.0.1:9/").unwrap();

        let err = tokio::time::timeout(Duration::from_secs(10), fetcher.fetch(&url))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    }
}
