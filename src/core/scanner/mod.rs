// src/core/scanner/mod.rs

pub mod fetcher;
pub mod headers_scanner;
pub mod validator;
pub mod xss_scanner;

#[cfg(test)]
pub(crate) mod test_target;

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::ScannerConfig;
use crate::core::models::{ScanReport, ScanResult};
use crate::core::observer::{ScanObserver, ScanStatus};
use crate::core::store::ResultStore;
use crate::error::{FetchError, ScanError};
use self::fetcher::Fetcher;
use self::headers_scanner::analyze_headers;
use self::validator::validate_url;
use self::xss_scanner::analyze_document;

/// Runs scans and records completed ones in the shared [`ResultStore`].
///
/// Cheap to clone; every clone shares the HTTP client and the store.
#[derive(Clone)]
pub struct Scanner {
    fetcher: Fetcher,
    store: Arc<ResultStore>,
}

impl Scanner {
    pub fn new(config: &ScannerConfig, store: Arc<ResultStore>) -> Result<Self, FetchError> {
        Ok(Self { fetcher: Fetcher::new(config)?, store })
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Scans `url` and always produces a result.
    ///
    /// The observer gets a `scanning` status first and the final result last,
    /// whether the scan completed or failed. Only completed results are stored,
    /// keyed by `url` exactly as given.
    #[instrument(skip(self, observer))]
    pub async fn scan(&self, url: &str, observer: &dyn ScanObserver) -> ScanResult {
        observer.notify_status(ScanStatus::Scanning, url);
        info!("Starting scan.");

        let result = match self.run(url).await {
            Ok(report) => {
                let result = ScanResult::completed(url, report);
                self.store.insert(result.clone()).await;
                info!("Scan completed.");
                result
            }
            Err(e) => {
                error!(error = %e, "Scan failed.");
                ScanResult::failed(url, e.to_string())
            }
        };

        observer.notify_result(&result);
        result
    }

    async fn run(&self, url: &str) -> Result<ScanReport, ScanError> {
        let target = validate_url(url)?;
        let page = self.fetcher.fetch(&target).await?;

        let headers = analyze_headers(&page.headers);
        let xss = analyze_document(&page.content_type, &page.body);

        Ok(ScanReport { xss, hsts: headers.hsts, csp: headers.csp })
    }
}
