//! Static descriptions of everything the dashboard can report, plus the mapping
//! from a `ScanResult` to scored findings.

use crate::core::models::{AnalysisFinding, MaxAge, ScanOutcome, ScanResult, Severity};
use std::fmt;

/// Defines the high-level categories for security findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    /// Markup patterns associated with reflected XSS.
    Xss,
    /// HSTS and CSP response headers.
    Headers,
    /// The page could not be scanned at all.
    Scan,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Xss => write!(f, "XSS Heuristics"),
            FindingCategory::Headers => write!(f, "HTTP Security Headers"),
            FindingCategory::Scan => write!(f, "Scan"),
        }
    }
}

/// Human-readable information about one finding code.
pub struct FindingDetail {
    /// Machine-readable identifier (e.g. "HEADERS_CSP_MISSING").
    pub code: &'static str,
    pub title: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    pub description: &'static str,
    pub remediation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    // --- Scan ---
    FindingDetail {
        code: "SCAN_FAILED",
        title: "Scan Failed",
        category: FindingCategory::Scan,
        severity: Severity::Critical,
        description: "The page could not be scanned. Either the input was not a valid absolute URL, or the request failed: a timeout, too many redirects, an HTTP status of 400 or above, or a network/TLS error.",
        remediation: "Check the URL and make sure the page is reachable from this machine, then scan again.",
    },
    // --- XSS heuristics ---
    FindingDetail {
        code: "XSS_UNSANITIZED_INPUT",
        title: "Unsanitized Input Field",
        category: FindingCategory::Xss,
        severity: Severity::Warning,
        description: "A free-text input (text, search, url, tel or email) carries no 'sanitized' or 'xss-protection' marker. Values typed here may be reflected into the page without encoding. This is a naive marker check, not proof of a vulnerability.",
        remediation: "Encode user input on output for the context it lands in, validate it server side, and mark reviewed fields so future scans skip them.",
    },
    FindingDetail {
        code: "XSS_INLINE_HANDLER",
        title: "Inline Event Handler",
        category: FindingCategory::Xss,
        severity: Severity::Warning,
        description: "An element uses an inline event handler attribute such as onclick or onerror. Inline handlers require 'unsafe-inline' in a CSP and are a common sink for injected script. Only the first handler of each element is reported.",
        remediation: "Move handlers into external scripts and attach them with addEventListener, then drop 'unsafe-inline' from the policy.",
    },
    FindingDetail {
        code: "XSS_PARSE_ERROR",
        title: "HTML Could Not Be Parsed",
        category: FindingCategory::Xss,
        severity: Severity::Warning,
        description: "The response claimed to be HTML but its body could not be decoded, so no markup checks ran. The page is flagged because nothing could be verified.",
        remediation: "Serve HTML as valid UTF-8, or declare the real charset in the Content-Type header.",
    },
    FindingDetail {
        code: "DOCUMENT_NOT_HTML",
        title: "Not an HTML Page",
        category: FindingCategory::Xss,
        severity: Severity::Info,
        description: "The response is not HTML, so the markup heuristics were skipped. Header checks still apply.",
        remediation: "Scan the HTML page that consumes this resource to get markup findings.",
    },
    // --- HTTP headers ---
    FindingDetail {
        code: "HEADERS_HSTS_MISSING",
        title: "HSTS Header Missing",
        category: FindingCategory::Headers,
        severity: Severity::Warning,
        description: "The HTTP Strict-Transport-Security (HSTS) header instructs browsers to only communicate with your site over HTTPS. It protects against protocol downgrade attacks and cookie hijacking.",
        remediation: "Add the 'Strict-Transport-Security' header to your web server responses. A strong value is 'max-age=31536000; includeSubDomains; preload'.",
    },
    FindingDetail {
        code: "HEADERS_HSTS_MAX_AGE_UNSPECIFIED",
        title: "HSTS max-age Missing",
        category: FindingCategory::Headers,
        severity: Severity::Info,
        description: "The HSTS header is present but has no readable 'max-age' directive. Browsers ignore an HSTS header without a valid max-age.",
        remediation: "Add 'max-age=<seconds>' to the header, for example 'max-age=31536000'.",
    },
    FindingDetail {
        code: "HEADERS_CSP_MISSING",
        title: "CSP Header Missing",
        category: FindingCategory::Headers,
        severity: Severity::Warning,
        description: "Content-Security-Policy (CSP) is a powerful security layer that helps prevent attacks like Cross-Site Scripting (XSS) and data injection by defining which resources a browser is allowed to load.",
        remediation: "Implement a Content-Security-Policy header that defines trusted sources for scripts, styles, and other assets. Start with a restrictive policy and gradually open it up as needed.",
    },
];

/// Retrieves the full detail for a finding code.
pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.code == code)
}

/// Turns a scan result into the scored findings shown by the dashboard.
pub fn assess(result: &ScanResult) -> Vec<AnalysisFinding> {
    let report = match &result.outcome {
        ScanOutcome::Failed { error } => {
            return vec![
                AnalysisFinding::new(Severity::Critical, "SCAN_FAILED").with_context(error.clone()),
            ];
        }
        ScanOutcome::Completed(report) => report,
    };

    let mut analyses = Vec::new();

    for finding in &report.xss.details {
        let code = match (finding.element.as_str(), finding.id.as_str()) {
            ("document", "root") => "DOCUMENT_NOT_HTML",
            ("document", "parser") => "XSS_PARSE_ERROR",
            ("input", _) if finding.reason.starts_with("input field") => "XSS_UNSANITIZED_INPUT",
            _ => "XSS_INLINE_HANDLER",
        };
        let severity = get_finding_detail(code).map_or(Severity::Info, |d| d.severity);
        let context = format!("<{} id={}>: {}", finding.element, finding.id, finding.reason);
        analyses.push(AnalysisFinding::new(severity, code).with_context(context));
    }

    match &report.hsts.details {
        None => analyses.push(AnalysisFinding::new(Severity::Warning, "HEADERS_HSTS_MISSING")),
        Some(hsts) if hsts.max_age_seconds == MaxAge::Unspecified => analyses.push(
            AnalysisFinding::new(Severity::Info, "HEADERS_HSTS_MAX_AGE_UNSPECIFIED")
                .with_context(hsts.header.clone()),
        ),
        Some(_) => {}
    }

    if !report.csp.present {
        analyses.push(AnalysisFinding::new(Severity::Warning, "HEADERS_CSP_MISSING"));
    }

    analyses
}
