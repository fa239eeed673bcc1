// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// --- Scan Result ---

/// The outcome of one scan invocation.
///
/// The `status` tag and its payload are flattened next to `url` and `timestamp`,
/// so a completed result serializes as
/// `{url, timestamp, status: "completed", xss, hsts, csp}` and a failed one as
/// `{url, timestamp, status: "failed", error}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: ScanOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScanOutcome {
    Completed(ScanReport),
    Failed { error: String },
}

impl ScanResult {
    pub fn completed(url: &str, report: ScanReport) -> Self {
        Self {
            url: url.to_string(),
            timestamp: Utc::now(),
            outcome: ScanOutcome::Completed(report),
        }
    }

    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            timestamp: Utc::now(),
            outcome: ScanOutcome::Failed { error: error.into() },
        }
    }

    pub fn report(&self) -> Option<&ScanReport> {
        match &self.outcome {
            ScanOutcome::Completed(report) => Some(report),
            ScanOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ScanOutcome::Completed(_) => None,
            ScanOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Completed(_))
    }
}

/// Everything a completed scan found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanReport {
    pub xss: XssResults,
    pub hsts: HeaderCheck<HstsDetails>,
    pub csp: HeaderCheck<CspDetails>,
}

// --- XSS Heuristics ---

/// One heuristic observation, tied to an element and its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub element: String,
    pub id: String,
    pub reason: String,
}

impl Finding {
    pub fn new(element: &str, id: &str, reason: impl Into<String>) -> Self {
        Self { element: element.to_string(), id: id.to_string(), reason: reason.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct XssResults {
    pub vulnerable: bool,
    pub details: Vec<Finding>,
}

impl XssResults {
    /// Records a finding that counts towards `vulnerable`.
    pub fn flag(&mut self, finding: Finding) {
        self.vulnerable = true;
        self.details.push(finding);
    }

    /// Records a purely informational finding.
    pub fn note(&mut self, finding: Finding) {
        self.details.push(finding);
    }
}

// --- Header Checks ---

/// Presence of a header plus whatever was extracted from it.
///
/// An absent header serializes its details as an empty object `{}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct HeaderCheck<T> {
    pub present: bool,
    #[serde(serialize_with = "serialize_details", deserialize_with = "deserialize_details")]
    pub details: Option<T>,
}

impl<T> HeaderCheck<T> {
    pub fn absent() -> Self {
        Self { present: false, details: None }
    }

    pub fn found(details: T) -> Self {
        Self { present: true, details: Some(details) }
    }
}

impl<T> Default for HeaderCheck<T> {
    fn default() -> Self {
        Self::absent()
    }
}

#[derive(Serialize)]
struct EmptyObject {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StrictEmptyObject {}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeDetails<T> {
    Some(T),
    Empty(StrictEmptyObject),
}

fn serialize_details<T: Serialize, S: Serializer>(
    details: &Option<T>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match details {
        Some(d) => d.serialize(s),
        None => EmptyObject {}.serialize(s),
    }
}

fn deserialize_details<'de, T: DeserializeOwned, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<T>, D::Error> {
    Ok(match MaybeDetails::<T>::deserialize(d)? {
        MaybeDetails::Some(details) => Some(details),
        MaybeDetails::Empty(_) => None,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HstsDetails {
    pub header: String,
    pub max_age_seconds: MaxAge,
    pub include_sub_domains: bool,
    pub preload: bool,
}

/// `max-age` of an HSTS header: a number of seconds, or `"unspecified"` when the
/// directive is missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMaxAge", into = "RawMaxAge")]
pub enum MaxAge {
    Seconds(u64),
    Unspecified,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawMaxAge {
    Seconds(u64),
    Text(String),
}

impl From<MaxAge> for RawMaxAge {
    fn from(value: MaxAge) -> Self {
        match value {
            MaxAge::Seconds(s) => RawMaxAge::Seconds(s),
            MaxAge::Unspecified => RawMaxAge::Text("unspecified".to_string()),
        }
    }
}

impl TryFrom<RawMaxAge> for MaxAge {
    type Error = String;

    fn try_from(value: RawMaxAge) -> Result<Self, Self::Error> {
        match value {
            RawMaxAge::Seconds(s) => Ok(MaxAge::Seconds(s)),
            RawMaxAge::Text(t) if t == "unspecified" => Ok(MaxAge::Unspecified),
            RawMaxAge::Text(t) => Err(format!("invalid max-age value: {}", t)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CspDetails {
    pub header: String,
    pub policies: Vec<String>,
}

/// Output of the header analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeadersResults {
    pub hsts: HeaderCheck<HstsDetails>,
    pub csp: HeaderCheck<CspDetails>,
}

// --- Dashboard Analysis ---

// An enumeration representing the severity level of a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// A scored observation derived from a `ScanResult`, keyed by a knowledge base code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFinding {
    pub severity: Severity,
    pub code: String,
    pub context: Option<String>,
}

impl AnalysisFinding {
    pub fn new(severity: Severity, code: &str) -> Self {
        Self { severity, code: code.to_string(), context: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
