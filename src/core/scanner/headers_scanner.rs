// src/core/scanner/headers_scanner.rs

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use crate::core::models::{CspDetails, HeaderCheck, HeadersResults, HstsDetails, MaxAge};

static RE_MAX_AGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"max-age=(\d+)").unwrap());

/// Looks up every value of a header by name (case-insensitive).
///
/// # Returns
/// The values in the order received, or `None` when the header is missing or
/// every value is blank. Values that are not valid UTF-8 are decoded lossily
/// rather than treated as missing.
fn check_header(headers: &HeaderMap, name: &str) -> Option<Vec<String>> {
    debug!(header_name = name, "Checking for header.");
    let values: Vec<String> = headers
        .get_all(name)
        .iter()
        .map(|value| match value.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => {
                warn!(header_name = name, "Header found but contained invalid UTF-8.");
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            }
        })
        .filter(|value| !value.trim().is_empty())
        .collect();

    if values.is_empty() {
        return None;
    }
    debug!(header_name = name, count = values.len(), "Header found.");
    Some(values)
}

/// Inspects the HSTS and CSP headers of a response.
///
/// A missing or blank header is a normal outcome, so this never fails.
/// Repeated headers are combined, joined with `", "`.
pub fn analyze_headers(headers: &HeaderMap) -> HeadersResults {
    let hsts = match check_header(headers, "strict-transport-security") {
        Some(values) => HeaderCheck::found(parse_hsts(&values.join(", "))),
        None => HeaderCheck::absent(),
    };
    let csp = match check_header(headers, "content-security-policy") {
        Some(values) => HeaderCheck::found(parse_csp(&values)),
        None => HeaderCheck::absent(),
    };
    HeadersResults { hsts, csp }
}

/// Extracts `max-age`, `includeSubDomains` and `preload` from an HSTS value.
///
/// The two flags are plain substring checks on the raw value.
pub fn parse_hsts(value: &str) -> HstsDetails {
    let max_age_seconds = RE_MAX_AGE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map_or(MaxAge::Unspecified, MaxAge::Seconds);

    HstsDetails {
        header: value.to_string(),
        max_age_seconds,
        include_sub_domains: value.contains("includeSubDomains"),
        preload: value.contains("preload"),
    }
}

/// Splits each CSP value on `;` and trims each segment.
///
/// Empty segments are kept, so `a; b;` yields `["a", "b", ""]`. A header sent
/// several times is split value by value, so every policy's directives end up
/// in `policies`.
pub fn parse_csp(values: &[String]) -> CspDetails {
    CspDetails {
        header: values.join(", "),
        policies: values
            .iter()
            .flat_map(|value| value.split(';'))
            .map(|policy| policy.trim().to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn full_hsts_header_is_parsed() {
        let results = analyze_headers(&headers(&[(
            "Strict-Transport-Security",
            "max-age=31536000; includeSubDomains; preload",
        )]));

        assert!(results.hsts.present);
        let details = results.hsts.details.unwrap();
        assert_eq!(details.max_age_seconds, MaxAge::Seconds(31_536_000));
        assert!(details.include_sub_domains);
        assert!(details.preload);
        assert_eq!(details.header, "max-age=31536000; includeSubDomains; preload");
    }

    #[test]
    fn missing_or_malformed_max_age_is_unspecified() {
        assert_eq!(parse_hsts("includeSubDomains").max_age_seconds, MaxAge::Unspecified);
        assert_eq!(parse_hsts("max-age=soon").max_age_seconds, MaxAge::Unspecified);
        assert_eq!(
            parse_hsts("max-age=99999999999999999999999").max_age_seconds,
            MaxAge::Unspecified
        );
        assert_eq!(parse_hsts("max-age=0").max_age_seconds, MaxAge::Seconds(0));
    }

    #[test]
    fn hsts_flags_are_substring_checks() {
        let details = parse_hsts("max-age=10");
        assert!(!details.include_sub_domains);
        assert!(!details.preload);
        // Case matters: the directive token is matched literally.
        assert!(!parse_hsts("max-age=10; includesubdomains").include_sub_domains);
    }

    #[test]
    fn absent_headers_are_not_errors() {
        let results = analyze_headers(&HeaderMap::new());
        assert_eq!(results.hsts, HeaderCheck::absent());
        assert_eq!(results.csp, HeaderCheck::absent());
    }

    #[test]
    fn csp_segments_are_trimmed_but_not_filtered() {
        let results = analyze_headers(&headers(&[(
            "content-security-policy",
            "default-src 'self';  script-src https://cdn.example.com ;",
        )]));

        let details = results.csp.details.unwrap();
        assert_eq!(
            details.policies,
            vec!["default-src 'self'", "script-src https://cdn.example.com", ""]
        );
    }

    #[test]
    fn repeated_csp_headers_are_combined() {
        let mut map = HeaderMap::new();
        map.append("content-security-policy", HeaderValue::from_static("default-src 'self'"));
        map.append("content-security-policy", HeaderValue::from_static("script-src 'none'"));

        let details = analyze_headers(&map).csp.details.unwrap();
        assert_eq!(details.header, "default-src 'self', script-src 'none'");
        assert_eq!(details.policies, ["default-src 'self'", "script-src 'none'"]);
    }

    #[test]
    fn blank_headers_count_as_absent() {
        let results = analyze_headers(&headers(&[
            ("strict-transport-security", ""),
            ("content-security-policy", "  "),
        ]));
        assert_eq!(results.hsts, HeaderCheck::absent());
        assert_eq!(results.csp, HeaderCheck::absent());
    }

    #[test]
    fn non_utf8_values_still_count_as_present() {
        let mut map = HeaderMap::new();
        let value = HeaderValue::from_bytes(b"default-src \xff").unwrap();
        map.insert("content-security-policy", value);
        let results = analyze_headers(&map);
        assert!(results.csp.present);
    }
}
