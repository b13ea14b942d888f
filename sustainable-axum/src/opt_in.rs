//! Client opt-in directive parsing.

use axum::http::HeaderMap;

/// Default name of the opt-in request header.
pub const PERF_HEADER: &str = "perf";

/// The capabilities a client asked for, from the `Perf` request header.
///
/// Matching is a case-insensitive substring test against the whole header
/// value, not a list lookup: `Perf: perf-time` enables `Perf-Time`, and a
/// shared prefix such as `perf-score` enables every `Perf-Score-N`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptIn(String);

impl OptIn {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_ascii_lowercase())
    }

    /// Read the directive from `headers`; repeated headers are joined with `,`.
    pub fn from_headers(headers: &HeaderMap, header: &str) -> Self {
        let joined = headers
            .get_all(header)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(&joined)
    }

    /// Whether the capability called `name` participates in this request.
    pub fn includes(&self, name: &str) -> bool {
        !name.is_empty() && self.0.contains(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_includes_case_insensitive() {
        let opt_in = OptIn::new("PERF-TIME");
        assert!(opt_in.includes("Perf-Time"));
        assert!(opt_in.includes("perf-time"));
        assert!(!opt_in.includes("Perf-CPU"));
    }

    #[test]
    fn test_includes_is_substring_match() {
        let opt_in = OptIn::new("perf-time,perf-cpu");
        assert!(opt_in.includes("Perf-Time"));
        assert!(opt_in.includes("Perf-CPU"));

        // A partial name enables nothing longer than itself...
        let opt_in = OptIn::new("perf-t");
        assert!(!opt_in.includes("Perf-Time"));
        // ...but a longer value enables every name it contains.
        let opt_in = OptIn::new("perf-score-12");
        assert!(opt_in.includes("Perf-Score-1"));
        assert!(opt_in.includes("Perf-Score-12"));
    }

    #[test]
    fn test_empty_enables_nothing() {
        let opt_in = OptIn::default();
        assert!(opt_in.is_empty());
        assert!(!opt_in.includes("Perf-Time"));
        assert!(!opt_in.includes(""));
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append("Perf", HeaderValue::from_static("perf-time"));
        headers.append("perf", HeaderValue::from_static("Perf-RAM"));
        let opt_in = OptIn::from_headers(&headers, PERF_HEADER);
        assert_eq!(opt_in.as_str(), "perf-time,perf-ram");
        assert!(opt_in.includes("Perf-RAM"));

        let opt_in = OptIn::from_headers(&HeaderMap::new(), PERF_HEADER);
        assert!(opt_in.is_empty());
    }
}
