//! `Accept-Encoding` preference parsing.
//!
//! Parses the standard `token[;q=value]` grammar into an ordered
//! [`AcceptEncoding`] set. Malformed entries are skipped, never fatal:
//! - empty tokens or tokens with non-token characters
//! - `q` values that are not numbers or fall outside `[0, 1]`

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The wildcard token, matching any encoding without an explicit entry.
pub const WILDCARD: &str = "*";

/// A case-insensitive encoding name, or the wildcard `*`.
///
/// Stored lowercased so comparisons are plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodingToken(String);

impl EncodingToken {
    /// Create a token, returning `None` if `value` is not a valid HTTP token.
    pub fn new(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || !value.bytes().all(is_tchar) {
            return None;
        }
        Some(Self(value.to_ascii_lowercase()))
    }

    /// The lowercased token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }
}

impl fmt::Display for EncodingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// RFC 7230 `tchar`.
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

/// A quality value in `[0.0, 1.0]`.
///
/// A quality of exactly zero means the client explicitly rejects the encoding.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    /// Quality used when an entry carries no `q` parameter.
    pub const ONE: Quality = Quality(1.0);
    /// Explicit rejection.
    pub const ZERO: Quality = Quality(0.0);

    /// Create a quality, returning `None` outside `[0, 1]` (or for NaN).
    pub fn new(value: f32) -> Option<Self> {
        (0.0..=1.0).contains(&value).then_some(Self(value))
    }

    /// Parse a `q` parameter value such as `"0.8"`.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<f32>().ok().and_then(Self::new)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Whether the client rejected the encoding (`q=0`).
    pub fn is_rejected(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::ONE
    }
}

/// Ordered set of `(token, quality)` pairs parsed from one header value.
///
/// Entries keep their input order. A token only appears more than once if the
/// raw input repeats it; lookups then use the last occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptEncoding {
    entries: Vec<(EncodingToken, Quality)>,
}

impl AcceptEncoding {
    /// Parse a raw `Accept-Encoding` value.
    ///
    /// ```
    /// use sustainable_axum_core::{AcceptEncoding, Quality};
    ///
    /// let accept = AcceptEncoding::parse("gzip;q=0.8, br, *;q=0.1, zstd;q=7");
    /// assert_eq!(accept.len(), 3);
    /// assert_eq!(accept.quality_of("br"), Some(Quality::ONE));
    /// assert_eq!(accept.quality_of("zstd"), None);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let entries = raw.split(',').filter_map(parse_entry).collect();
        Self { entries }
    }

    /// Parse `raw`, falling back to `fallback` when `raw` is absent or yields
    /// no usable entries.
    ///
    /// The fallback is conventionally the inbound request's own
    /// `Accept-Encoding` header, with `raw` being a configured override.
    pub fn parse_or(raw: Option<&str>, fallback: Option<&str>) -> Self {
        let parsed = raw.map(Self::parse).unwrap_or_default();
        if !parsed.is_empty() {
            return parsed;
        }
        fallback.map(Self::parse).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&EncodingToken, Quality)> {
        self.entries.iter().map(|(token, q)| (token, *q))
    }

    /// Quality of an explicit entry for `name` (case-insensitive).
    ///
    /// The wildcard is not consulted; use [`wildcard`](Self::wildcard) for that.
    pub fn quality_of(&self, name: &str) -> Option<Quality> {
        self.entries
            .iter()
            .rev()
            .find(|(token, _)| token.as_str().eq_ignore_ascii_case(name))
            .map(|(_, q)| *q)
    }

    /// Quality of the `*` entry, if present.
    pub fn wildcard(&self) -> Option<Quality> {
        self.quality_of(WILDCARD)
    }

    /// Effective quality for `name`: its explicit entry, else the wildcard.
    pub fn effective_quality(&self, name: &str) -> Option<Quality> {
        self.quality_of(name).or_else(|| self.wildcard())
    }
}

fn parse_entry(item: &str) -> Option<(EncodingToken, Quality)> {
    let mut parts = item.split(';');
    let token = EncodingToken::new(parts.next()?)?;

    let mut quality = Quality::ONE;
    for param in parts {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("q") {
            quality = Quality::parse(value)?;
        }
    }
    Some((token, quality))
}

impl FromStr for AcceptEncoding {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for AcceptEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (token, quality)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if *quality == Quality::ONE {
                write!(f, "{token}")?;
            } else {
                write!(f, "{token};q={}", quality.value())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn pairs(accept: &AcceptEncoding) -> Vec<(String, f32)> {
        accept
            .iter()
            .map(|(t, q)| (t.as_str().to_string(), q.value()))
            .collect()
    }

    #[test]
    fn test_parse_defaults_quality_to_one() {
        let accept = AcceptEncoding::parse("gzip, br");
        assert_eq!(
            pairs(&accept),
            vec![("gzip".to_string(), 1.0), ("br".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_parse_quality_and_whitespace() {
        let accept = AcceptEncoding::parse("  gzip ; q=0.8 ,br;q=1.0 ,  * ;q=0.1");
        assert_eq!(
            pairs(&accept),
            vec![
                ("gzip".to_string(), 0.8),
                ("br".to_string(), 1.0),
                ("*".to_string(), 0.1)
            ]
        );
        assert_eq!(accept.wildcard(), Quality::new(0.1));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let accept = AcceptEncoding::parse("GZip;Q=0.5");
        assert_eq!(accept.quality_of("gzip"), Quality::new(0.5));
        assert_eq!(accept.quality_of("GZIP"), Quality::new(0.5));
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let accept = AcceptEncoding::parse("gzip;q=abc, br;q=1.5, zstd;q=-1, , g zip, deflate");
        assert_eq!(pairs(&accept), vec![("deflate".to_string(), 1.0)]);
    }

    #[test]
    fn test_parse_ignores_other_params() {
        let accept = AcceptEncoding::parse("gzip;level=3;q=0.4, br;foo");
        assert_eq!(accept.quality_of("gzip"), Quality::new(0.4));
        assert_eq!(accept.quality_of("br"), Some(Quality::ONE));
    }

    #[test]
    fn test_parse_keeps_explicit_rejection() {
        let accept = AcceptEncoding::parse("gzip;q=0, *");
        assert!(accept.quality_of("gzip").unwrap().is_rejected());
        assert_eq!(accept.effective_quality("gzip"), Some(Quality::ZERO));
        assert_eq!(accept.effective_quality("br"), Some(Quality::ONE));
    }

    #[test]
    fn test_duplicate_tokens_last_wins() {
        let accept = AcceptEncoding::parse("gzip;q=0.2, gzip;q=0.9");
        assert_eq!(accept.len(), 2);
        assert_eq!(accept.quality_of("gzip"), Quality::new(0.9));
    }

    #[test]
    fn test_parse_empty() {
        assert!(AcceptEncoding::parse("").is_empty());
        assert!(AcceptEncoding::parse(" , ,").is_empty());
    }

    #[test]
    fn test_parse_or_uses_override_first() {
        let accept = AcceptEncoding::parse_or(Some("br"), Some("gzip"));
        assert_eq!(pairs(&accept), vec![("br".to_string(), 1.0)]);
    }

    #[test]
    fn test_parse_or_falls_back() {
        let accept = AcceptEncoding::parse_or(None, Some("gzip"));
        assert_eq!(pairs(&accept), vec![("gzip".to_string(), 1.0)]);

        let accept = AcceptEncoding::parse_or(Some(""), Some("gzip"));
        assert_eq!(pairs(&accept), vec![("gzip".to_string(), 1.0)]);

        assert!(AcceptEncoding::parse_or(None, None).is_empty());
    }

    #[test]
    fn test_display() {
        let accept = AcceptEncoding::parse("gzip;q=0.8, br, *;q=0");
        assert_eq!(accept.to_string(), "gzip;q=0.8, br, *;q=0");
    }

    fn token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("gzip".to_string()),
            Just("br".to_string()),
            Just("zstd".to_string()),
            Just("lzma".to_string()),
            Just("deflate".to_string()),
            Just("identity".to_string()),
            Just("*".to_string()),
            "[a-z][a-z0-9-]{0,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_reserialize_preserves_accepted_pairs(
            entries in prop::collection::vec((token_strategy(), 0u32..=1000), 0..8)
        ) {
            let raw = entries
                .iter()
                .map(|(t, q)| format!("{t};q={}", *q as f32 / 1000.0))
                .collect::<Vec<_>>()
                .join(", ");

            let first = AcceptEncoding::parse(&raw);
            let second = AcceptEncoding::parse(&first.to_string());

            let accepted = |a: &AcceptEncoding| {
                a.iter()
                    .filter(|(_, q)| !q.is_rejected())
                    .map(|(t, q)| (t.as_str().to_string(), q.value().to_bits()))
                    .collect::<BTreeSet<_>>()
            };
            prop_assert_eq!(accepted(&first), accepted(&second));
        }
    }
}
