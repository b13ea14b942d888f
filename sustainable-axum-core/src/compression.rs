//! Compression configuration types and the encoding selector.
//!
//! - [`CompressionEncoding`]: The five built-in algorithms
//! - [`SUPPORTED_ALGORITHMS`]: Their fixed tie-breaking priority order
//! - [`CompressionLevel`]: Compression quality settings
//! - [`CompressionConfig`]: Server compression configuration
//! - [`select`]: Picks one algorithm for a response

use crate::accept::{AcceptEncoding, Quality};
use crate::codec::{
    BoxedCodec, BrotliCodec, DeflateCodec, GzipCodec, LzmaCodec, ZstdCodec,
};
use std::fmt;

/// Built-in compression algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionEncoding {
    Lzma,
    Zstd,
    Brotli,
    Gzip,
    Deflate,
}

/// Built-in algorithms in descending preference at equal client quality.
pub const SUPPORTED_ALGORITHMS: [CompressionEncoding; 5] = [
    CompressionEncoding::Lzma,
    CompressionEncoding::Zstd,
    CompressionEncoding::Brotli,
    CompressionEncoding::Gzip,
    CompressionEncoding::Deflate,
];

impl CompressionEncoding {
    /// Look up an algorithm by its `Content-Encoding` name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        SUPPORTED_ALGORITHMS
            .into_iter()
            .find(|enc| enc.as_str().eq_ignore_ascii_case(name))
    }

    /// The lowercase `Content-Encoding` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lzma => "lzma",
            Self::Zstd => "zstd",
            Self::Brotli => "br",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    /// Codec for this encoding, tuned to `level`.
    pub fn codec_with_level(&self, level: CompressionLevel) -> BoxedCodec {
        match self {
            Self::Lzma => BoxedCodec::new(LzmaCodec::with_preset(level_to_lzma(level))),
            Self::Zstd => BoxedCodec::new(ZstdCodec::with_level(level_to_zstd(level))),
            Self::Brotli => BoxedCodec::new(BrotliCodec::with_quality(level_to_brotli(level))),
            Self::Gzip => BoxedCodec::new(GzipCodec::with_level(level_to_flate2(level))),
            Self::Deflate => BoxedCodec::new(DeflateCodec::with_level(level_to_flate2(level))),
        }
    }
}

impl fmt::Display for CompressionEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Fastest compression (lowest ratio).
    Fastest,
    /// Best compression (highest ratio, slowest).
    #[default]
    Best,
    /// Each library's own default level.
    Default,
    /// Precise compression level (algorithm-specific value).
    Precise(u32),
}

impl CompressionLevel {
    /// Create a compression level with a precise value.
    ///
    /// The value interpretation is algorithm-specific:
    /// - gzip/deflate: 0-9 (0=no compression, 9=best)
    /// - brotli: 0-11 (0=fastest, 11=best)
    /// - zstd: 1-22 (1=fastest, 22=best)
    /// - lzma: 0-9 (xz preset)
    pub fn precise(level: u32) -> Self {
        CompressionLevel::Precise(level)
    }
}

fn level_to_flate2(level: CompressionLevel) -> u32 {
    match level {
        CompressionLevel::Fastest => 1,
        CompressionLevel::Best => 9,
        CompressionLevel::Default => 6,
        CompressionLevel::Precise(n) => n.clamp(0, 9),
    }
}

fn level_to_brotli(level: CompressionLevel) -> u32 {
    match level {
        CompressionLevel::Fastest => 0,
        CompressionLevel::Best => 11,
        CompressionLevel::Default => 4,
        CompressionLevel::Precise(n) => n.clamp(0, 11),
    }
}

fn level_to_zstd(level: CompressionLevel) -> i32 {
    match level {
        CompressionLevel::Fastest => 1,
        CompressionLevel::Best => 22,
        CompressionLevel::Default => 3,
        CompressionLevel::Precise(n) => (n.min(22) as i32).clamp(1, 22),
    }
}

fn level_to_lzma(level: CompressionLevel) -> u32 {
    match level {
        CompressionLevel::Fastest => 0,
        CompressionLevel::Best => 9,
        CompressionLevel::Default => 6,
        CompressionLevel::Precise(n) => n.clamp(0, 9),
    }
}

/// Compression configuration.
#[derive(Debug, Clone, Copy)]
pub struct CompressionConfig {
    /// Minimum body size before compression is applied.
    /// Default is 0 (compress every non-empty body).
    pub min_bytes: usize,
    /// Compression level/quality.
    pub level: CompressionLevel,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            min_bytes: 0,
            level: CompressionLevel::Best,
        }
    }
}

impl CompressionConfig {
    /// Create a new compression config with the specified minimum bytes threshold.
    pub fn new(min_bytes: usize) -> Self {
        Self {
            min_bytes,
            ..Default::default()
        }
    }

    /// Set the compression level.
    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }
}

/// Pick the response encoding for a parsed `Accept-Encoding` set.
///
/// Each supported algorithm gets the quality of its explicit entry, or of the
/// wildcard when it has none. Algorithms with zero or no quality are skipped.
/// The highest quality wins; ties go to the earlier entry of `supported`, so
/// input order never matters. A wildcard alone therefore selects the first
/// supported algorithm that was not explicitly rejected.
///
/// ```
/// use sustainable_axum_core::{select, AcceptEncoding, CompressionEncoding::*};
///
/// let accept = AcceptEncoding::parse("br;q=0.5, gzip;q=0.9");
/// assert_eq!(select(&[Gzip, Brotli], &accept), Some(Gzip));
///
/// let accept = AcceptEncoding::parse("identity");
/// assert_eq!(select(&[Gzip], &accept), None);
/// ```
pub fn select(
    supported: &[CompressionEncoding],
    accept: &AcceptEncoding,
) -> Option<CompressionEncoding> {
    let mut best: Option<(CompressionEncoding, Quality)> = None;

    for &encoding in supported {
        let Some(quality) = accept.effective_quality(encoding.as_str()) else {
            continue;
        };
        if quality.is_rejected() {
            continue;
        }
        // Strictly greater keeps the earlier algorithm on ties.
        if best.is_none_or(|(_, q)| quality > q) {
            best = Some((encoding, quality));
        }
    }

    best.map(|(encoding, _)| encoding)
}

#[cfg(test)]
mod tests {
    use super::CompressionEncoding::*;
    use super::*;

    fn pick(supported: &[CompressionEncoding], raw: &str) -> Option<CompressionEncoding> {
        select(supported, &AcceptEncoding::parse(raw))
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CompressionEncoding::from_name("gzip"), Some(Gzip));
        assert_eq!(CompressionEncoding::from_name("BR"), Some(Brotli));
        assert_eq!(CompressionEncoding::from_name(" lzma "), Some(Lzma));
        assert_eq!(CompressionEncoding::from_name("identity"), None);
        assert_eq!(CompressionEncoding::from_name("lz4"), None);
    }

    #[test]
    fn test_as_str_round_trips_from_name() {
        for enc in SUPPORTED_ALGORITHMS {
            assert_eq!(CompressionEncoding::from_name(enc.as_str()), Some(enc));
        }
    }

    #[test]
    fn test_supported_order() {
        let names: Vec<_> = SUPPORTED_ALGORITHMS.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, ["lzma", "zstd", "br", "gzip", "deflate"]);
    }

    #[test]
    fn test_select_higher_quality_wins() {
        assert_eq!(pick(&[Gzip, Brotli], "br;q=0.5, gzip;q=0.9"), Some(Gzip));
        assert_eq!(pick(&[Brotli, Gzip], "br;q=0.5, gzip;q=0.9"), Some(Gzip));
    }

    #[test]
    fn test_select_tie_uses_supported_order() {
        assert_eq!(pick(&[Lzma, Gzip], "gzip;q=1.0, lzma;q=1.0"), Some(Lzma));
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "deflate, gzip, br"), Some(Brotli));
    }

    #[test]
    fn test_select_wildcard_falls_back_to_first_supported() {
        assert_eq!(pick(&[Gzip], "*;q=1.0"), Some(Gzip));
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "*"), Some(Lzma));
    }

    #[test]
    fn test_select_explicit_rejection_beats_wildcard() {
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "lzma;q=0, *"), Some(Zstd));
        assert_eq!(pick(&[Gzip], "gzip;q=0, *;q=1"), None);
    }

    #[test]
    fn test_select_rejected_wildcard() {
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "*;q=0"), None);
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "gzip, *;q=0"), Some(Gzip));
    }

    #[test]
    fn test_select_explicit_entry_against_wildcard_quality() {
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "gzip;q=0.5, *;q=0.1"), Some(Gzip));
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "gzip;q=0.5, *;q=1"), Some(Lzma));
    }

    #[test]
    fn test_select_no_match() {
        assert_eq!(pick(&[Gzip], "identity;q=1.0"), None);
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, "unknow"), None);
        assert_eq!(pick(&SUPPORTED_ALGORITHMS, ""), None);
        assert_eq!(pick(&[], "gzip"), None);
    }

    #[test]
    fn test_compression_level_precise() {
        assert_eq!(CompressionLevel::precise(5), CompressionLevel::Precise(5));
    }

    #[test]
    fn test_level_mapping_best() {
        assert_eq!(level_to_flate2(CompressionLevel::Best), 9);
        assert_eq!(level_to_brotli(CompressionLevel::Best), 11);
        assert_eq!(level_to_zstd(CompressionLevel::Best), 22);
        assert_eq!(level_to_lzma(CompressionLevel::Best), 9);
    }

    #[test]
    fn test_level_mapping_clamps() {
        assert_eq!(level_to_flate2(CompressionLevel::Precise(42)), 9);
        assert_eq!(level_to_brotli(CompressionLevel::Precise(42)), 11);
        assert_eq!(level_to_zstd(CompressionLevel::Precise(0)), 1);
        assert_eq!(level_to_zstd(CompressionLevel::Precise(u32::MAX)), 22);
        assert_eq!(level_to_lzma(CompressionLevel::Precise(42)), 9);
    }

    #[test]
    fn test_compression_config_default() {
        let config = CompressionConfig::default();
        assert_eq!(config.min_bytes, 0);
        assert_eq!(config.level, CompressionLevel::Best);
    }

    #[test]
    fn test_compression_config_builder() {
        let config = CompressionConfig::new(512).level(CompressionLevel::Fastest);
        assert_eq!(config.min_bytes, 512);
        assert_eq!(config.level, CompressionLevel::Fastest);
    }

    #[test]
    fn test_codec_names_match_encoding() {
        for enc in SUPPORTED_ALGORITHMS {
            assert_eq!(enc.codec_with_level(CompressionLevel::Best).name(), enc.as_str());
        }
    }
}
