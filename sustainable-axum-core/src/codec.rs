//! Compression codec trait, implementations, and the invoker.
//!
//! This module provides the [`Codec`] trait for whole-body compression
//! and implementations for the five built-in algorithms:
//! - [`LzmaCodec`]: LZMA in the `.xz` container via xz2
//! - [`ZstdCodec`]: Zstandard
//! - [`BrotliCodec`]: Brotli
//! - [`GzipCodec`]: Gzip via flate2
//! - [`DeflateCodec`]: zlib-wrapped deflate via flate2
//!
//! [`invoke`] maps an algorithm name to its codec. It knows nothing about
//! negotiation.

use crate::compression::{CompressionEncoding, CompressionLevel};
use crate::error::CodecError;
use bytes::Bytes;
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::{self, Write};
use std::sync::Arc;

/// Whole-body response compressor.
///
/// Only the encoding direction exists: the middleware never reads compressed
/// request bodies.
///
/// ```ignore
/// struct Lz4Codec;
///
/// impl Codec for Lz4Codec {
///     fn name(&self) -> &'static str { "lz4" }
///
///     fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
///         Ok(lz4_flex::compress_prepend_size(data).into())
///     }
/// }
/// ```
pub trait Codec: Send + Sync + 'static {
    /// `Content-Encoding` token written for this codec.
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> io::Result<Bytes>;
}

/// Shared, type-erased [`Codec`].
#[derive(Clone)]
pub struct BoxedCodec(Arc<dyn Codec>);

impl BoxedCodec {
    pub fn new<C: Codec>(codec: C) -> Self {
        BoxedCodec(Arc::new(codec))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        self.0.compress(data)
    }
}

impl std::fmt::Debug for BoxedCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxedCodec").field(&self.name()).finish()
    }
}

/// `gzip` via flate2, level 0 to 9.
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    pub level: u32,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self { level: 9 }
    }
}

impl GzipCodec {
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

impl Codec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::new(self.level));
        encoder.write_all(data)?;
        encoder.finish().map(Bytes::from)
    }
}

/// `deflate` via flate2, level 0 to 9.
///
/// HTTP `deflate` means the zlib wrapper (RFC 1950), not a raw stream.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    pub level: u32,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self { level: 9 }
    }
}

impl DeflateCodec {
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

impl Codec for DeflateCodec {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::new(self.level));
        encoder.write_all(data)?;
        encoder.finish().map(Bytes::from)
    }
}

/// `br`, quality 0 to 11.
#[derive(Debug, Clone, Copy)]
pub struct BrotliCodec {
    pub quality: u32,
}

impl Default for BrotliCodec {
    fn default() -> Self {
        Self { quality: 11 }
    }
}

impl BrotliCodec {
    pub fn with_quality(quality: u32) -> Self {
        Self {
            quality: quality.min(11),
        }
    }
}

impl Codec for BrotliCodec {
    fn name(&self) -> &'static str {
        "br"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let params = brotli::enc::BrotliEncoderParams {
            quality: self.quality as i32,
            ..Default::default()
        };
        let mut out = Vec::with_capacity(data.len() / 2);
        brotli::enc::BrotliCompress(&mut io::Cursor::new(data), &mut out, &params)?;
        Ok(Bytes::from(out))
    }
}

/// `zstd`, level 1 to 22.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    pub level: i32,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self { level: 22 }
    }
}

impl ZstdCodec {
    pub fn with_level(level: i32) -> Self {
        Self {
            level: level.clamp(1, 22),
        }
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        zstd::bulk::compress(data, self.level).map(Bytes::from)
    }
}

/// `lzma`, written as an `.xz` stream with preset 0 to 9.
#[derive(Debug, Clone, Copy)]
pub struct LzmaCodec {
    pub preset: u32,
}

impl Default for LzmaCodec {
    fn default() -> Self {
        Self { preset: 9 }
    }
}

impl LzmaCodec {
    pub fn with_preset(preset: u32) -> Self {
        Self {
            preset: preset.min(9),
        }
    }
}

impl Codec for LzmaCodec {
    fn name(&self) -> &'static str {
        "lzma"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Bytes> {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), self.preset);
        encoder.write_all(data)?;
        encoder.finish().map(Bytes::from)
    }
}

/// Compress `data` with the algorithm called `name`.
///
/// `level` is algorithm-specific (see [`CompressionLevel::precise`]); `None`
/// uses each algorithm's high-compression default.
///
/// ```
/// use sustainable_axum_core::{invoke, CodecError};
///
/// let compressed = invoke("gzip", b"Welcome!", None).unwrap();
/// assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
///
/// assert!(matches!(
///     invoke("lz4", b"Welcome!", None),
///     Err(CodecError::UnsupportedAlgorithm(_))
/// ));
/// ```
pub fn invoke(name: &str, data: &[u8], level: Option<u32>) -> Result<Bytes, CodecError> {
    let encoding = CompressionEncoding::from_name(name)
        .ok_or_else(|| CodecError::UnsupportedAlgorithm(name.to_string()))?;
    let level = level.map_or(CompressionLevel::Best, CompressionLevel::Precise);
    compress_with(encoding, data, level)
}

/// Compress `data` with a known encoding and level.
pub fn compress_with(
    encoding: CompressionEncoding,
    data: &[u8],
    level: CompressionLevel,
) -> Result<Bytes, CodecError> {
    if data.is_empty() {
        return Err(CodecError::EmptyBody);
    }
    Ok(encoding.codec_with_level(level).compress(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::SUPPORTED_ALGORITHMS;
    use std::io::Read;

    const MESSAGE: &[u8] = b"Welcome! Welcome! Welcome! This body repeats itself to compress well.";

    fn decompress_with_crate(name: &str, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        match name {
            "gzip" => {
                flate2::read::GzDecoder::new(data).read_to_end(&mut out).unwrap();
            }
            "deflate" => {
                flate2::read::ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
            }
            "br" => {
                brotli::Decompressor::new(data, 4096).read_to_end(&mut out).unwrap();
            }
            "zstd" => out = zstd::decode_all(data).unwrap(),
            "lzma" => {
                xz2::read::XzDecoder::new(data).read_to_end(&mut out).unwrap();
            }
            other => panic!("unexpected algorithm {other}"),
        }
        out
    }

    #[test]
    fn test_invoke_round_trips_every_algorithm() {
        for enc in SUPPORTED_ALGORITHMS {
            let compressed = invoke(enc.as_str(), MESSAGE, None).unwrap();
            assert_ne!(&compressed[..], MESSAGE, "{enc} returned input unchanged");
            assert_eq!(decompress_with_crate(enc.as_str(), &compressed), MESSAGE);
        }
    }

    #[test]
    fn test_invoke_with_level() {
        for enc in SUPPORTED_ALGORITHMS {
            let compressed = invoke(enc.as_str(), MESSAGE, Some(9)).unwrap();
            assert_eq!(decompress_with_crate(enc.as_str(), &compressed), MESSAGE);
        }
    }

    #[test]
    fn test_invoke_is_case_insensitive() {
        let compressed = invoke("GZIP", MESSAGE, None).unwrap();
        assert_eq!(decompress_with_crate("gzip", &compressed), MESSAGE);
    }

    #[test]
    fn test_invoke_unsupported() {
        let err = invoke("identity", MESSAGE, None).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedAlgorithm(ref n) if n == "identity"));
    }

    #[test]
    fn test_invoke_empty_body() {
        let err = invoke("gzip", b"", None).unwrap_err();
        assert!(matches!(err, CodecError::EmptyBody));
    }

    #[test]
    fn test_fastest_level_still_decodes() {
        for enc in SUPPORTED_ALGORITHMS {
            let codec = enc.codec_with_level(CompressionLevel::Fastest);
            assert_eq!(codec.name(), enc.as_str());
            let compressed = codec.compress(MESSAGE).unwrap();
            assert_eq!(decompress_with_crate(enc.as_str(), &compressed), MESSAGE);
        }
    }

    #[test]
    fn test_codec_trait_is_object_safe() {
        let codecs: Vec<Box<dyn Codec>> = vec![
            Box::new(GzipCodec::default()),
            Box::new(DeflateCodec::default()),
        ];
        for codec in codecs {
            let compressed = codec.compress(MESSAGE).unwrap();
            assert_eq!(decompress_with_crate(codec.name(), &compressed), MESSAGE);
        }
    }

    #[test]
    fn test_boxed_codec_debug() {
        let codec = BoxedCodec::new(LzmaCodec::default());
        let debug_str = format!("{:?}", codec);
        assert!(debug_str.contains("BoxedCodec"));
        assert!(debug_str.contains("lzma"));
    }

    #[test]
    fn test_with_level_clamps() {
        assert_eq!(GzipCodec::with_level(42).level, 9);
        assert_eq!(DeflateCodec::with_level(42).level, 9);
        assert_eq!(BrotliCodec::with_quality(42).quality, 11);
        assert_eq!(ZstdCodec::with_level(0).level, 1);
        assert_eq!(LzmaCodec::with_preset(42).preset, 9);
    }
}
