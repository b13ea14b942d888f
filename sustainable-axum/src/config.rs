//! Middleware configuration.

use crate::opt_in::PERF_HEADER;
use sustainable_axum_core::{CompressionConfig, CompressionEncoding, CompressionLevel, SUPPORTED_ALGORITHMS};

/// What to do when a capability's after phase returns an error.
///
/// Before-phase failures are always fatal for the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log a warning, skip the failing capability and keep going.
    #[default]
    Isolate,
    /// Stop the pipeline and answer `500 Internal Server Error`.
    Abort,
}

/// Settings for [`SustainableLayer`](crate::SustainableLayer).
///
/// ```
/// use sustainable_axum::{CompressionEncoding, FailurePolicy, SustainableConfig};
///
/// let config = SustainableConfig::default()
///     .supported([CompressionEncoding::Brotli, CompressionEncoding::Gzip])
///     .min_bytes(256)
///     .after_phase_failure(FailurePolicy::Abort);
/// assert_eq!(config.supported.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SustainableConfig {
    pub compression: CompressionConfig,
    /// Algorithms the server offers, in tie-break order.
    pub supported: Vec<CompressionEncoding>,
    /// Used instead of the request's `Accept-Encoding` when set.
    pub accept_encoding_override: Option<String>,
    pub after_phase_failure: FailurePolicy,
    /// Name of the opt-in request header.
    pub opt_in_header: String,
    /// Largest response body buffered for compression.
    pub max_body_bytes: usize,
}

impl Default for SustainableConfig {
    fn default() -> Self {
        Self {
            compression: CompressionConfig::default(),
            supported: SUPPORTED_ALGORITHMS.to_vec(),
            accept_encoding_override: None,
            after_phase_failure: FailurePolicy::default(),
            opt_in_header: PERF_HEADER.to_string(),
            max_body_bytes: usize::MAX,
        }
    }
}

impl SustainableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the offered algorithms. Earlier entries win quality ties.
    pub fn supported(mut self, supported: impl IntoIterator<Item = CompressionEncoding>) -> Self {
        self.supported = supported.into_iter().collect();
        self
    }

    /// Negotiate against `value` instead of each request's `Accept-Encoding`.
    pub fn accept_encoding_override(mut self, value: impl Into<String>) -> Self {
        self.accept_encoding_override = Some(value.into());
        self
    }

    /// Skip compression for bodies smaller than `min_bytes`.
    pub fn min_bytes(mut self, min_bytes: usize) -> Self {
        self.compression.min_bytes = min_bytes;
        self
    }

    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.compression = self.compression.level(level);
        self
    }

    pub fn after_phase_failure(mut self, policy: FailurePolicy) -> Self {
        self.after_phase_failure = policy;
        self
    }

    pub fn opt_in_header(mut self, header: impl Into<String>) -> Self {
        self.opt_in_header = header.into();
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}
