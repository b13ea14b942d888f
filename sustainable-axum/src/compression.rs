//! Response compression for buffered HTTP bodies.
//!
//! Uses standard HTTP headers: `Accept-Encoding` / `Content-Encoding`.
//! Negotiation and codecs live in `sustainable-axum-core`; this module applies
//! the result to an axum [`Response`].
//!
//! Compression never fails a request. When the codec errors the body is sent
//! as it was and the failure is logged.

use crate::config::SustainableConfig;
use crate::error::PipelineError;
use axum::body::Body;
use axum::http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, VARY};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use bytes::Bytes;
use sustainable_axum_core::{
    AcceptEncoding, CodecError, CompressionConfig, CompressionEncoding, compress_with, select,
};

/// Negotiate the response encoding for a request carrying `request_headers`.
///
/// A configured override takes precedence over the request's
/// `Accept-Encoding`. With neither, nothing is selected.
pub fn negotiate_response_encoding(
    config: &SustainableConfig,
    request_headers: &HeaderMap,
) -> Option<CompressionEncoding> {
    let header = request_headers
        .get(ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok());
    let accept = AcceptEncoding::parse_or(config.accept_encoding_override.as_deref(), header);
    select(&config.supported, &accept)
}

/// Compress a buffered body, updating `headers` to match.
///
/// Returns the body unchanged when `encoding` is `None`, when the body is
/// below the configured minimum size, or when the codec fails.
pub fn encode_body(
    headers: &mut HeaderMap,
    body: Bytes,
    encoding: Option<CompressionEncoding>,
    config: &CompressionConfig,
) -> Bytes {
    let Some(encoding) = encoding else {
        return body;
    };
    if body.len() < config.min_bytes {
        tracing::trace!(
            target: "sustainable_axum",
            len = body.len(),
            min_bytes = config.min_bytes,
            "body below compression threshold"
        );
        return body;
    }

    match compress_with(encoding, &body, config.level) {
        Ok(compressed) => {
            tracing::debug!(
                target: "sustainable_axum",
                encoding = %encoding,
                original = body.len(),
                compressed = compressed.len(),
                "compressed response body"
            );
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()));
            headers.remove(CONTENT_LENGTH);
            compressed
        }
        Err(CodecError::EmptyBody) => {
            tracing::debug!(target: "sustainable_axum", encoding = %encoding, "empty body, not compressed");
            body
        }
        Err(err) => {
            tracing::warn!(
                target: "sustainable_axum",
                encoding = %encoding,
                error = %err,
                "compression failed, sending uncompressed body"
            );
            body
        }
    }
}

/// Compress `response` with `encoding`.
///
/// Responses that already carry a `Content-Encoding` are returned untouched.
/// Otherwise the body is buffered (up to `max_body_bytes`) and compressed, and
/// `Vary: Accept-Encoding` is added. Only a body read failure is an error.
pub async fn compress_response(
    response: Response,
    encoding: Option<CompressionEncoding>,
    config: &SustainableConfig,
) -> Result<Response, PipelineError> {
    if response.headers().contains_key(CONTENT_ENCODING) {
        tracing::trace!(target: "sustainable_axum", "response already encoded");
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();
    add_vary(&mut parts.headers);

    let Some(encoding) = encoding else {
        return Ok(Response::from_parts(parts, body));
    };

    let bytes = axum::body::to_bytes(body, config.max_body_bytes)
        .await
        .map_err(PipelineError::Body)?;
    let bytes = encode_body(&mut parts.headers, bytes, Some(encoding), &config.compression);
    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn add_vary(headers: &mut HeaderMap) {
    let present = headers
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|v| {
            let v = v.trim();
            v == "*" || v.eq_ignore_ascii_case("accept-encoding")
        });
    if !present {
        headers.append(VARY, HeaderValue::from_static("accept-encoding"));
    }
}
