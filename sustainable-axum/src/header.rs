//! Capability contracts for performance headers.
//!
//! Every capability has a name and an after phase ([`PerfHeader`]). There are
//! two kinds:
//!
//! - [`Indicator`]: also runs a before phase, usually to record a starting
//!   measurement in [`RequestState`].
//! - [`Score`]: after phase only. Scores run after every indicator and derive
//!   their value from indicator headers already on the response.
//!
//! A capability runs for a request only when the client names it in the
//! `Perf` request header (see [`OptIn`](crate::OptIn)).
//!
//! # Example
//!
//! ```
//! use axum::response::Response;
//! use sustainable_axum::{insert_metric, BoxError, PerfHeader, RequestState, Score};
//!
//! struct Doubled;
//!
//! impl PerfHeader for Doubled {
//!     fn name(&self) -> &str {
//!         "Perf-Score-2"
//!     }
//!
//!     fn after_request(&self, _: &mut RequestState, response: &mut Response) -> Result<(), BoxError> {
//!         let Some(time) = response.headers().get("perf-time") else {
//!             return Ok(());
//!         };
//!         let time: f64 = time.to_str()?.parse()?;
//!         insert_metric(response, self.name(), time * 2.0, 5)
//!     }
//! }
//!
//! impl Score for Doubled {}
//! ```

use crate::error::BoxError;
use crate::state::RequestState;
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;

/// Reserved prefix for every capability name (matched case-insensitively).
pub const PERF_PREFIX: &str = "Perf-";

/// Reserved prefix for score names; followed by the score's sequence number.
pub const SCORE_PREFIX: &str = "Perf-Score-";

/// Decimal places for indicators measuring time or resource usage.
pub const INDICATOR_PRECISION: usize = 5;

/// Decimal places for CO2-style scores.
pub const SCORE_PRECISION: usize = 16;

/// Shared contract of indicators and scores.
pub trait PerfHeader: Send + Sync + 'static {
    /// Header name requested by clients and written on the response.
    ///
    /// Must start with [`PERF_PREFIX`] and be a valid HTTP header name.
    fn name(&self) -> &str;

    /// Called after the handler, once the response body has been compressed.
    ///
    /// Add a header named [`name`](Self::name) when there is something to
    /// report. Missing inputs are not an error: add nothing and return `Ok`.
    fn after_request(&self, state: &mut RequestState, response: &mut Response)
    -> Result<(), BoxError>;
}

/// A measurement with a before phase.
pub trait Indicator: PerfHeader {
    /// Called before the handler. Failures abort the request.
    fn before_request(&self, state: &mut RequestState) -> Result<(), BoxError>;
}

/// A derived metric computed from indicator output.
///
/// The name must be [`SCORE_PREFIX`] followed by a number, e.g. `Perf-Score-1`.
pub trait Score: PerfHeader {}

/// Format `value` with `precision` decimals and set it as header `name`.
pub fn insert_metric(
    response: &mut Response,
    name: &str,
    value: f64,
    precision: usize,
) -> Result<(), BoxError> {
    let name = HeaderName::from_bytes(name.as_bytes())?;
    let value = HeaderValue::from_str(&format!("{value:.precision$}"))?;
    response.headers_mut().insert(name, value);
    Ok(())
}

/// Read a numeric header written by another capability.
///
/// Returns `None` when the header is absent or not a number.
pub fn read_metric(response: &Response, name: &str) -> Option<f64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
