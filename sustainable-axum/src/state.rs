//! Request-scoped state shared between a capability's before and after phases.
//!
//! A fresh [`RequestState`] is created for every request by the pipeline and
//! dropped when the response is finalized. It is passed explicitly to every
//! hook, so two in-flight requests can never observe each other's values.

use axum::http::{HeaderMap, Method, Request};
use http::Extensions;
use std::fmt;

/// Per-request scratch space, keyed by type.
///
/// Indicators store a value in their before phase and read it back in their
/// after phase:
///
/// ```
/// use std::time::Instant;
/// use sustainable_axum::RequestState;
///
/// #[derive(Clone)]
/// struct Started(Instant);
///
/// let mut state = RequestState::default();
/// state.insert(Started(Instant::now()));
/// assert!(state.get::<Started>().is_some());
/// ```
///
/// It also exposes a read-only view of the inbound request head.
#[derive(Default)]
pub struct RequestState {
    values: Extensions,
    method: Method,
    headers: HeaderMap,
}

impl RequestState {
    /// Create state for a request with the given method and headers.
    pub fn new(method: Method, headers: HeaderMap) -> Self {
        Self {
            values: Extensions::new(),
            method,
            headers,
        }
    }

    pub(crate) fn for_request<B>(req: &Request<B>) -> Self {
        Self::new(req.method().clone(), req.headers().clone())
    }

    /// Insert a value, returning the previous value of the same type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values.insert(value)
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.values.get_mut::<T>()
    }

    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.values.remove::<T>()
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Method of the inbound request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Headers of the inbound request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Debug for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestState")
            .field("entries", &self.values.len())
            .field("method", &self.method)
            .finish()
    }
}
