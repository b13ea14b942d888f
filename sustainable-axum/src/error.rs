//! Error types for registration and per-request pipeline failures.
//!
//! - [`RegistrationError`]: a capability broke its naming contract at setup
//! - [`PipelineError`]: a capability hook or body read failed during a request
//!
//! Compression failures are not errors at this level; the pipeline logs them
//! and sends the body uncompressed.

use crate::pipeline::Phase;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Boxed error returned by capability hooks.
pub use tower::BoxError;

/// Error raised when registering an indicator or score.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The capability's name does not satisfy the registry contract.
    #[error("contract violation for {name:?}: {reason}")]
    ContractViolation { name: String, reason: &'static str },
}

impl RegistrationError {
    pub(crate) fn contract(name: &str, reason: &'static str) -> Self {
        RegistrationError::ContractViolation {
            name: name.to_string(),
            reason,
        }
    }

    /// The offending capability name.
    pub fn name(&self) -> &str {
        match self {
            RegistrationError::ContractViolation { name, .. } => name,
        }
    }
}

/// Error that aborts a single request's pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An indicator's before phase failed. Always fatal for the request.
    #[error("before phase of {name:?} failed: {source}")]
    BeforePhase {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A capability's after phase failed under [`FailurePolicy::Abort`].
    ///
    /// [`FailurePolicy::Abort`]: crate::config::FailurePolicy::Abort
    #[error("after phase of {name:?} failed: {source}")]
    AfterPhase {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The inner service's response body could not be buffered.
    #[error("failed to read response body: {0}")]
    Body(#[source] axum::Error),

    /// A request context was driven out of phase order, e.g. finished twice.
    #[error("phase {to:?} cannot follow {from:?}")]
    OutOfOrder { from: Phase, to: Phase },
}

impl PipelineError {
    /// Name of the capability that failed, if any.
    pub fn capability(&self) -> Option<&str> {
        match self {
            PipelineError::BeforePhase { name, .. } | PipelineError::AfterPhase { name, .. } => {
                Some(name)
            }
            PipelineError::Body(_) | PipelineError::OutOfOrder { .. } => None,
        }
    }
}

impl IntoResponse for PipelineError {
    /// Clients receive a generic 500; details stay in the server log.
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
    }
}
