//! Per-request orchestration of capability hooks and compression.
//!
//! A request moves through a fixed sequence of phases:
//!
//! ```text
//! Created -> BeforePhaseRunning -> HandlerRunning -> CompressionApplied
//!         -> AfterPhaseRunning -> Finalized
//! ```
//!
//! - before phase: opted-in indicators, registration order; any failure is fatal
//! - handler: the wrapped service, opaque to the pipeline
//! - compression: always runs, independent of the opt-in directive
//! - after phase: discovery header on `OPTIONS`, then opted-in indicators,
//!   then opted-in scores, both in registration order
//!
//! After-phase failures follow [`FailurePolicy`].

use crate::compression::{compress_response, negotiate_response_encoding};
use crate::config::{FailurePolicy, SustainableConfig};
use crate::error::{BoxError, PipelineError};
use crate::header::PerfHeader;
use crate::opt_in::OptIn;
use crate::registry::Registry;
use crate::state::RequestState;
use axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS;
use axum::http::{HeaderValue, Method, Request};
use axum::response::Response;
use sustainable_axum_core::CompressionEncoding;

/// Lifecycle position of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Created,
    BeforePhaseRunning,
    HandlerRunning,
    CompressionApplied,
    AfterPhaseRunning,
    Finalized,
}

impl Phase {
    /// The phase that follows this one, `None` once finalized.
    fn next(self) -> Option<Self> {
        match self {
            Phase::Created => Some(Phase::BeforePhaseRunning),
            Phase::BeforePhaseRunning => Some(Phase::HandlerRunning),
            Phase::HandlerRunning => Some(Phase::CompressionApplied),
            Phase::CompressionApplied => Some(Phase::AfterPhaseRunning),
            Phase::AfterPhaseRunning => Some(Phase::Finalized),
            Phase::Finalized => None,
        }
    }
}

/// Everything the pipeline tracks for one in-flight request.
#[derive(Debug)]
pub struct PerfContext {
    pub state: RequestState,
    opt_in: OptIn,
    encoding: Option<CompressionEncoding>,
    discovery: bool,
    phase: Phase,
}

impl PerfContext {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn opt_in(&self) -> &OptIn {
        &self.opt_in
    }

    /// Encoding negotiated for the response, if any.
    pub fn encoding(&self) -> Option<CompressionEncoding> {
        self.encoding
    }

    /// Whether this is an `OPTIONS` capability-discovery request.
    pub fn is_discovery(&self) -> bool {
        self.discovery
    }

    fn advance(&mut self, to: Phase) -> Result<(), PipelineError> {
        if self.phase.next() != Some(to) {
            return Err(PipelineError::OutOfOrder {
                from: self.phase,
                to,
            });
        }
        tracing::trace!(target: "sustainable_axum", from = ?self.phase, ?to, "phase transition");
        self.phase = to;
        Ok(())
    }
}

/// Runs the phases for each request against a shared registry.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    registry: Registry,
    config: SustainableConfig,
}

impl Pipeline {
    pub fn new(registry: Registry, config: SustainableConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &SustainableConfig {
        &self.config
    }

    /// Create the request context and run the before phase.
    pub fn begin<B>(&self, req: &Request<B>) -> Result<PerfContext, PipelineError> {
        let mut ctx = PerfContext {
            state: RequestState::for_request(req),
            opt_in: OptIn::from_headers(req.headers(), &self.config.opt_in_header),
            encoding: negotiate_response_encoding(&self.config, req.headers()),
            discovery: req.method() == Method::OPTIONS,
            phase: Phase::Created,
        };

        ctx.advance(Phase::BeforePhaseRunning)?;
        for indicator in self.registry.indicators() {
            if !ctx.opt_in.includes(indicator.name()) {
                continue;
            }
            indicator
                .before_request(&mut ctx.state)
                .map_err(|source| PipelineError::BeforePhase {
                    name: indicator.name().to_string(),
                    source,
                })?;
        }

        ctx.advance(Phase::HandlerRunning)?;
        Ok(ctx)
    }

    /// Apply compression and run the after phase on the handler's response.
    ///
    /// Fails with [`PipelineError::OutOfOrder`] unless `ctx` came from
    /// [`begin`](Self::begin) and has not been finished yet.
    pub async fn finish(
        &self,
        ctx: &mut PerfContext,
        response: Response,
    ) -> Result<Response, PipelineError> {
        if ctx.phase != Phase::HandlerRunning {
            return Err(PipelineError::OutOfOrder {
                from: ctx.phase,
                to: Phase::CompressionApplied,
            });
        }
        let mut response = compress_response(response, ctx.encoding, &self.config).await?;
        ctx.advance(Phase::CompressionApplied)?;

        self.after_phase(ctx, &mut response)?;
        ctx.advance(Phase::Finalized)?;
        Ok(response)
    }

    // Discovery, then indicator and score after phases.
    fn after_phase(
        &self,
        ctx: &mut PerfContext,
        response: &mut Response,
    ) -> Result<(), PipelineError> {
        ctx.advance(Phase::AfterPhaseRunning)?;

        if ctx.discovery && !self.registry.is_empty() {
            match HeaderValue::from_str(&self.registry.allow_headers()) {
                Ok(value) => {
                    response
                        .headers_mut()
                        .append(ACCESS_CONTROL_ALLOW_HEADERS, value);
                }
                Err(err) => {
                    tracing::warn!(target: "sustainable_axum", error = %err, "invalid discovery header");
                }
            }
        }

        for indicator in self.registry.indicators() {
            if ctx.opt_in.includes(indicator.name()) {
                let result = indicator.after_request(&mut ctx.state, response);
                self.settle(&**indicator, result)?;
            }
        }
        for score in self.registry.scores() {
            if ctx.opt_in.includes(score.name()) {
                let result = score.after_request(&mut ctx.state, response);
                self.settle(&**score, result)?;
            }
        }
        Ok(())
    }

    fn settle<H: PerfHeader + ?Sized>(
        &self,
        header: &H,
        result: Result<(), BoxError>,
    ) -> Result<(), PipelineError> {
        let Err(source) = result else {
            return Ok(());
        };
        match self.config.after_phase_failure {
            FailurePolicy::Isolate => {
                tracing::warn!(
                    target: "sustainable_axum",
                    capability = header.name(),
                    error = %source,
                    "after phase failed, skipping"
                );
                Ok(())
            }
            FailurePolicy::Abort => Err(PipelineError::AfterPhase {
                name: header.name().to_string(),
                source,
            }),
        }
    }
}
