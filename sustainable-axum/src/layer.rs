//! Tower middleware wiring the [`Pipeline`] around an axum service.
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use sustainable_axum::indicator::{PerfCpu, PerfTime};
//! use sustainable_axum::{Registry, SustainableLayer};
//!
//! # fn main() -> Result<(), sustainable_axum::RegistrationError> {
//! let mut registry = Registry::new();
//! registry.register_indicator(PerfTime)?;
//! registry.register_indicator(PerfCpu)?;
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "Welcome!" }))
//!     .layer(SustainableLayer::new(registry));
//! # Ok(())
//! # }
//! ```
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │             SustainableLayer              │  ← before phase / compression / after phase
//! │  ┌─────────────────────────────────────┐  │
//! │  │               Handler               │  │  ← your routes
//! │  └─────────────────────────────────────┘  │
//! └───────────────────────────────────────────┘
//! ```
//!
//! Pipeline failures never reach the inner service's error type; they are
//! logged and answered with `500 Internal Server Error`.

use crate::config::SustainableConfig;
use crate::pipeline::Pipeline;
use crate::registry::Registry;
use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service, ServiceExt};

/// Layer applying compression negotiation and opt-in performance headers.
#[derive(Debug, Clone, Default)]
pub struct SustainableLayer {
    pipeline: Arc<Pipeline>,
}

impl SustainableLayer {
    /// Create a layer with the default configuration.
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, SustainableConfig::default())
    }

    pub fn with_config(registry: Registry, config: SustainableConfig) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(registry, config)),
        }
    }

    /// Compression only, no capabilities registered.
    pub fn compression_only(config: SustainableConfig) -> Self {
        Self::with_config(Registry::new(), config)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl<S> Layer<S> for SustainableLayer {
    type Service = SustainableService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SustainableService {
            inner,
            pipeline: self.pipeline.clone(),
        }
    }
}

/// Service produced by [`SustainableLayer`].
#[derive(Debug, Clone)]
pub struct SustainableService<S> {
    inner: S,
    pipeline: Arc<Pipeline>,
}

impl<S> Service<Request<Body>> for SustainableService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let pipeline = self.pipeline.clone();

        let mut ctx = match pipeline.begin(&req) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::error!(
                    target: "sustainable_axum",
                    capability = err.capability(),
                    error = %err,
                    "request aborted before handler"
                );
                return Box::pin(async move { Ok(err.into_response()) });
            }
        };

        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move {
            let response = inner.oneshot(req).await?;
            match pipeline.finish(&mut ctx, response).await {
                Ok(response) => Ok(response),
                Err(err) => {
                    tracing::error!(
                        target: "sustainable_axum",
                        capability = err.capability(),
                        error = %err,
                        "request aborted after handler"
                    );
                    Ok(err.into_response())
                }
            }
        })
    }
}
