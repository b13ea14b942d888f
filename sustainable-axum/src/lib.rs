//! # Sustainable Axum
//!
//! Tower middleware for [Axum](https://github.com/tokio-rs/axum) that makes
//! responses cheaper to send and lets clients measure what they cost.
//!
//! ## Features
//!
//! - **Content negotiation:** every response body is compressed with the best
//!   algorithm the client accepts out of `lzma`, `zstd`, `br`, `gzip` and
//!   `deflate`, weighted by `Accept-Encoding` quality values.
//! - **Opt-in performance headers:** registered [`Indicator`]s and [`Score`]s
//!   run only when the client names them in the `Perf` request header, e.g.
//!   `Perf: perf-time,perf-cpu`.
//! - **Discovery:** `OPTIONS` requests list every registered capability in
//!   `Access-Control-Allow-Headers`.
//! - **Request isolation:** capabilities share data through a [`RequestState`]
//!   that lives for exactly one request.
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use sustainable_axum::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! registry.register_indicator(PerfTime)?;
//! registry.register_indicator(PerfEnergy::default())?;
//! registry.register_score(PerfScoreCo2::default())?;
//!
//! let app = Router::new()
//!     .route("/", get(|| async { "Welcome!" }))
//!     .layer(SustainableLayer::new(registry));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod config;
pub mod error;
pub mod header;
pub mod indicator;
pub mod layer;
pub mod opt_in;
pub mod pipeline;
pub mod registry;
pub mod score;
pub mod state;

pub use config::{FailurePolicy, SustainableConfig};
pub use error::{BoxError, PipelineError, RegistrationError};
pub use header::{Indicator, PerfHeader, Score, insert_metric, read_metric};
pub use layer::{SustainableLayer, SustainableService};
pub use opt_in::OptIn;
pub use pipeline::{Pipeline, Phase};
pub use registry::Registry;
pub use state::RequestState;

// Re-export core types
pub use sustainable_axum_core::{
    AcceptEncoding, CodecError, CompressionConfig, CompressionEncoding, CompressionLevel,
    SUPPORTED_ALGORITHMS, invoke, select,
};

pub mod prelude {
    //! A prelude providing the most common types.
    pub use crate::config::{FailurePolicy, SustainableConfig};
    pub use crate::error::{BoxError, RegistrationError};
    pub use crate::header::{Indicator, PerfHeader, Score, insert_metric, read_metric};
    pub use crate::indicator::{PerfCpu, PerfEnergy, PerfPower, PerfRam, PerfTime};
    pub use crate::layer::SustainableLayer;
    pub use crate::registry::Registry;
    pub use crate::score::PerfScoreCo2;
    pub use crate::state::RequestState;
    pub use sustainable_axum_core::CompressionEncoding;
}
