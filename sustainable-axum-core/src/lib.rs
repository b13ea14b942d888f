//! Core negotiation and codec types for sustainable-axum.
//!
//! This crate is framework independent. It decides *which* compression
//! algorithm a response should use and invokes the matching codec; the
//! `sustainable-axum` crate wires it into a Tower middleware.
//!
//! ## Modules
//!
//! - [`accept`]: `Accept-Encoding` preference parsing
//! - [`compression`]: Supported algorithms, levels, and the selector
//! - [`codec`]: Codec trait, the five built-in codecs, and the invoker
//! - [`error`]: Codec error types

mod accept;
mod codec;
mod compression;
mod error;

pub use accept::*;
pub use codec::*;
pub use compression::*;
pub use error::*;
