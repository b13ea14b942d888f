//! Example 2: Compression negotiation only
//!
//! Offers zstd and gzip, skips bodies under 256 bytes.
//!
//! Run with: cargo run --bin compression-only
//! Test with:
//!   curl -i -H 'Accept-Encoding: gzip;q=0.5, zstd' http://localhost:3000/lorem --output -

use sustainable_axum::prelude::*;
use sustainable_axum_examples::{init_tracing, routes, server_addr};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SustainableConfig::default()
        .supported([CompressionEncoding::Zstd, CompressionEncoding::Gzip])
        .min_bytes(256);
    let app = routes().layer(SustainableLayer::compression_only(config));

    let addr = server_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "compression-only server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
