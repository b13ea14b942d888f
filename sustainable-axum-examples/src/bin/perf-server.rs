//! Example 1: Every built-in indicator and score
//!
//! Run with: cargo run --bin perf-server
//! Test with:
//!   curl -i -H 'Perf: perf-time,perf-cpu,perf-ram,perf-energy,perf-power,perf-score-1' \
//!     -H 'Accept-Encoding: br;q=0.9, gzip' http://localhost:3000/lorem --output -

use sustainable_axum::prelude::*;
use sustainable_axum_examples::{init_tracing, routes, server_addr};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut registry = Registry::new();
    registry.register_indicators(vec![
        Box::new(PerfTime) as Box<dyn Indicator>,
        Box::new(PerfCpu),
        Box::new(PerfRam),
        Box::new(PerfEnergy::default()),
        Box::new(PerfPower::default()),
    ])?;
    registry.register_score(PerfScoreCo2::default())?;

    let app = routes().layer(SustainableLayer::new(registry));

    let addr = server_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("=== Example 1: Perf headers ===");
    println!("Server listening on http://{}", addr);
    println!();
    println!("Discover capabilities with:");
    println!("  curl -i -X OPTIONS http://localhost:{}/", addr.port());

    axum::serve(listener, app).await?;
    Ok(())
}
