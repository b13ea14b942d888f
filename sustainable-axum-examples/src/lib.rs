use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Returns the server address from PORT env var, defaulting to 3000.
pub fn server_addr() -> anyhow::Result<SocketAddr> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    Ok(format!("0.0.0.0:{port}").parse()?)
}

/// Install a fmt subscriber honoring `RUST_LOG`, defaulting to
/// `sustainable_axum=debug`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sustainable_axum=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Routes shared by the example servers.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(|| async { "Welcome!" }))
        .route("/lorem", get(lorem))
}

async fn lorem() -> String {
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(64)
}
