//! Shelf Server Binary
//!
//! Standalone server for the shelf reading-list API.

use std::sync::Arc;

use shelf_core::ShelfConfig;
use shelf_server::{serve, AppState, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ShelfConfig::load()?;

    // Initialize logging; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = Arc::new(AppState::from_config(&config));
    serve(&config.server.bind_addr, state).await
}
