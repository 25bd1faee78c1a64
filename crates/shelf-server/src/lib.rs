//! Shelf Server - reading list API
//!
//! JSON over HTTP for users, books and collections, plus the derived
//! timeline, table and graph views and CSV import/export.

pub mod http;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use shelf_core::{Clock, ConfigError, GraphOptions, LibraryStore, ShelfConfig, StoreError, SystemClock};

/// Shared application state
pub struct AppState {
    pub store: LibraryStore,
    pub clock: Arc<dyn Clock>,
    pub graph: GraphOptions,
}

impl AppState {
    pub fn new(store: LibraryStore, clock: Arc<dyn Clock>, graph: GraphOptions) -> Self {
        Self { store, clock, graph }
    }

    /// Wall-clock state backed by the configured data directory
    pub fn from_config(config: &ShelfConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = LibraryStore::new(config.storage.data_dir.clone(), clock.clone());
        Self::new(store, clock, config.graph)
    }
}

/// Startup failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::health))
        // User endpoints
        .route("/users", get(http::list_users))
        .route("/users", post(http::create_user))
        .route("/users/{user}", get(http::get_user))
        .route("/users/{user}", put(http::update_user))
        // Book endpoints
        .route("/users/{user}/books", get(http::list_books))
        .route("/users/{user}/books", post(http::create_book))
        .route("/users/{user}/books/{id}", put(http::update_book))
        .route("/users/{user}/books/{id}", delete(http::delete_book))
        // Collection endpoints
        .route("/users/{user}/collections", get(http::list_collections))
        .route("/users/{user}/collections", post(http::create_collection))
        .route("/users/{user}/collections/{id}", put(http::rename_collection))
        .route("/users/{user}/collections/{id}", delete(http::delete_collection))
        .route(
            "/users/{user}/collections/{id}/books",
            get(http::collection_books),
        )
        .route(
            "/users/{user}/collections/{id}/books",
            post(http::add_collection_book),
        )
        .route(
            "/users/{user}/collections/{id}/books/{book_id}",
            delete(http::remove_collection_book),
        )
        // Views
        .route("/users/{user}/timeline", get(http::get_timeline))
        .route("/users/{user}/table", get(http::get_table))
        .route("/users/{user}/graph", get(http::get_graph))
        // CSV
        .route("/users/{user}/export.csv", get(http::export_books))
        .route("/users/{user}/import", post(http::import_books))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), ServerError> {
    state.store.init().await?;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Shelf server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
