//! Local JSON API over an explorer session.
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - API request/response types (DTOs)
//! - `graph` - builder results to graph payloads, with kind-based styling

mod graph;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use color_eyre::Result;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use lexnet_core::{Config, DataSource, Session};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state for the server.
pub struct AppState {
    /// The explorer session every request acts on.
    pub session: Session<Box<dyn DataSource>>,
    /// Defaults for requests that leave settings out.
    pub config: Config,
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the API server.
pub struct ServeConfig {
    /// Port to listen on.
    pub port: u16,
    /// Whether to open the browser automatically.
    pub open_browser: bool,
    /// Title to load before accepting requests.
    pub title: Option<String>,
}

// =============================================================================
// Server Entry Point
// =============================================================================

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        // Session
        .route("/api/titles", get(handlers::api_titles))
        .route("/api/titles/{id}", post(handlers::api_load_title))
        .route("/api/scope/{scope}", post(handlers::api_switch_scope))
        .route("/api/select", axum::routing::delete(handlers::api_clear_selection))
        .route("/api/select/{id}", post(handlers::api_select))
        .route("/api/search", post(handlers::api_search))
        .route("/api/view", get(handlers::api_view))
        // Explorer
        .route("/api/node/{id}", get(handlers::api_node))
        .route("/api/nodes", get(handlers::api_nodes))
        .route("/api/relationships", get(handlers::api_relationships))
        // CORS for API access
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Start the API server.
pub async fn start_server(config: ServeConfig, app_config: Config) -> Result<()> {
    let session = Session::from_config(&app_config);
    if let Some(title) = &config.title {
        session.load_title(title).await?;
        info!(title = %title, "title loaded at startup");
    }

    let state = Arc::new(AppState {
        session,
        config: app_config,
    });
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let url = format!("http://localhost:{}", config.port);

    println!("Starting Lexnet API server...");
    println!("API: {}", url);
    println!("Press Ctrl+C to stop\n");

    if config.open_browser {
        if let Err(e) = open::that(&url) {
            eprintln!("Could not open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
