//! # Golden Hearts API Server
//!
//! REST API for the Golden Hearts volunteer-matching platform: volunteers
//! register and maintain profiles, organizations post opportunities, and the
//! front end browses both through the paginated endpoints here.
//!
//! ## Example
//! ```rust,no_run
//! use hearts_server::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     hearts_server::run(config).await
//! }
//! ```

use std::sync::Arc;

use axum::Router;
use hearts_db::DbPool;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::info;

pub mod api;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::ApiError;

/// Module version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers. The database is the only shared
/// mutable state; handlers are otherwise independent request/response cycles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DbPool,
}

/// Build the application router with its middleware layers
pub fn app(state: AppState) -> Router {
    api::router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}

/// Connect to the database and serve the API until shutdown
pub async fn run(config: Config) -> anyhow::Result<()> {
    let address = format!("{}:{}", config.server.host, config.server.port);

    let db = DbPool::connect(&config.database.url).await?;
    let state = AppState {
        config: Arc::new(config),
        db,
    };

    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
