//! HTTP server: the upload form and the summarize proxy endpoint.
//!
//! | Method | Path             | Handler                     |
//! |--------|------------------|-----------------------------|
//! | GET    | `/`              | embedded upload form        |
//! | GET    | `/health`        | liveness probe              |
//! | POST   | `/api/summarize` | upload → poll → generate    |

mod handlers;

pub use handlers::FILE_FIELD;

use crate::config::SummarizeConfig;
use crate::error::SummarizeError;
use crate::gemini::{DocumentService, GeminiClient};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for the web server.
///
/// `service` is `None` when no API key is configured; the summarize handler
/// then answers every request with a configuration error instead of the
/// server refusing to start.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SummarizeConfig>,
    pub service: Option<Arc<dyn DocumentService>>,
}

impl AppState {
    /// Build the state with a [`GeminiClient`] derived from `config`.
    pub fn new(config: SummarizeConfig) -> Result<Self, SummarizeError> {
        let service = GeminiClient::from_config(&config)
            .map_err(|e| SummarizeError::InvalidConfig(e.to_string()))?
            .map(|client| Arc::new(client) as Arc<dyn DocumentService>);
        Ok(Self {
            config: Arc::new(config),
            service,
        })
    }

    /// Build the state around an existing service implementation.
    pub fn with_service(config: SummarizeConfig, service: Arc<dyn DocumentService>) -> Self {
        Self {
            config: Arc::new(config),
            service: Some(service),
        }
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/summarize", post(handlers::summarize))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server.
pub async fn serve(config: SummarizeConfig, addr: SocketAddr) -> std::io::Result<()> {
    if config.api_key.is_none() {
        tracing::warn!("No Gemini API key configured; /api/summarize will answer 500");
    }
    let state = AppState::new(config).map_err(std::io::Error::other)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
