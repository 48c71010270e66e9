pub mod health;

use std::io::ErrorKind;

use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::errors::AppError;
use crate::exploration::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.public_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(index_handler))
        // Exploration API. Everything under /api/ bypasses the offline cache
        .route("/api/explore", post(handlers::handle_explore))
        .route("/api/chat", post(handlers::handle_chat))
        .route("/api/search", post(handlers::handle_search))
        .route("/api/status", get(handlers::handle_status))
        .fallback_service(static_files)
        .with_state(state)
}

/// GET /
/// Serves the root document from the public directory.
async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let path = state.config.public_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "{} does not exist",
            path.display()
        ))),
        Err(e) => Err(AppError::Internal(
            anyhow::Error::new(e).context(format!("Failed to read {}", path.display())),
        )),
    }
}
