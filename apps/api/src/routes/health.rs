use axum::{extract::State, Json};
use serde::Serialize;

use crate::llm_client::ProviderKind;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    /// Labels of providers with a configured credential.
    pub providers: Vec<&'static str>,
}

/// GET /health
/// Liveness plus the providers this instance can reach. Never fails, even
/// with zero providers configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Health> {
    let availability = state.llm.availability();
    let providers = ProviderKind::ALL
        .into_iter()
        .filter(|kind| availability.contains(*kind))
        .map(ProviderKind::label)
        .collect();

    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        service: "orientation-api",
        providers,
    })
}
