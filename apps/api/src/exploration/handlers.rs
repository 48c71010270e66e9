//! Axum route handlers for the exploration API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::config::Availability;
use crate::errors::AppError;
use crate::exploration::assistant::{
    answer_question, search, AssistantReply, ChatRequest, SearchRequest,
};
use crate::exploration::pipeline::{run_exploration, ExplorationReport};
use crate::models::profile::{lenient_profile, Profile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExploreRequest {
    /// Absent, `null` or malformed profile is explored with every default.
    #[serde(default, deserialize_with = "lenient_profile")]
    pub profile: Option<Profile>,
}

/// POST /api/explore
///
/// Runs the full three-phase pipeline. Always answers 200: provider failures
/// are reported in `errors`.
pub async fn handle_explore(
    State(state): State<AppState>,
    Json(request): Json<ExploreRequest>,
) -> Json<ExplorationReport> {
    let profile = request.profile.unwrap_or_default();
    info!("Exploration requested for {}", profile.location());
    let result = run_exploration(state.llm.as_ref(), &state.prompts, &profile).await;
    Json(result.into())
}

/// POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AssistantReply>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }

    info!("Chat question: {}", request.question);
    Ok(Json(
        answer_question(state.llm.as_ref(), &state.prompts, &request).await,
    ))
}

/// POST /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<AssistantReply>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    info!(
        "Search: {} | scope: {}",
        request.query,
        request.scope.as_deref().unwrap_or("-")
    );
    Ok(Json(search(state.llm.as_ref(), &state.prompts, &request).await))
}

/// GET /api/status
///
/// Credential-presence flags, one per provider.
pub async fn handle_status(State(state): State<AppState>) -> Json<Availability> {
    Json(state.llm.availability())
}
