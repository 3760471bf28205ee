use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::api::models::{GenerateRequest, GenerateResponse, HealthResponse};
use crate::app_state::AppState;
use crate::error::InferenceError;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.client.endpoint_id().to_string(),
    })
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, InferenceError> {
    let Json(payload) =
        payload.map_err(|rejection| InferenceError::Validation(rejection.body_text()))?;

    tracing::info!(prompt_chars = payload.prompt.chars().count(), "Generate request");

    let result = state.client.generate(&payload.prompt).await?;

    tracing::info!(response_chars = result.text.chars().count(), "Generated text");

    Ok(Json(GenerateResponse {
        response: result.text,
    }))
}
