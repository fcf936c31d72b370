use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::domain::tts::LanguageCode;
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::ModelRegistry;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Per-language model status. Never loads a model.
pub async fn health_ready(State(registry): State<Arc<ModelRegistry>>) -> AppResult<Json<Value>> {
    // Status checks stat the model files
    let statuses = tokio::task::spawn_blocking(move || {
        LanguageCode::ALL.map(|language| (language, registry.status(language)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("readiness check failed: {}", e)))?;

    let mut models = Map::new();
    for (language, status) in statuses {
        let status = serde_json::to_value(status).unwrap_or(Value::Null);
        models.insert(language.as_str().to_string(), status);
    }

    Ok(Json(json!({
        "status": "ready",
        "models": models,
    })))
}
