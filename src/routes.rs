use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::compliance::audit;
use crate::engine::curated::CuratedTable;
use crate::engine::error::{FeedbackError, TranslationError};
use crate::engine::types::{TranslationFeedback, TranslationRequest, TranslationResponse};
use crate::language::registry;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))
        // Translation API
        .route("/api/v1/slang/translate", post(translate))
        .route("/api/v1/slang/quick-translate", post(quick_translate))
        .route("/api/v1/slang/languages", get(supported_languages))
        .route("/api/v1/slang/translations/:id/feedback", post(submit_feedback))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "paeon-slang-engine",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.config.llm_config.provider.clone(),
        "curated_phrases": CuratedTable::builtin().phrase_count(),
        "supported_languages": registry::SUPPORTED_LANGUAGES.len(),
        "stored_translations": state.store.len(),
    }))
}

/// Full translation: validate, map, audit, and keep the record so
/// clinician feedback can land on it later.
async fn translate(
    State(state): State<AppState>,
    Json(payload): Json<TranslationRequest>,
) -> Result<Json<TranslationResponse>, (StatusCode, Json<Value>)> {
    let response = state
        .resolver
        .translate(&payload)
        .await
        .map_err(validation_error)?;

    audit::log_translation(&response, payload.session_id.as_deref());
    state.store.insert(response.clone());
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct QuickTranslateRequest {
    text: String,
}

/// Demo endpoint: same pipeline, trimmed response, nothing stored.
async fn quick_translate(
    State(state): State<AppState>,
    Json(payload): Json<QuickTranslateRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let request = TranslationRequest::new(payload.text);
    let response = state
        .resolver
        .translate(&request)
        .await
        .map_err(validation_error)?;

    audit::log_translation(&response, None);
    Ok(Json(json!({
        "input": response.raw_input,
        "language": response.original_language,
        "clinical": response.clinical_interpretation,
        "confidence": (response.confidence * 100.0).round() as u32,
        "codes": response.standard_codes,
    })))
}

async fn supported_languages() -> Json<Value> {
    Json(json!(registry::SUPPORTED_LANGUAGES))
}

async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(feedback): Json<TranslationFeedback>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.store.apply_feedback(id, &feedback) {
        Ok(updated) => {
            audit::log_feedback(updated.id, feedback.approved, updated.edited);
            Ok(Json(json!({
                "status": "success",
                "message": "Feedback recorded",
                "translation_id": updated.id,
                "approved": feedback.approved,
                "edited": updated.edited,
            })))
        }
        Err(err @ FeedbackError::UnknownTranslation(_)) => {
            Err((StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() }))))
        }
        Err(err @ FeedbackError::CorrectionTooLong { .. }) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.to_string() })),
        )),
    }
}

fn validation_error(err: TranslationError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": err.to_string() })),
    )
}
