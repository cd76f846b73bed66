//! Axum route handlers for the theme-generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::error::GenerationError;
use crate::generation::pipeline::{GeneratedSource, GenerationStatus};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateThemeRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-theme
///
/// Generates a theme from a free-text prompt and installs it as `ai-generated`.
/// Responds once the job reaches a terminal state. A body without a usable
/// string `prompt` is a 400 like a blank prompt.
pub async fn handle_generate_theme(
    State(state): State<AppState>,
    payload: Result<Json<GenerateThemeRequest>, JsonRejection>,
) -> Result<Json<GeneratedSource>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::Validation(format!(
            "{}: {}",
            GenerationError::EmptyPrompt,
            rejection.body_text()
        ))
    })?;
    let prompt = request.prompt.unwrap_or_default();
    let generated = state.generator.generate(&prompt).await?;
    Ok(Json(generated))
}

/// GET /api/generate-theme/status
pub async fn handle_generation_status(State(state): State<AppState>) -> Json<GenerationStatus> {
    Json(state.generator.status())
}

/// POST /api/generate-theme/cancel
pub async fn handle_cancel_generation(State(state): State<AppState>) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: state.generator.cancel(),
    })
}

/// GET /api/generate-theme/source
///
/// Downloads the source of the live generated theme as `<Name>.jsx`.
pub async fn handle_download_source(State(state): State<AppState>) -> Result<Response, AppError> {
    let theme = state
        .registry
        .generated()
        .ok_or_else(|| AppError::NotFound("No generated theme yet".to_string()))?;

    let source = theme.source();
    let disposition = format!("attachment; filename=\"{}.jsx\"", source.component_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        source.code.clone(),
    )
        .into_response())
}
