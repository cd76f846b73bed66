use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileDocument;
use crate::render::RenderedPortfolio;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub theme: Option<String>,
    pub sample: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub theme: Option<String>,
    pub sample: Option<String>,
    /// Inline profile document; takes precedence over `sample`.
    pub profile: Option<Value>,
}

#[derive(Serialize)]
pub struct ThemeListResponse {
    pub themes: Vec<String>,
    pub default: String,
    pub generated: Option<GeneratedThemeInfo>,
}

#[derive(Serialize)]
pub struct GeneratedThemeInfo {
    pub component_name: String,
    pub job_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccentBody {
    pub color: String,
}

/// GET /api/themes
pub async fn handle_list_themes(State(state): State<AppState>) -> Json<ThemeListResponse> {
    Json(ThemeListResponse {
        themes: state.registry.keys(),
        default: state.registry.default_key().to_string(),
        generated: state.registry.generated().map(|theme| GeneratedThemeInfo {
            component_name: theme.component_name().to_string(),
            job_id: theme.job_id,
            created_at: theme.created_at,
        }),
    })
}

/// GET /portfolio?theme=&sample=
pub async fn handle_portfolio_page(
    State(state): State<AppState>,
    Query(params): Query<PortfolioQuery>,
) -> Result<Html<String>, AppError> {
    let profile = state.profiles.select(params.sample.as_deref())?;
    let rendered = render_blocking(&state, params.theme, profile, true).await?;
    Ok(Html(rendered.html))
}

/// POST /api/render
pub async fn handle_render(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderedPortfolio>, AppError> {
    let Json(request) = payload?;
    let profile = match request.profile {
        Some(value) => Arc::new(
            serde_json::from_value::<ProfileDocument>(value)
                .map_err(|e| AppError::Validation(format!("profile must be an object: {e}")))?,
        ),
        None => state.profiles.select(request.sample.as_deref())?,
    };
    let rendered = render_blocking(&state, request.theme, profile, false).await?;
    Ok(Json(rendered))
}

/// GET /api/accent
pub async fn handle_get_accent(State(state): State<AppState>) -> Json<AccentBody> {
    Json(AccentBody {
        color: state.accent.current(),
    })
}

/// PUT /api/accent
pub async fn handle_put_accent(
    State(state): State<AppState>,
    payload: Result<Json<AccentBody>, JsonRejection>,
) -> Result<Json<AccentBody>, AppError> {
    let Json(body) = payload?;
    let color = state.accent.publish(&body.color)?;
    Ok(Json(AccentBody { color }))
}

/// Generated themes evaluate in the sandbox, so rendering goes to the blocking pool.
async fn render_blocking(
    state: &AppState,
    theme: Option<String>,
    profile: Arc<ProfileDocument>,
    page: bool,
) -> Result<RenderedPortfolio, AppError> {
    let renderer = state.renderer.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        if page {
            renderer.render_page(theme.as_deref(), &profile)
        } else {
            renderer.render(theme.as_deref(), &profile)
        }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;
    Ok(rendered)
}
