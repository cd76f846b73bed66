use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::profile::ProfileDocument;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<String>,
}

/// GET /api/profiles
pub async fn handle_list_profiles(State(state): State<AppState>) -> Json<ProfileListResponse> {
    Json(ProfileListResponse {
        profiles: state.profiles.names(),
    })
}

/// GET /api/profiles/:name
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProfileDocument>, AppError> {
    let profile = state.profiles.get(&name)?;
    Ok(Json(profile.as_ref().clone()))
}
