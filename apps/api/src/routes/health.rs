use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version, whether generation is available, and the job phase.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let status = state.generator.status();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "folio-api",
        "generation": {
            "configured": state.generator.has_credential(),
            "model": state.config.llm_model,
            "busy": status.busy,
        }
    }))
}
