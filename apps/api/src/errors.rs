use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::generation::{GenerationError, GenerationStage};
use crate::profiles::ProfileError;
use crate::themes::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every body has the shape `{ "error": <message>, "code": <CODE> }`, plus
/// `stage` and `details` for generation failures.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound(_) => AppError::NotFound(e.to_string()),
            ProfileError::Io { .. } => AppError::Internal(e.into()),
        }
    }
}

/// Bodies that are missing, not JSON, or the wrong shape are client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

fn generation_status(e: &GenerationError) -> StatusCode {
    match e {
        GenerationError::EmptyPrompt => StatusCode::BAD_REQUEST,
        GenerationError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
        GenerationError::Busy | GenerationError::Cancelled => StatusCode::CONFLICT,
        GenerationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GenerationError::Network(_) => StatusCode::BAD_GATEWAY,
        GenerationError::ProviderError { status, .. } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        GenerationError::MalformedResponse { .. }
        | GenerationError::UnexpectedResponseShape { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        GenerationError::NotComponentSource
        | GenerationError::ComponentNameNotFound
        | GenerationError::TranspileError(_)
        | GenerationError::ComponentNotCallable(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, stage, details): (
            StatusCode,
            &str,
            String,
            Option<GenerationStage>,
            Option<Value>,
        ) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None, None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
                None,
            ),
            AppError::Generation(e) => {
                let status = generation_status(e);
                if status.is_server_error() {
                    tracing::error!("Generation error ({}): {e}", e.kind());
                }
                let code = match e {
                    GenerationError::ProviderError { .. } => "PROVIDER_ERROR",
                    _ => "GENERATION_ERROR",
                };
                (status, code, e.to_string(), Some(e.stage()), e.details())
            }
            AppError::Render(RenderError::InvalidAccent(_)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
                None,
                None,
            ),
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    e.to_string(),
                    None,
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(stage) = stage {
            body["stage"] = json!(stage);
        }
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_of(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_credential_body() {
        let (status, body) =
            body_of(AppError::from(GenerationError::MissingCredential).into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "API key not configured");
        assert_eq!(body["stage"], "precondition");
    }

    #[tokio::test]
    async fn test_provider_status_is_propagated() {
        let error = GenerationError::ProviderError {
            status: 401,
            details: json!({"message": "No auth credentials found"}),
        };
        let (status, body) = body_of(AppError::from(error).into_response()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["details"]["message"], "No auth credentials found");
        assert_eq!(body["stage"], "requesting");
    }

    #[test]
    fn test_generation_status_codes() {
        assert_eq!(generation_status(&GenerationError::EmptyPrompt), StatusCode::BAD_REQUEST);
        assert_eq!(generation_status(&GenerationError::Busy), StatusCode::CONFLICT);
        assert_eq!(
            generation_status(&GenerationError::Timeout(Duration::from_secs(60))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            generation_status(&GenerationError::Network("refused".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            generation_status(&GenerationError::NotComponentSource),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            generation_status(&GenerationError::ProviderError {
                status: 200,
                details: Value::Null
            }),
            StatusCode::BAD_GATEWAY
        );
    }
}
