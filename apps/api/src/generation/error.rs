//! Error taxonomy of the theme-generation pipeline.
//!
//! Every variant is user-actionable and knows the stage it was raised in, so
//! job outcomes and HTTP responses can report both.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::sandbox::SandboxError;

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Precondition,
    Requesting,
    Validating,
    Sanitizing,
    Compiling,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Prompt is required")]
    EmptyPrompt,

    #[error("API key not configured")]
    MissingCredential,

    #[error("A theme generation is already in progress")]
    Busy,

    #[error("Theme generation was cancelled")]
    Cancelled,

    #[error("Model provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Could not reach the model provider: {0}")]
    Network(String),

    #[error("Model provider returned status {status}")]
    ProviderError { status: u16, details: Value },

    #[error("Model provider returned a body that is not valid JSON")]
    MalformedResponse { details: Value },

    #[error("Model provider response is missing the completion content")]
    UnexpectedResponseShape { details: Value },

    #[error("Generated text is an HTML document, not component source")]
    NotComponentSource,

    #[error("Generated source has no `export default function Name` declaration")]
    ComponentNameNotFound,

    #[error("Generated source could not be transformed: {0}")]
    TranspileError(String),

    #[error("Generated component is not callable: {0}")]
    ComponentNotCallable(String),
}

impl GenerationError {
    pub fn stage(&self) -> GenerationStage {
        match self {
            GenerationError::EmptyPrompt
            | GenerationError::MissingCredential
            | GenerationError::Busy => GenerationStage::Precondition,
            GenerationError::Cancelled
            | GenerationError::Timeout(_)
            | GenerationError::Network(_)
            | GenerationError::ProviderError { .. } => GenerationStage::Requesting,
            GenerationError::MalformedResponse { .. }
            | GenerationError::UnexpectedResponseShape { .. } => GenerationStage::Validating,
            GenerationError::NotComponentSource | GenerationError::ComponentNameNotFound => {
                GenerationStage::Sanitizing
            }
            GenerationError::TranspileError(_) | GenerationError::ComponentNotCallable(_) => {
                GenerationStage::Compiling
            }
        }
    }

    /// Stable machine-readable kind, e.g. `"unexpected_response_shape"`.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::EmptyPrompt => "empty_prompt",
            GenerationError::MissingCredential => "missing_credential",
            GenerationError::Busy => "busy",
            GenerationError::Cancelled => "cancelled",
            GenerationError::Timeout(_) => "timeout",
            GenerationError::Network(_) => "network",
            GenerationError::ProviderError { .. } => "provider_error",
            GenerationError::MalformedResponse { .. } => "malformed_response",
            GenerationError::UnexpectedResponseShape { .. } => "unexpected_response_shape",
            GenerationError::NotComponentSource => "not_component_source",
            GenerationError::ComponentNameNotFound => "component_name_not_found",
            GenerationError::TranspileError(_) => "transpile_error",
            GenerationError::ComponentNotCallable(_) => "component_not_callable",
        }
    }

    /// Structured details for the client, when the failure carries any.
    pub fn details(&self) -> Option<Value> {
        match self {
            GenerationError::ProviderError { details, .. }
            | GenerationError::MalformedResponse { details }
            | GenerationError::UnexpectedResponseShape { details } => Some(details.clone()),
            GenerationError::TranspileError(message)
            | GenerationError::ComponentNotCallable(message)
            | GenerationError::Network(message) => Some(Value::String(message.clone())),
            _ => None,
        }
    }
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Http(e) => GenerationError::Network(e.to_string()),
            LlmError::Timeout(limit) => GenerationError::Timeout(limit),
            LlmError::Api { status, details } => GenerationError::ProviderError { status, details },
            LlmError::Malformed { reason, body } => GenerationError::MalformedResponse {
                details: serde_json::json!({ "reason": reason, "body": body }),
            },
            LlmError::UnexpectedShape { details } => {
                GenerationError::UnexpectedResponseShape { details }
            }
        }
    }
}

impl From<SandboxError> for GenerationError {
    fn from(e: SandboxError) -> Self {
        match e {
            SandboxError::NotCallable { .. } => GenerationError::ComponentNotCallable(e.to_string()),
            other => GenerationError::TranspileError(other.to_string()),
        }
    }
}
