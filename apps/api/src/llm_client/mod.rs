/// LLM Client: every model-provider call in the service goes through here.
///
/// Generation code builds requests and reads completions via `LlmClient`;
/// nothing else holds an HTTP client for the provider.
///
/// The provider is any chat-completion endpoint speaking
/// `{model, messages, temperature, max_tokens}` → `{choices:[{message:{content}}]}`.
/// Swapping providers changes only the endpoint URL, the auth header and the model.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

/// How much of an unparseable body is kept for logs and error details.
const RAW_BODY_LOG_LIMIT: usize = 2000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Provider error (status {status})")]
    Api { status: u16, details: Value },

    #[error("Provider returned a body that is not JSON: {reason}")]
    Malformed { reason: String, body: String },

    #[error("Provider response is missing choices[0].message.content")]
    UnexpectedShape { details: Value },
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The raw answer of one POST: status code and body text, unparsed.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub status: u16,
    pub body: String,
}

/// Sampling options. Configuration, not logic.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: Option<f64>,
    /// Upper bound on one provider call, connect to last body byte.
    pub timeout: Duration,
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// Sends one chat request and returns the raw reply. Implement this to point
/// the client at another provider or at a stub in tests.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, request: &ChatRequest) -> Result<ProviderReply, LlmError>;
}

#[derive(Debug, Clone)]
pub enum AuthHeader {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `<name>: <key>`, e.g. `x-api-key`.
    Raw(String),
}

/// reqwest-backed transport for a chat-completion endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    auth: AuthHeader,
    extra_headers: Vec<(String, String)>,
}

impl HttpTransport {
    pub fn from_config(config: &Config, api_key: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        let auth = match config.llm_auth_header.as_deref() {
            None => AuthHeader::Bearer,
            Some(name) if name.eq_ignore_ascii_case("authorization") => AuthHeader::Bearer,
            Some(name) => AuthHeader::Raw(name.to_string()),
        };

        let mut extra_headers = Vec::new();
        if let Some(referer) = &config.llm_app_referer {
            extra_headers.push(("HTTP-Referer".to_string(), referer.clone()));
        }
        if let Some(title) = &config.llm_app_title {
            extra_headers.push(("X-Title".to_string(), title.clone()));
        }

        Ok(Self {
            client,
            endpoint: config.llm_api_url.clone(),
            api_key,
            auth,
            extra_headers,
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post(&self, request: &ChatRequest) -> Result<ProviderReply, LlmError> {
        let mut builder = self.client.post(&self.endpoint).json(request);

        builder = match &self.auth {
            AuthHeader::Bearer => builder.bearer_auth(&self.api_key),
            AuthHeader::Raw(name) => builder.header(name.as_str(), &self.api_key),
        };
        for (name, value) in &self.extra_headers {
            builder = builder.header(name.as_str(), value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        // Body is read as text first; parsing happens in `parse_reply`.
        let body = response.text().await?;

        Ok(ProviderReply { status, body })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client. Wraps a transport with request construction and
/// response-envelope validation. No automatic retries: the provider is billed
/// per call and a failed job needs an explicit resubmission.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn ChatTransport>,
    options: CompletionOptions,
}

impl LlmClient {
    pub fn new(transport: Arc<dyn ChatTransport>, options: CompletionOptions) -> Self {
        Self { transport, options }
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    /// Builds the two-message request: fixed system instruction + user message.
    pub fn build_request(&self, system: &str, user: &str) -> ChatRequest {
        ChatRequest {
            model: self.options.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            top_p: self.options.top_p,
        }
    }

    /// Sends the request and returns the raw reply, abandoning the call once
    /// the configured timeout elapses.
    pub async fn send(&self, request: &ChatRequest) -> Result<ProviderReply, LlmError> {
        let limit = self.options.timeout;
        match tokio::time::timeout(limit, self.transport.post(request)).await {
            Err(_) => Err(LlmError::Timeout(limit)),
            Ok(Err(LlmError::Http(e))) if e.is_timeout() => Err(LlmError::Timeout(limit)),
            Ok(other) => other,
        }
    }
}

/// Validates a raw reply and extracts the completion text.
///
/// - non-2xx → `Api` carrying the provider's `error` payload (or the whole body)
/// - 2xx, body not JSON → `Malformed`
/// - 2xx JSON with an `error` object → `Api`
/// - 2xx JSON without a non-empty `choices[0].message.content` → `UnexpectedShape`
pub fn parse_reply(reply: &ProviderReply) -> Result<String, LlmError> {
    let parsed: Result<Value, _> = serde_json::from_str(&reply.body);

    if !(200..300).contains(&reply.status) {
        let details = match parsed {
            Ok(Value::Object(mut map)) => map
                .remove("error")
                .unwrap_or_else(|| Value::Object(map)),
            Ok(other) => other,
            Err(_) => Value::String(truncate(&reply.body, RAW_BODY_LOG_LIMIT)),
        };
        warn!("Provider returned {}: {}", reply.status, details);
        return Err(LlmError::Api {
            status: reply.status,
            details,
        });
    }

    let data = parsed.map_err(|e| {
        warn!(
            "Provider body is not JSON ({e}); raw body: {}",
            truncate(&reply.body, RAW_BODY_LOG_LIMIT)
        );
        LlmError::Malformed {
            reason: e.to_string(),
            body: truncate(&reply.body, RAW_BODY_LOG_LIMIT),
        }
    })?;

    if let Some(error) = data.get("error").filter(|e| !e.is_null()) {
        return Err(LlmError::Api {
            status: reply.status,
            details: error.clone(),
        });
    }

    let content = data
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty());

    match content {
        Some(content) => {
            debug!("Provider returned {} chars of completion", content.len());
            Ok(content.to_string())
        }
        None => Err(LlmError::UnexpectedShape {
            details: Value::String(
                "Response missing expected 'choices' array or message content".to_string(),
            ),
        }),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
