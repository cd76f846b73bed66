pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::profiles::handlers as profiles;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Portfolio rendering
        .route("/portfolio", get(render::handle_portfolio_page))
        .route("/api/themes", get(render::handle_list_themes))
        .route("/api/render", post(render::handle_render))
        .route(
            "/api/accent",
            get(render::handle_get_accent).put(render::handle_put_accent),
        )
        // Sample profiles
        .route("/api/profiles", get(profiles::handle_list_profiles))
        .route("/api/profiles/:name", get(profiles::handle_get_profile))
        // Theme generation
        .route("/api/generate-theme", post(generation::handle_generate_theme))
        .route(
            "/api/generate-theme/status",
            get(generation::handle_generation_status),
        )
        .route(
            "/api/generate-theme/cancel",
            post(generation::handle_cancel_generation),
        )
        .route(
            "/api/generate-theme/source",
            get(generation::handle_download_source),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::generation::ThemeGenerator;
    use crate::llm_client::{
        ChatRequest, ChatTransport, CompletionOptions, LlmClient, LlmError, ProviderReply,
    };
    use crate::models::profile::ProfileDocument;
    use crate::profiles::ProfileStore;
    use crate::render::{AccentChannel, Renderer};
    use crate::sandbox::SandboxLimits;
    use crate::themes::ThemeRegistry;

    struct FixedReply(ProviderReply);

    #[async_trait]
    impl ChatTransport for FixedReply {
        async fn post(&self, _request: &ChatRequest) -> Result<ProviderReply, LlmError> {
            Ok(self.0.clone())
        }
    }

    fn test_config() -> Config {
        Config {
            port: 0,
            rust_log: "info".to_string(),
            llm_api_key: None,
            llm_api_url: "http://localhost/unused".to_string(),
            llm_model: "test-model".to_string(),
            llm_auth_header: None,
            llm_app_referer: None,
            llm_app_title: None,
            llm_temperature: 0.8,
            llm_max_tokens: 8000,
            llm_top_p: Some(0.9),
            llm_timeout_secs: 60,
            sandbox_timeout_ms: 2000,
            sandbox_loop_limit: 1_000_000,
            profiles_dir: "data/profiles".into(),
            default_theme: "minimal".to_string(),
            default_accent: "#6366f1".to_string(),
        }
    }

    fn app_with(reply: Option<ProviderReply>) -> Router {
        let config = test_config();
        let registry = Arc::new(ThemeRegistry::new(&config.default_theme));
        let accent = AccentChannel::new(&config.default_accent).unwrap();
        let llm = reply.map(|reply| {
            LlmClient::new(
                Arc::new(FixedReply(reply)),
                CompletionOptions {
                    timeout: Duration::from_secs(5),
                    ..config.completion_options()
                },
            )
        });
        let profiles = ProfileStore::from_profiles([(
            "sample1".to_string(),
            ProfileDocument {
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                ..Default::default()
            },
        )]);

        build_router(AppState {
            generator: Arc::new(ThemeGenerator::new(
                llm,
                registry.clone(),
                SandboxLimits::default(),
            )),
            renderer: Renderer::new(registry.clone(), &accent),
            registry,
            accent,
            profiles: Arc::new(profiles),
            config,
        })
    }

    fn completion(content: &str) -> ProviderReply {
        ProviderReply {
            status: 200,
            body: json!({"choices": [{"message": {"content": content}}]}).to_string(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_with(None);
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["service"], "folio-api");
        assert_eq!(body["generation"]["configured"], false);
    }

    #[tokio::test]
    async fn test_blank_prompt_is_400() {
        let app = app_with(Some(completion("unused")));
        for body in [json!({"prompt": "  "}), json!({})] {
            let (status, bytes) =
                send(&app, json_request("POST", "/api/generate-theme", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"], "Prompt is required");
        }
    }

    #[tokio::test]
    async fn test_unusable_generate_body_is_json_400() {
        let app = app_with(Some(completion("unused")));
        let requests = [
            json_request("POST", "/api/generate-theme", json!({"prompt": 42})),
            Request::builder()
                .method("POST")
                .uri("/api/generate-theme")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
            Request::builder()
                .method("POST")
                .uri("/api/generate-theme")
                .body(Body::empty())
                .unwrap(),
        ];
        for request in requests {
            let (status, bytes) = send(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert!(
                body["error"].as_str().unwrap().starts_with("Prompt is required"),
                "{body}"
            );
            assert_eq!(body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_malformed_accent_body_is_json_400() {
        let app = app_with(None);
        let (status, bytes) = send(
            &app,
            json_request("PUT", "/api/accent", json!({"colour": "#fff"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_key_is_500() {
        let app = app_with(None);
        let (status, bytes) = send(
            &app,
            json_request("POST", "/api/generate-theme", json!({"prompt": "ocean"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "API key not configured");
    }

    #[tokio::test]
    async fn test_generate_then_render_and_download() {
        let app = app_with(Some(completion(
            "```jsx\nexport default function Sunset({ profile }) {\n  return <main className=\"sunset\">{profile.first_name}</main>;\n}\n```",
        )));

        let (status, bytes) = send(
            &app,
            json_request("POST", "/api/generate-theme", json!({"prompt": "sunset"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["component_name"], "Sunset");
        assert_eq!(body["theme"], "ai-generated");
        assert!(body["code"].as_str().unwrap().starts_with("function Sunset"));

        let (_, bytes) = send(&app, get("/api/themes")).await;
        let themes: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(themes["generated"]["component_name"], "Sunset");
        assert_eq!(themes["themes"].as_array().unwrap().len(), 12);

        let (status, bytes) = send(
            &app,
            json_request("POST", "/api/render", json!({"theme": "ai-generated", "sample": "sample1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rendered: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(rendered["theme"], "ai-generated");
        assert!(rendered["html"]
            .as_str()
            .unwrap()
            .contains("<main class=\"sunset\">Ada</main>"));

        let response = app
            .clone()
            .oneshot(get("/api/generate-theme/source"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Sunset.jsx\""
        );
    }

    #[tokio::test]
    async fn test_bad_shape_is_500_with_stage() {
        let app = app_with(Some(ProviderReply {
            status: 200,
            body: json!({"choices": []}).to_string(),
        }));
        let (status, bytes) = send(
            &app,
            json_request("POST", "/api/generate-theme", json!({"prompt": "ocean"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["stage"], "validating");

        let (status, _) = send(&app, get("/api/generate-theme/source")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, bytes) = send(&app, get("/api/generate-theme/status")).await;
        let status: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status["busy"], false);
        assert_eq!(status["phase"], "idle");
        assert_eq!(status["last_outcome"]["status"], "failed");
        assert_eq!(status["last_outcome"]["kind"], "unexpected_response_shape");
    }

    #[tokio::test]
    async fn test_portfolio_page_and_unknown_sample() {
        let app = app_with(None);

        let (status, bytes) = send(&app, get("/portfolio?theme=cyberpunk")).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("theme-cyberpunk"));
        assert!(html.contains("Ada Lovelace"));

        let (status, _) = send(&app, get("/portfolio?sample=missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_accent_round_trip() {
        let app = app_with(None);

        let (status, _) = send(
            &app,
            json_request("PUT", "/api/accent", json!({"color": "javascript:alert(1)"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request("PUT", "/api/accent", json!({"color": "#10B981"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, bytes) = send(&app, get("/api/accent")).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["color"], "#10b981");

        let (_, bytes) = send(
            &app,
            json_request("POST", "/api/render", json!({"profile": {"first_name": "Lin"}})),
        )
        .await;
        let rendered: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(rendered["theme"], "minimal");
        assert!(rendered["html"].as_str().unwrap().contains("--accent:#10b981"));
    }

    #[tokio::test]
    async fn test_cancel_without_job() {
        let app = app_with(None);
        let (status, bytes) = send(
            &app,
            json_request("POST", "/api/generate-theme/cancel", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["cancelled"], false);
    }

    #[tokio::test]
    async fn test_profiles_routes() {
        let app = app_with(None);
        let (_, bytes) = send(&app, get("/api/profiles")).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["profiles"], json!(["sample1"]));

        let (status, bytes) = send(&app, get("/api/profiles/sample1")).await;
        assert_eq!(status, StatusCode::OK);
        let profile: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(profile["first_name"], "Ada");

        let (status, _) = send(&app, get("/api/profiles/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
