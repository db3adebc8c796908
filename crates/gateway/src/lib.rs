//! HTTP API gateway for Thinki.
//!
//! Exposes the two generation endpoints plus the static root and health
//! documents:
//!
//! - `GET  /`                     service description
//! - `GET  /health`               liveness check
//! - `POST /api/english/generate` English questions
//! - `POST /api/math/generate`    Math questions
//!
//! Built on Axum. All error bodies have the shape `{"detail": "..."}`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{Instrument, error, info, info_span, warn};

use thinki_config::{AppConfig, GatewayConfig};
use thinki_core::{GenerationError, GenerationRequest, GenerationResult, QuestionGenerator, Subject};

/// Shared application state for the gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub generator: Arc<QuestionGenerator>,
}

impl GatewayState {
    pub fn new(generator: QuestionGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Request body size limit (`gateway.max_body_bytes`)
/// - CORS allow-list, only when `gateway.cors_origins` is non-empty
/// - HTTP trace logging
pub fn build_router(state: GatewayState, gateway: &GatewayConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/english/generate", post(english_handler))
        .route("/api/math/generate", post(math_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(gateway.max_body_bytes));

    if let Some(cors) = cors_layer(&gateway.cors_origins) {
        router = router.layer(cors);
    }

    router.layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600)),
    )
}

/// Start the gateway HTTP server.
///
/// The provider is built once and shared by every request.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = thinki_providers::build_from_config(&config)?;
    let generator = QuestionGenerator::new(provider, config.resolved_model())
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);

    info!(
        provider = generator.provider_name(),
        model = generator.model(),
        "Question generator ready"
    );

    let app = build_router(GatewayState::new(generator), &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Errors ---

/// An HTTP error rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        if err.is_client_error() {
            Self::new(StatusCode::BAD_REQUEST, err.to_string())
        } else {
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error generating questions: {err}"),
            )
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::BytesRejection(_) => rejection.status(),
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, rejection.body_text())
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
    endpoints: Endpoints,
    features: Features,
}

#[derive(Serialize)]
struct Endpoints {
    english: &'static str,
    math: &'static str,
}

#[derive(Serialize)]
struct Features {
    flexible_context: &'static str,
    custom_templates: &'static str,
    template_placeholders: &'static str,
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to Thinki Question Generator API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            english: "/api/english/generate",
            math: "/api/math/generate",
        },
        features: Features {
            flexible_context: "Context accepts additional fields dynamically",
            custom_templates: "Support for custom question templates via 'template' field",
            template_placeholders: "Use {count}, {subject}, {year_band}, {ema}, {age}, {language}, {context}, or any request field name",
        },
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn english_handler(
    State(state): State<GatewayState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    generate(state, Subject::English, payload).await
}

async fn math_handler(
    State(state): State<GatewayState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    generate(state, Subject::Math, payload).await
}

async fn generate(
    state: GatewayState,
    subject: Subject,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(subject = %subject, error = %rejection.body_text(), "Rejected request body");
        ApiError::from(rejection)
    })?;

    let span = info_span!(
        "generate",
        request_id = %uuid::Uuid::new_v4(),
        subject = %subject
    );

    async move {
        match state.generator.generate(subject, &request).await {
            Ok(result) => {
                info!(questions = result.questions.len(), "Generation succeeded");
                Ok(Json(result))
            }
            Err(e) if e.is_client_error() => {
                warn!(error = %e, "Invalid generation request");
                Err(ApiError::from(e))
            }
            Err(e) => {
                error!(error = %e, "Generation failed");
                Err(ApiError::from(e))
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use thinki_core::message::Message;
    use thinki_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use thinki_core::ProviderError;
    use tower::ServiceExt;

    struct MockProvider {
        reply: String,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant(self.reply.clone()),
                usage: None,
                model: request.model,
            })
        }
    }

    fn app_with_reply(reply: &str) -> Router {
        let provider = Arc::new(MockProvider {
            reply: reply.to_string(),
        });
        let generator = QuestionGenerator::new(provider, "mock-model");
        build_router(GatewayState::new(generator), &GatewayConfig::default())
    }

    fn app() -> Router {
        app_with_reply(
            r#"[{"id":"1","question":"Q?","type":"fill_in_blank","correct_answer":"A","difficulty":"easy","explanation":"because"}]"#,
        )
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Welcome to Thinki Question Generator API");
        assert_eq!(body["endpoints"]["english"], "/api/english/generate");
        assert_eq!(body["endpoints"]["math"], "/api/math/generate");
        assert!(body["features"]["template_placeholders"]
            .as_str()
            .unwrap()
            .contains("{age}"));
    }

    #[tokio::test]
    async fn english_generate_succeeds() {
        let req = post_json(
            "/api/english/generate",
            r#"{"action":"generate","year_band":"Y5","subject":"English","count":1,"ema":0.5}"#,
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Successfully generated 1 English questions");
        assert_eq!(body["questions"][0]["type"], "fill_in_blank");
    }

    #[tokio::test]
    async fn lowercase_subject_accepted() {
        let req = post_json(
            "/api/math/generate",
            r#"{"action":"generate","year_band":"Y5","subject":"math","count":1,"ema":0.5}"#,
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Successfully generated 1 Math questions"
        );
    }

    #[tokio::test]
    async fn wrong_action_is_400() {
        let req = post_json(
            "/api/math/generate",
            r#"{"action":"delete","year_band":"Y5","subject":"Math","count":1,"ema":0.5}"#,
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "Action must be 'generate'");
    }

    #[tokio::test]
    async fn malformed_body_is_422() {
        let req = post_json("/api/english/generate", r#"{"action":"generate""#);
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn missing_field_is_422() {
        let req = post_json(
            "/api/english/generate",
            r#"{"action":"generate","subject":"English","count":1,"ema":0.5}"#,
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("year_band"));
    }

    #[tokio::test]
    async fn unparseable_reply_is_500() {
        let req = post_json(
            "/api/english/generate",
            r#"{"action":"generate","year_band":"Y5","subject":"English","count":1,"ema":0.5}"#,
        );
        let response = app_with_reply("Sorry, I cannot help with that.")
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Error generating questions: "));
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let provider = Arc::new(MockProvider { reply: "[]".into() });
        let generator = QuestionGenerator::new(provider, "mock-model");
        let gateway = GatewayConfig {
            max_body_bytes: 64,
            ..GatewayConfig::default()
        };
        let app = build_router(GatewayState::new(generator), &gateway);

        let padding = "x".repeat(256);
        let body = format!(
            r#"{{"action":"generate","year_band":"{padding}","subject":"English","count":1,"ema":0.5}}"#
        );
        let response = app.oneshot(post_json("/api/english/generate", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn cors_disabled_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["http://localhost:3000".into()]).is_some());
    }
}
