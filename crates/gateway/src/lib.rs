//! HTTP API gateway for Motiva.
//!
//! Exposes the dialogue pipeline over REST: a health check, the chat
//! endpoint, and optional speech endpoints (transcription and
//! synthesis) when a speech adapter is configured.
//!
//! Built on Axum for high performance async HTTP.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

use motiva_core::error::{Error, ProviderError};
use motiva_core::store::{SelectorStateStore, TurnStore};
use motiva_core::{Passage, Retriever, SpeechProvider};
use motiva_dialogue::{DialogueEngine, ResponseGenerator, UtteranceClassifier};
use motiva_policy::{Persona, StrategySelector};
use motiva_retrieval::{load_passages_file, EmbeddingIndex, HistoryAwareRetriever, StaticIndex};
use motiva_store::{InMemoryStateStore, InMemoryTurnStore, NoopStateStore, SqliteTurnStore};

/// Maximum request body size. Sized for audio uploads on /v1/stt.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: Arc<DialogueEngine>,
    /// Speech adapter, present only when `speech.enabled` is set.
    pub speech: Option<Arc<dyn SpeechProvider>>,
    /// Directory synthesized audio is written to, served under /media.
    pub media_dir: PathBuf,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/chat", post(chat_handler))
        .route("/v1/stt", post(stt_handler))
        .route("/v1/tts", post(tts_handler))
        .nest_service("/media", ServeDir::new(&state.media_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the provider, retrieval index, policy, and store once from
/// the configuration and shares them behind the engine.
pub async fn start(config: motiva_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = build_state(&config).await?;
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the full pipeline from configuration.
pub async fn build_state(
    config: &motiva_config::AppConfig,
) -> Result<Arc<GatewayState>, Box<dyn std::error::Error>> {
    let router = motiva_providers::build_from_config(config);
    let provider = router
        .default()
        .ok_or("No default provider configured, set MOTIVA_API_KEY or OPENAI_API_KEY")?;

    let passages: Vec<Passage> = match &config.retrieval.passages_file {
        Some(path) => load_passages_file(&motiva_config::AppConfig::expand_path(path))?,
        None => Vec::new(),
    };

    let index: Arc<dyn Retriever> = match config.retrieval.backend.as_str() {
        "static" => Arc::new(StaticIndex::new(passages)),
        _ => Arc::new(
            EmbeddingIndex::build(
                provider.clone(),
                &config.retrieval.embedding_model,
                passages,
            )
            .await?,
        ),
    };

    let retriever = HistoryAwareRetriever::new(provider.clone(), index, &config.classifier_model);
    let classifier = UtteranceClassifier::new(
        provider.clone(),
        retriever,
        &config.classifier_model,
        config.retrieval.top_k,
    );

    let mut generator = ResponseGenerator::new(
        provider.clone(),
        &config.generation_model,
        config.generation_temperature,
    );
    if let Some(persona) = &config.dialogue.persona_override {
        generator = generator.with_persona(Persona::custom(persona));
    }

    let selector = StrategySelector::new(
        config.policy.reflection_probability,
        config.policy.avoid_repeat,
    )?;

    let turn_store: Arc<dyn TurnStore> = match config.store.backend.as_str() {
        "memory" => Arc::new(InMemoryTurnStore::new()),
        _ => {
            let path = motiva_config::AppConfig::expand_path(&config.store.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Arc::new(SqliteTurnStore::new(&path.to_string_lossy()).await?)
        }
    };

    let state_store: Arc<dyn SelectorStateStore> = if config.policy.durable_state {
        Arc::new(InMemoryStateStore::new())
    } else {
        Arc::new(NoopStateStore)
    };

    let engine = DialogueEngine::new(classifier, generator, selector, turn_store, state_store)
        .with_history_limit(config.dialogue.history_limit)
        .with_request_timeout(Duration::from_secs(config.request_timeout_secs));

    let media_dir = motiva_config::AppConfig::expand_path(&config.speech.media_dir);
    let speech = if config.speech.enabled {
        std::fs::create_dir_all(&media_dir)?;
        Some(motiva_providers::build_speech_provider(config))
    } else {
        None
    };

    Ok(Arc::new(GatewayState {
        engine: Arc::new(engine),
        speech,
        media_dir,
    }))
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    input_message: String,
    user_identity: String,
}

#[derive(Serialize)]
struct ChatResponse {
    message: String,
    stance: String,
    strategy: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map pipeline errors onto HTTP statuses. Upstream model failures are
/// gateway errors, not client errors.
fn engine_error(err: Error) -> ApiError {
    let status = match &err {
        Error::Provider(ProviderError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        Error::Provider(ProviderError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
        Error::Provider(_) | Error::Retrieval(_) | Error::Classification(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.input_message.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "input_message must not be empty",
        ));
    }
    if payload.user_identity.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "user_identity must not be empty",
        ));
    }

    let reply = state
        .engine
        .respond(&payload.user_identity, &payload.input_message)
        .await
        .map_err(|e| {
            error!(error = %e, "Chat request failed");
            engine_error(e)
        })?;

    Ok(Json(ChatResponse {
        message: reply.message,
        stance: reply.stance.to_string(),
        strategy: reply.strategy.code().to_string(),
    }))
}

#[derive(Serialize)]
struct SttResponse {
    text: String,
}

async fn stt_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<SttResponse>, ApiError> {
    let speech = state.speech.clone().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Speech endpoints are disabled",
        )
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("audio") {
            continue;
        }

        let filename = field.file_name().unwrap_or("audio.wav").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

        let text = speech
            .transcribe(bytes.to_vec(), &filename)
            .await
            .map_err(|e| engine_error(Error::Provider(e)))?;

        return Ok(Json(SttResponse { text }));
    }

    Err(api_error(
        StatusCode::BAD_REQUEST,
        "Missing 'audio' multipart field",
    ))
}

#[derive(Deserialize)]
struct TtsRequest {
    text: String,
}

#[derive(Serialize)]
struct TtsResponse {
    audio_url: String,
}

async fn tts_handler(
    State(state): State<SharedState>,
    Json(payload): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    let speech = state.speech.clone().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Speech endpoints are disabled",
        )
    })?;

    if payload.text.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "text must not be empty"));
    }

    let audio = speech
        .synthesize(&payload.text)
        .await
        .map_err(|e| engine_error(Error::Provider(e)))?;

    let filename = format!(
        "speech_{}.mp3",
        chrono::Local::now().format("%Y%m%d-%H%M%S%3f")
    );
    let path = state.media_dir.join(&filename);
    tokio::fs::write(&path, &audio).await.map_err(|e| {
        error!(error = %e, path = %path.display(), "Failed to write synthesized audio");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(TtsResponse {
        audio_url: format!("/media/{filename}"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use motiva_core::provider::{ProviderRequest, ProviderResponse};
    use motiva_core::{Message, Provider};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Returns canned completions in order.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Self {
            let mut queued: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
            queued.reverse();
            Self {
                responses: Mutex::new(queued),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .expect("scripted provider exhausted");
            Ok(ProviderResponse {
                message: Message::assistant(&next),
                usage: None,
                model: "scripted".into(),
            })
        }
    }

    fn test_state(responses: &[&str]) -> SharedState {
        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::new(responses));
        let index: Arc<dyn Retriever> = Arc::new(StaticIndex::new(Vec::new()));
        let retriever = HistoryAwareRetriever::new(provider.clone(), index, "test-model");
        let classifier = UtteranceClassifier::new(provider.clone(), retriever, "test-model", 2);
        let generator = ResponseGenerator::new(provider.clone(), "test-model", 0.7);
        let selector = StrategySelector::new(0.66, false).unwrap();
        let engine = DialogueEngine::new(
            classifier,
            generator,
            selector,
            Arc::new(InMemoryTurnStore::new()),
            Arc::new(NoopStateStore),
        );
        Arc::new(GatewayState {
            engine: Arc::new(engine),
            speech: None,
            media_dir: std::env::temp_dir(),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(&[]));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn chat_returns_reply_and_labels() {
        let app = build_router(test_state(&["sustain", "無理にやめる必要はないんですね。"]));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "input_message": "お酒はやめたくない",
                    "user_identity": "alice"
                })
                .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["message"], "無理にやめる必要はないんですね。");
        assert_eq!(json["stance"], "sustain");
        assert!(json["strategy"].is_string());
    }

    #[tokio::test]
    async fn chat_rejects_empty_input() {
        let app = build_router(test_state(&[]));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "input_message": "   ",
                    "user_identity": "alice"
                })
                .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_maps_bad_label_to_bad_gateway() {
        let app = build_router(test_state(&["maybe"]));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "input_message": "こんにちは",
                    "user_identity": "alice"
                })
                .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("maybe"));
    }

    #[tokio::test]
    async fn speech_endpoints_disabled_without_adapter() {
        let app = build_router(test_state(&[]));

        let req = Request::builder()
            .method("POST")
            .uri("/v1/tts")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "text": "こんにちは" }).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
