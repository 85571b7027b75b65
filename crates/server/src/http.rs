//! HTTP endpoints

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use brewflow_core::TurnRequest;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::warn!("No valid CORS origins configured, allowing all (development only)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    session_id: String,
    message: String,
    #[serde(default)]
    locale: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    stage: String,
    closed: bool,
}

/// Chat endpoint. The per-session gate serializes turns so state
/// read-modify-write never overlaps for one session.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    if request.session_id.is_empty() || request.message.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let gate = state.gates.gate(&request.session_id);
    let _turn = gate.lock().await;

    let turn_request = TurnRequest {
        session_id: request.session_id,
        message_text: request.message,
        locale_hint: request.locale,
    };

    match state.agent.handle_turn(turn_request).await {
        Ok(response) => Ok(Json(ChatResponse {
            response: response.response_text,
            stage: response.stage_after_turn.display_name().to_string(),
            closed: response.closed,
        })),
        Err(e) => {
            tracing::error!(error = %e, "turn failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}

/// Allocate a fresh session id
async fn create_session() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "session_id": uuid::Uuid::new_v4().to_string(),
    }))
}

/// Session progress snapshot
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = state.sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(serde_json::json!({
        "session_id": session.session_id,
        "stage": session.stage.display_name(),
        "customer_type": session.customer_type.display_name(),
        "turn_count": session.turn_count,
        "closed": session.is_closed(),
    })))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.sessions.remove(&id);
    state.gates.remove(&id);
    StatusCode::NO_CONTENT
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.count(),
    }))
}

/// Readiness: verifies LLM backend connectivity
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let llm_url = format!("{}/api/tags", state.settings.llm.endpoint);

    let llm_status = match tokio::time::timeout(
        std::time::Duration::from_secs(2),
        reqwest::get(&llm_url),
    )
    .await
    {
        Ok(Ok(resp)) if resp.status().is_success() => "ok",
        Ok(Ok(_)) => "error",
        Ok(Err(_)) => "unreachable",
        Err(_) => "timeout",
    };

    let ready = llm_status == "ok";
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": { "llm_backend": llm_status },
        })),
    )
}
