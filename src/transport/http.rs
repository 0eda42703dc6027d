//! HTTP gateway for the agent registry

use crate::agent::{AgentInfo, AgentSummary};
use crate::config::Config;
use crate::registry::{AgentRegistry, AgentStats, RegistryError};
use crate::utils::{now_timestamp, sanitize_conversation_id, truncate_text, validate_agent_name};
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use uuid::Uuid;

const SERVICE_NAME: &str = "Arena Gateway";
const DEFAULT_CONVERSATION: &str = "default";

/// Shared application state
struct AppState {
    registry: Arc<AgentRegistry>,
    default_agent: String,
}

/// Request for chat
///
/// Field names are snake_case; camelCase spellings are accepted as aliases.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default, alias = "agentName")]
    agent_name: Option<String>,
    #[serde(default, alias = "conversationId")]
    conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    agent_name: String,
    conversation_id: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: String,
    available_agents: usize,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    agents_count: usize,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

/// Build the router with CORS applied
pub fn build_router(registry: Arc<AgentRegistry>, config: &Config) -> Router {
    let state = Arc::new(AppState {
        registry,
        default_agent: config.agent.default_agent.clone(),
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/agents", get(list_agents))
        .route("/agents/:name", get(agent_info))
        .route("/chat", post(handle_chat))
        .route("/chat/:agent_name/:conversation_id", delete(clear_conversation))
        .route("/stats", get(stats))
        .layer(cors_layer(&config.server.allowed_origins))
        .with_state(state)
}

/// Run the HTTP server until the process is stopped
pub async fn run_http_server(config: Config) -> Result<()> {
    let registry = Arc::new(AgentRegistry::initialize(&config)?);
    let app = build_router(registry, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Error body shape: `{"detail": "..."}`
fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "detail": message.into() })),
    )
        .into_response()
}

fn registry_error(err: RegistryError) -> Response {
    let status = match err {
        RegistryError::AgentNotFound(_) | RegistryError::InvalidAgentName(_) => {
            StatusCode::BAD_REQUEST
        }
        RegistryError::DuplicateAgent(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    detail(status, err.to_string())
}

async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} is running", SERVICE_NAME),
        available_agents: state.registry.len(),
    })
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: crate::VERSION.to_string(),
        agents_count: state.registry.len(),
    })
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentSummary>> {
    Json(state.registry.list())
}

async fn agent_info(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<AgentInfo>, Response> {
    state
        .registry
        .get(&name)
        .map(|agent| Json(agent.info()))
        .ok_or_else(|| {
            detail(
                StatusCode::NOT_FOUND,
                RegistryError::AgentNotFound(name).to_string(),
            )
        })
}

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return detail(rejection.status(), rejection.body_text()),
    };

    if req.message.trim().is_empty() {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "message must not be empty",
        );
    }

    let agent_name = req
        .agent_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| state.default_agent.clone());
    if !validate_agent_name(&agent_name) {
        return registry_error(RegistryError::InvalidAgentName(agent_name));
    }

    let conversation_id = sanitize_conversation_id(
        req.conversation_id
            .as_deref()
            .unwrap_or(DEFAULT_CONVERSATION),
    );

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        agent = %agent_name,
        conversation = %conversation_id,
        "Chat request: {}",
        truncate_text(&req.message, 50)
    );

    match state
        .registry
        .dispatch(&agent_name, &req.message, &conversation_id)
        .await
    {
        Ok(response) => {
            tracing::debug!(
                %request_id,
                "Chat response: {}",
                truncate_text(&response, 50)
            );
            Json(ChatResponse {
                response,
                agent_name,
                conversation_id,
                timestamp: now_timestamp(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::warn!(%request_id, "Chat request rejected: {}", e);
            registry_error(e)
        }
    }
}

async fn clear_conversation(
    State(state): State<Arc<AppState>>,
    Path((agent_name, conversation_id)): Path<(String, String)>,
) -> Json<MessageResponse> {
    let conversation_id = sanitize_conversation_id(&conversation_id);
    let message = if state
        .registry
        .clear_conversation(&agent_name, &conversation_id)
    {
        format!(
            "Conversation {} of agent {} cleared",
            conversation_id, agent_name
        )
    } else {
        "Conversation or agent does not exist".to_string()
    };
    Json(MessageResponse { message })
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, AgentStats>> {
    Json(state.registry.stats())
}
