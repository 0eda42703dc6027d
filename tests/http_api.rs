//! HTTP gateway tests driven through `tower::ServiceExt::oneshot`

mod common;

use arena_gateway::agent::{Agent, SimpleChatAgent, ToolAgent};
use arena_gateway::transport::http::build_router;
use arena_gateway::{AgentRegistry, Config};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::EchoProvider;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> (Router, Arc<AgentRegistry>) {
    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(SimpleChatAgent::new(Some(Arc::new(EchoProvider)))),
        Arc::new(ToolAgent::new(None)),
    ];
    let registry = Arc::new(AgentRegistry::from_agents(agents).unwrap());
    (build_router(registry.clone(), &Config::default()), registry)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = send(app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Arena Gateway");
    assert_eq!(body["agents_count"], 2);
    assert!(body["version"]
        .as_str()
        .unwrap()
        .starts_with(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_root() {
    let (app, _) = test_app();
    let (status, body) = send(app, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_agents"], 2);
    assert!(body["message"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn test_list_agents() {
    let (app, _) = test_app();
    let (status, body) = send(app, Method::GET, "/agents", None).await;

    assert_eq!(status, StatusCode::OK);
    let agents = body.as_array().unwrap();
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0]["name"], "simple_chat");
    assert_eq!(agents[0]["display_name"], "Simple Chat");
    assert_eq!(agents[1]["name"], "tool_agent");
    assert!(agents[1]["capabilities"].is_array());
}

#[tokio::test]
async fn test_agent_info_and_404() {
    let (app, _) = test_app();
    let (status, body) = send(app.clone(), Method::GET, "/agents/tool_agent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_messages"], 0);

    let (status, body) = send(app, Method::GET, "/agents/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Agent 'missing' does not exist");
}

#[tokio::test]
async fn test_chat_round_trip() {
    let (app, registry) = test_app();
    let (status, body) = send(
        app,
        Method::POST,
        "/chat",
        Some(json!({"message": "ping", "agent_name": "simple_chat", "conversation_id": "c-1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "ping");
    assert_eq!(body["agent_name"], "simple_chat");
    assert_eq!(body["conversation_id"], "c-1");
    assert!(body["timestamp"].is_string());

    let agent = registry.get("simple_chat").unwrap();
    assert_eq!(agent.history("c-1").len(), 2);
}

#[tokio::test]
async fn test_chat_defaults_and_sanitizes() {
    let (app, registry) = test_app();
    let (status, body) = send(
        app,
        Method::POST,
        "/chat",
        Some(json!({"message": "hi", "conversationId": "a b/c"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_name"], "simple_chat");
    assert_eq!(body["conversation_id"], "abc");
    assert_eq!(registry.get("simple_chat").unwrap().history("abc").len(), 2);
}

#[tokio::test]
async fn test_chat_unknown_agent_is_400() {
    let (app, registry) = test_app();
    let (status, body) = send(
        app,
        Method::POST,
        "/chat",
        Some(json!({"message": "hi", "agent_name": "nope"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Agent 'nope' does not exist");
    for stats in registry.stats().values() {
        assert_eq!(stats.total_messages, 0);
    }
}

#[tokio::test]
async fn test_chat_invalid_agent_name_is_400() {
    let (app, _) = test_app();
    let (status, body) = send(
        app,
        Method::POST,
        "/chat",
        Some(json!({"message": "hi", "agent_name": "../etc"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Invalid agent name"));
}

#[tokio::test]
async fn test_chat_empty_message_is_422() {
    let (app, _) = test_app();
    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/chat",
        Some(json!({"message": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/chat",
        Some(json!({"message": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // A missing field is rejected the same way
    let (status, body) = send(app, Method::POST, "/chat", Some(json!({"agent_name": "simple_chat"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_chat_unconfigured_agent() {
    let (app, _) = test_app();
    let (status, body) = send(
        app,
        Method::POST,
        "/chat",
        Some(json!({"message": "hi", "agent_name": "tool_agent"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["response"]
        .as_str()
        .unwrap()
        .contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_delete_conversation_is_idempotent() {
    let (app, registry) = test_app();
    send(
        app.clone(),
        Method::POST,
        "/chat",
        Some(json!({"message": "hi", "conversation_id": "c1"})),
    )
    .await;

    let (status, first) = send(app.clone(), Method::DELETE, "/chat/simple_chat/c1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Conversation c1 of agent simple_chat cleared");
    assert!(registry.get("simple_chat").unwrap().history("c1").is_empty());

    let (status, second) = send(app.clone(), Method::DELETE, "/chat/simple_chat/c1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "Conversation or agent does not exist");

    let (status, _) = send(app, Method::DELETE, "/chat/nope/c1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_stats() {
    let (app, _) = test_app();
    send(
        app.clone(),
        Method::POST,
        "/chat",
        Some(json!({"message": "hi"})),
    )
    .await;

    let (status, body) = send(app, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["simple_chat"]["conversation_count"], 1);
    assert_eq!(body["simple_chat"]["total_messages"], 2);
    assert_eq!(body["tool_agent"]["conversation_count"], 0);
    assert!(body["tool_agent"]["last_activity"].is_null());
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/chat")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
}
