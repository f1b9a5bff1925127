use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use mcp_agent_core::config::PoolSettings;
use mcp_agent_core::mcp::{Connector, MockConnector, MockServer};
use mcp_agent_core::providers::{MockProvider, MockTurn, Provider, ProviderModelConfig};
use mcp_agent_core::{Agent, AgentService, Logger, NoOpLogger, ToolCall};
use mcp_agent_server::{router, AppState};

const NOTES_URL: &str = "http://notes.local/mcp";

fn logger() -> Arc<dyn Logger> {
    Arc::new(NoOpLogger)
}

fn notes_connector() -> Arc<MockConnector> {
    Arc::new(
        MockConnector::new()
            .with_server(
                NOTES_URL,
                MockServer::new("notes")
                    .with_tool("create_note", "Crea una nueva nota", json!({"type": "object"}))
                    .with_response("create_note", "Nota creada con ID: n-7"),
            )
            .with_server("http://down.local/mcp", MockServer::new("down").failing_open()),
    )
}

fn app(connector: &Arc<MockConnector>, turns: Vec<MockTurn>, allow_stdio: bool) -> Router {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::scripted(turns, logger()));
    let agent = Agent::new(
        "MCP Assistant",
        "You are a useful firestore assistant",
        ProviderModelConfig::new("gpt-4o-mini"),
        provider,
        logger(),
    );
    let connector: Arc<dyn Connector> = Arc::clone(connector) as Arc<dyn Connector>;
    let service = AgentService::new(agent, connector, PoolSettings::default(), logger());
    router(AppState::new(service, allow_stdio))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_root() {
    let response = app(&notes_connector(), vec![], false)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "message": "This endpoint is for testing purposes only."})
    );
}

#[tokio::test]
async fn test_create_note_over_query() {
    let connector = notes_connector();
    let turns = vec![
        MockTurn::ToolCalls(vec![ToolCall::new(
            "call_1",
            "create_note",
            json!({"user_id": "u-1", "title": "Compras", "content": "leche"}),
        )]),
        MockTurn::Text("Nota creada correctamente".to_string()),
    ];

    let response = app(&connector, turns, false)
        .oneshot(post(&format!("/prompts/mcp-agent?user_input=crea&mcp_link={}", NOTES_URL)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("Nota creada correctamente"));
    assert_eq!(connector.calls().len(), 1);
    assert_eq!(connector.opened(), connector.closed());
}

#[tokio::test]
async fn test_json_body_with_link_list() {
    let connector = notes_connector();
    let request = Request::builder()
        .method("POST")
        .uri("/prompts/mcp-agent")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({"user_input": "hola", "mcp_links": [NOTES_URL]}).to_string(),
        ))
        .unwrap();

    let response = app(&connector, vec![MockTurn::Text("hola".to_string())], false)
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(connector.closed(), vec![NOTES_URL]);
}

#[tokio::test]
async fn test_no_links_runs_toolless() {
    let connector = notes_connector();
    let response = app(&connector, vec![MockTurn::Text("sin herramientas".to_string())], false)
        .oneshot(post("/prompts/mcp-agent?user_input=hola"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("sin herramientas"));
    assert!(connector.opened().is_empty());
}

#[tokio::test]
async fn test_open_failure_is_generic_500() {
    let connector = notes_connector();
    let uri = format!(
        "/prompts/mcp-agent?user_input=x&mcp_links={},http://down.local/mcp",
        NOTES_URL
    );

    let response = app(&connector, vec![MockTurn::Text("unused".to_string())], false)
        .oneshot(post(&uri))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({"detail": "Internal Server Error"}));
    assert_eq!(connector.closed(), vec![NOTES_URL]);
}

#[tokio::test]
async fn test_stdio_refused_unless_allowed() {
    let connector = notes_connector();
    let response = app(&connector, vec![], false)
        .oneshot(post("/prompts/mcp-agent?user_input=x&mcp_link=python%20mcpdemo.py"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].as_str().unwrap().contains("stdio"));
    assert!(connector.opened().is_empty());
}

#[tokio::test]
async fn test_missing_user_input() {
    let response = app(&notes_connector(), vec![], false)
        .oneshot(post("/prompts/mcp-agent"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
