//! HTTP surface of the MCP agent gateway
//!
//! - `GET /` liveness probe
//! - `POST /prompts/mcp-agent` runs the agent against the given tool servers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcp_agent_core::service::{parse_addresses, AgentService, ServiceError};
use mcp_agent_core::CancellationToken;

/// Shared by every request; holds no per-request state
pub struct AppState {
    pub service: AgentService,
    /// Accept addresses that spawn local commands
    pub allow_stdio: bool,
}

impl AppState {
    pub fn new(service: AgentService, allow_stdio: bool) -> Arc<Self> {
        Arc::new(Self { service, allow_stdio })
    }
}

/// Install the fmt subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/prompts/mcp-agent", post(run_prompt))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the listener fails
pub async fn serve(state: Arc<AppState>, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("MCP agent gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "This endpoint is for testing purposes only."
    }))
}

/// Query form: `mcp_links` is comma-separated
#[derive(Debug, Default, Deserialize)]
pub struct PromptQuery {
    pub user_input: Option<String>,
    pub mcp_link: Option<String>,
    pub mcp_links: Option<String>,
}

/// JSON body form
#[derive(Debug, Default, Deserialize)]
pub struct PromptBody {
    pub user_input: Option<String>,
    pub mcp_link: Option<String>,
    #[serde(default)]
    pub mcp_links: Vec<String>,
}

/// Error response with a `detail` field
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "Internal Server Error".to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_client_error() {
            return Self {
                status: StatusCode::BAD_REQUEST,
                detail: e.to_string(),
            };
        }
        tracing::error!(error = %e, "agent request failed");
        Self::internal()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Body values win over query values; links from both are combined
fn merge_request(query: PromptQuery, body: Option<PromptBody>) -> (Option<String>, Vec<String>) {
    let body = body.unwrap_or_default();
    let user_input = body.user_input.or(query.user_input);

    let mut links = Vec::new();
    links.extend(body.mcp_link);
    links.extend(body.mcp_links);
    links.extend(query.mcp_link);
    if let Some(list) = query.mcp_links {
        links.extend(list.split(',').map(str::trim).filter(|l| !l.is_empty()).map(str::to_string));
    }
    (user_input, links)
}

async fn run_prompt(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PromptQuery>,
    body: Option<Json<PromptBody>>,
) -> Result<Json<String>, ApiError> {
    let (user_input, links) = merge_request(query, body.map(|Json(b)| b));
    let Some(user_input) = user_input else {
        return Err(ApiError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: "user_input is required".to_string(),
        });
    };

    let addresses = parse_addresses(&links, state.allow_stdio)?;
    let outcome = state
        .service
        .handle(&user_input, &addresses, CancellationToken::new())
        .await?;

    tracing::info!(
        turns = outcome.turns,
        tool_calls = outcome.tool_calls,
        "agent request completed"
    );
    Ok(Json(outcome.text))
}
