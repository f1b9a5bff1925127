//! The reasoning / tool-call loop

use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;

use crate::config::AgentSettings;
use crate::logging::Logger;
use crate::mcp::{SourcedItem, ToolInvoker};
use crate::providers::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::types::{CancellationToken, ChatMessage, StreamChunk, ToolCall, ToolResult};

use super::error::{AgentError, AgentResult};
use super::routing::ToolRoutes;

pub const DEFAULT_MAX_TURNS: usize = 10;

/// Final answer of one agent run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    pub text: String,
    /// Model calls made
    pub turns: usize,
    /// Tool calls executed
    pub tool_calls: usize,
}

/// Instructions, model binding and turn budget
pub struct Agent {
    name: String,
    instructions: String,
    model: ProviderModelConfig,
    provider: Arc<dyn Provider>,
    max_turns: usize,
    logger: Arc<dyn Logger>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: ProviderModelConfig,
        provider: Arc<dyn Provider>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model,
            provider,
            max_turns: DEFAULT_MAX_TURNS,
            logger,
        }
    }

    pub fn from_settings(
        settings: &AgentSettings,
        model: ProviderModelConfig,
        provider: Arc<dyn Provider>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self::new(&settings.name, &settings.instructions, model, provider, logger)
            .with_max_turns(settings.max_turns)
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Run to a final answer
    ///
    /// Only `Tool` entries of `catalog` are offered to the model. Tool calls
    /// run one at a time through `tools`; failures go back to the model as
    /// error results instead of ending the run.
    pub async fn run(
        &self,
        input: &str,
        catalog: &[SourcedItem],
        tools: &dyn ToolInvoker,
        cancel: CancellationToken,
    ) -> AgentResult<AgentOutcome> {
        let routes = ToolRoutes::build(catalog);
        self.logger.info(&format!(
            "[Agent] {} starting with {} tool(s), budget {} turn(s)",
            self.name,
            routes.len(),
            self.max_turns
        ));

        let mut messages = vec![ChatMessage::system(&self.instructions), ChatMessage::user(input)];
        let mut tool_calls = 0;

        for turn in 1..=self.max_turns {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            let options = StreamChatOptions::new().with_tools(routes.tools().to_vec());
            let request = self
                .provider
                .stream_chat(messages.clone(), self.model.clone(), options, cancel.clone());
            let stream = tokio::select! {
                _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                stream = request => stream?,
            };
            let (text, calls) = collect_reply(stream, &cancel).await?;

            if calls.is_empty() {
                self.logger.info(&format!(
                    "[Agent] {} finished after {} turn(s), {} tool call(s)",
                    self.name, turn, tool_calls
                ));
                return Ok(AgentOutcome {
                    text,
                    turns: turn,
                    tool_calls,
                });
            }

            messages.push(ChatMessage::assistant_tool_calls(text, &calls));

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(self.execute(call, &routes, tools, &cancel).await?);
                tool_calls += 1;
            }
            messages.push(ChatMessage::tool_results(&results));
        }

        self.logger.warn(&format!("[Agent] {} ran out of turns", self.name));
        Err(AgentError::MaxTurnsExceeded(self.max_turns))
    }

    async fn execute(
        &self,
        call: &ToolCall,
        routes: &ToolRoutes,
        tools: &dyn ToolInvoker,
        cancel: &CancellationToken,
    ) -> AgentResult<ToolResult> {
        let Some(route) = routes.resolve(&call.name) else {
            self.logger.warn(&format!("[Agent] Model called unknown tool: {}", call.name));
            return Ok(ToolResult::error(&call.id, format!("Error: unknown tool {}", call.name)));
        };

        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            output = tools.invoke(route.source, &route.name, call.input.clone()) => output,
        };

        Ok(match output {
            Ok(output) => ToolResult {
                call_id: call.id.clone(),
                content: output.content,
                is_error: output.is_error,
            },
            Err(e) => {
                self.logger.warn(&format!("[Agent] Tool {} failed: {}", call.name, e));
                ToolResult::error(&call.id, format!("Error: {}", e))
            }
        })
    }
}

/// Drain a model reply into its text and complete tool calls
///
/// A silent stream does not hold the run past cancellation.
async fn collect_reply(
    mut stream: StreamResponse,
    cancel: &CancellationToken,
) -> AgentResult<(String, Vec<ToolCall>)> {
    let mut text = String::new();
    let mut calls = Vec::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else {
            break;
        };
        match chunk? {
            StreamChunk::Text { text: t } => text.push_str(&t),
            StreamChunk::ToolCall { tool_call } => calls.push(tool_call),
        }
    }
    Ok((text, calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::mcp::{
        CatalogItem, Connector, MockConnector, MockServer, OpenFailurePolicy, ServerAddress,
        SessionPool, SessionTag,
    };
    use crate::providers::{MockProvider, MockTurn, ProviderResult};
    use crate::types::{ContentPart, MessageContent};
    use async_trait::async_trait;
    use serde_json::json;

    /// Opens a stream that never yields and ignores the token
    struct SilentProvider;

    #[async_trait]
    impl Provider for SilentProvider {
        fn name(&self) -> &str {
            "silent"
        }

        fn default_api_base(&self) -> &str {
            ""
        }

        async fn stream_chat(
            &self,
            _messages: Vec<ChatMessage>,
            _model: ProviderModelConfig,
            _options: StreamChatOptions,
            _cancel_token: CancellationToken,
        ) -> ProviderResult<StreamResponse> {
            Ok(Box::pin(futures::stream::pending::<ProviderResult<StreamChunk>>()))
        }
    }

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }

    fn agent(provider: &Arc<MockProvider>) -> Agent {
        let provider: Arc<dyn Provider> = Arc::clone(provider) as Arc<dyn Provider>;
        Agent::new(
            "MCP Assistant",
            "You are a useful firestore assistant",
            ProviderModelConfig::new("gpt-4o-mini"),
            provider,
            logger(),
        )
    }

    fn notes_server() -> MockServer {
        let schema = json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "string"},
                "title": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["user_id", "title", "content"]
        });
        MockServer::new("notes")
            .with_tool("create_note", "Crea una nueva nota", schema.clone())
            .with_tool("update_note", "Actualiza una nota", schema.clone())
            .with_tool("delete_note", "Elimina una nota", schema)
            .with_response("create_note", "Nota creada con ID: n-42")
    }

    async fn open_pool(connector: &Arc<MockConnector>, raw: &[&str]) -> SessionPool {
        let dyn_connector: Arc<dyn Connector> = Arc::clone(connector) as Arc<dyn Connector>;
        let mut pool = SessionPool::new(dyn_connector, logger());
        let addresses: Vec<_> = raw.iter().map(|a| ServerAddress::parse(a).unwrap()).collect();
        pool.open_all(&addresses, OpenFailurePolicy::Abort).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_note_scenario() {
        let connector = Arc::new(MockConnector::new().with_server("python mcpdemo.py", notes_server()));
        let mut pool = open_pool(&connector, &["python mcpdemo.py"]).await;
        let catalog = pool.aggregated_tools(true).await.unwrap();

        let args = json!({"user_id": "u-1", "title": "Compras", "content": "leche"});
        let provider = Arc::new(MockProvider::scripted(
            vec![
                MockTurn::ToolCalls(vec![ToolCall::new("call_1", "create_note", args.clone())]),
                MockTurn::Text("La nota se creó correctamente".to_string()),
            ],
            logger(),
        ));

        let outcome = agent(&provider)
            .run("crea una nota para u-1", &catalog, &pool, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.text, "La nota se creó correctamente");
        assert_eq!(outcome.turns, 2);
        assert_eq!(outcome.tool_calls, 1);

        let calls = connector.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "create_note");
        assert_eq!(calls[0].arguments, args);

        let offered: Vec<_> = provider.offered_tools()[0].iter().map(|t| t.name.clone()).collect();
        assert_eq!(offered, ["create_note", "update_note", "delete_note"]);

        // The tool output went back to the model on the second turn
        let second = provider.transcripts().remove(1);
        let fed_back = second.iter().any(|m| match &m.content {
            MessageContent::Parts(parts) => parts.iter().any(|p| {
                matches!(p, ContentPart::ToolResult { content, .. } if content.contains("n-42"))
            }),
            _ => false,
        });
        assert!(fed_back);

        pool.close_all().await;
        assert_eq!(connector.closed().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_search_routes_to_each_session() {
        let connector = Arc::new(
            MockConnector::new()
                .with_server(
                    "python a.py",
                    MockServer::new("a")
                        .with_tool("search", "", json!({"type": "object"}))
                        .with_response("search", "from a"),
                )
                .with_server(
                    "python b.py",
                    MockServer::new("b")
                        .with_tool("search", "", json!({"type": "object"}))
                        .with_response("search", "from b"),
                ),
        );
        let mut pool = open_pool(&connector, &["python a.py", "python b.py"]).await;
        let catalog = pool.aggregated_tools(true).await.unwrap();
        assert_eq!(catalog.len(), 2);

        let provider = Arc::new(MockProvider::scripted(
            vec![
                MockTurn::ToolCalls(vec![
                    ToolCall::new("c1", "search__1", json!({"q": "x"})),
                    ToolCall::new("c2", "search__0", json!({"q": "y"})),
                ]),
                MockTurn::Text("done".to_string()),
            ],
            logger(),
        ));

        agent(&provider)
            .run("search both", &catalog, &pool, CancellationToken::new())
            .await
            .unwrap();

        let calls = connector.calls();
        assert_eq!(calls[0].address, "python b.py");
        assert_eq!(calls[0].tool, "search");
        assert_eq!(calls[1].address, "python a.py");
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_runs_without_tools() {
        let connector = Arc::new(MockConnector::new());
        let pool = open_pool(&connector, &[]).await;
        let provider = Arc::new(MockProvider::echo(logger()));

        let outcome = agent(&provider)
            .run("hola", &[], &pool, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.text, "Echo: hola");
        assert_eq!(outcome.tool_calls, 0);
        assert!(provider.offered_tools()[0].is_empty());
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_tool_failure_is_fed_back() {
        let connector = Arc::new(MockConnector::new().with_server("python mcpdemo.py", notes_server()));
        let pool = open_pool(&connector, &["python mcpdemo.py"]).await;
        let catalog = vec![SourcedItem {
            source: SessionTag { index: 0, label: "notes".to_string() },
            item: CatalogItem::tool("archive_note", "", json!({"type": "object"})),
        }];

        let provider = Arc::new(MockProvider::scripted(
            vec![
                MockTurn::ToolCalls(vec![
                    ToolCall::new("c1", "archive_note", json!({})),
                    ToolCall::new("c2", "not_offered", json!({})),
                ]),
                MockTurn::Text("could not archive".to_string()),
            ],
            logger(),
        ));

        let outcome = agent(&provider)
            .run("archive", &catalog, &pool, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.text, "could not archive");
        assert_eq!(outcome.tool_calls, 2);

        let second = provider.transcripts().remove(1);
        let Some(MessageContent::Parts(parts)) = second.last().map(|m| m.content.clone()) else {
            panic!("expected tool results");
        };
        assert_eq!(parts.len(), 2);
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_max_turns() {
        let connector = Arc::new(MockConnector::new().with_server("python mcpdemo.py", notes_server()));
        let mut pool = open_pool(&connector, &["python mcpdemo.py"]).await;
        let catalog = pool.aggregated_tools(true).await.unwrap();

        let looping = MockTurn::ToolCalls(vec![ToolCall::new("c", "create_note", json!({}))]);
        let provider = Arc::new(MockProvider::scripted(vec![looping.clone(), looping.clone(), looping], logger()));

        let result = agent(&provider)
            .with_max_turns(2)
            .run("loop", &catalog, &pool, CancellationToken::new())
            .await;
        assert!(matches!(result, Err(AgentError::MaxTurnsExceeded(2))));
        assert_eq!(provider.request_count(), 2);
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_provider_error() {
        let connector = Arc::new(MockConnector::new());
        let pool = open_pool(&connector, &[]).await;
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::Error("boom".to_string())], logger()));

        let result = agent(&provider).run("x", &[], &pool, CancellationToken::new()).await;
        assert!(matches!(result, Err(AgentError::Provider(_))));
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_on_model() {
        let connector = Arc::new(MockConnector::new());
        let pool = open_pool(&connector, &[]).await;
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::Stall], logger()));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            trigger.cancel();
        });

        let result = agent(&provider).run("x", &[], &pool, cancel).await;
        assert!(matches!(result, Err(AgentError::Cancelled)));
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_cancel_while_stream_is_silent() {
        let connector = Arc::new(MockConnector::new());
        let pool = open_pool(&connector, &[]).await;
        let agent = Agent::new(
            "MCP Assistant",
            "",
            ProviderModelConfig::new("mock"),
            Arc::new(SilentProvider),
            logger(),
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            agent.run("x", &[], &pool, cancel),
        )
        .await
        .expect("cancelled run must finish");
        assert!(matches!(result, Err(AgentError::Cancelled)));
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_tool_call_turn_precedes_results() {
        let connector = Arc::new(MockConnector::new().with_server("python mcpdemo.py", notes_server()));
        let mut pool = open_pool(&connector, &["python mcpdemo.py"]).await;
        let catalog = pool.aggregated_tools(true).await.unwrap();

        let provider = Arc::new(MockProvider::scripted(
            vec![
                MockTurn::ToolCalls(vec![ToolCall::new("c1", "create_note", json!({}))]),
                MockTurn::Text("ok".to_string()),
            ],
            logger(),
        ));
        agent(&provider)
            .run("crea", &catalog, &pool, CancellationToken::new())
            .await
            .unwrap();

        let second = provider.transcripts().remove(1);
        let assistant = &second[second.len() - 2];
        assert_eq!(assistant.role, crate::types::MessageRole::Assistant);
        let MessageContent::Parts(parts) = &assistant.content else {
            panic!("expected tool-call parts");
        };
        assert!(matches!(&parts[0], ContentPart::ToolUse { name, .. } if name == "create_note"));
        pool.close_all().await;
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let connector = Arc::new(MockConnector::new());
        let pool = open_pool(&connector, &[]).await;
        let provider = Arc::new(MockProvider::echo(logger()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = agent(&provider).run("x", &[], &pool, cancel).await;
        assert!(matches!(result, Err(AgentError::Cancelled)));
        assert_eq!(provider.request_count(), 0);
        pool.close_all().await;
    }
}
