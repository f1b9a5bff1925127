//! MCP client using the official rmcp SDK
//!
//! Connects to tool servers over a child process pipe or streamable HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    model::{
        CallToolRequestParams, ClientCapabilities, ClientInfo, GetPromptRequestParams,
        Implementation, PromptMessageContent, RawContent, ReadResourceRequestParams,
        ResourceContents,
    },
    service::RunningService,
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
    RoleClient, ServiceExt,
};
use serde_json::{Map, Value};
use tokio::process::Command;

use crate::config::env_keys;
use crate::logging::Logger;

use super::address::ServerAddress;
use super::catalog::{CatalogItem, PromptArgument};
use super::connection::{Connector, McpConnection, ToolOutput};
use super::error::{McpError, McpResult};

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "mcp-agent".to_string(),
            title: Some("MCP Agent Gateway".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

/// Opens rmcp client sessions
pub struct RmcpConnector {
    /// Document-store credentials exported to spawned tool servers
    credentials_path: Option<PathBuf>,
    logger: Arc<dyn Logger>,
}

impl RmcpConnector {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            credentials_path: None,
            logger,
        }
    }

    /// Pass `GOOGLE_APPLICATION_CREDENTIALS` to every stdio child
    pub fn with_credentials(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    async fn connect_stdio(
        &self,
        command: &str,
        args: &[String],
    ) -> McpResult<RunningService<RoleClient, ClientInfo>> {
        self.logger.info(&format!(
            "[McpClient] Spawning tool server: {} {}",
            command,
            args.join(" ")
        ));

        let transport = TokioChildProcess::new(Command::new(command).configure(|cmd| {
            cmd.args(args);
            if let Some(path) = &self.credentials_path {
                cmd.env(env_keys::CREDENTIALS, path);
            }
        }))
        .map_err(|e| McpError::ConnectionFailed(format!("{}: {}", command, e)))?;

        client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))
    }

    async fn connect_http(&self, url: &str) -> McpResult<RunningService<RoleClient, ClientInfo>> {
        self.logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let transport = StreamableHttpClientTransport::from_uri(url);

        client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))
    }
}

#[async_trait]
impl Connector for RmcpConnector {
    async fn connect(&self, address: &ServerAddress) -> McpResult<Box<dyn McpConnection>> {
        let service = match address {
            ServerAddress::Stdio { command, args } => self.connect_stdio(command, args).await?,
            ServerAddress::Http { url } => self.connect_http(url).await?,
        };

        self.logger.info(&format!(
            "[McpClient] Connected and initialized: {}",
            address
        ));

        Ok(Box::new(RmcpConnection {
            service: Some(service),
            logger: Arc::clone(&self.logger),
        }))
    }
}

/// Initialized rmcp client session
pub struct RmcpConnection {
    /// Taken on close
    service: Option<RunningService<RoleClient, ClientInfo>>,
    logger: Arc<dyn Logger>,
}

impl RmcpConnection {
    fn service(&self) -> McpResult<&RunningService<RoleClient, ClientInfo>> {
        self.service
            .as_ref()
            .ok_or_else(|| McpError::SessionClosed("connection already closed".to_string()))
    }
}

fn protocol(e: impl std::fmt::Display) -> McpError {
    McpError::Protocol(e.to_string())
}

#[async_trait]
impl McpConnection for RmcpConnection {
    fn server_name(&self) -> Option<String> {
        self.service
            .as_ref()
            .and_then(|s| s.peer_info())
            .map(|info| info.server_info.name.clone())
    }

    async fn list_catalog(&self) -> McpResult<Vec<CatalogItem>> {
        let service = self.service()?;
        let capabilities = service.peer_info().map(|info| &info.capabilities);
        let mut items = Vec::new();

        if capabilities.is_some_and(|c| c.tools.is_some()) {
            for tool in service.list_all_tools().await.map_err(protocol)? {
                items.push(CatalogItem::Tool {
                    name: tool.name.to_string(),
                    description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
                    input_schema: Value::Object(tool.input_schema.as_ref().clone()),
                });
            }
        }

        if capabilities.is_some_and(|c| c.resources.is_some()) {
            for resource in service.list_all_resources().await.map_err(protocol)? {
                let raw = resource.raw;
                items.push(CatalogItem::Resource {
                    uri: raw.uri,
                    name: raw.name,
                    description: raw.description,
                    mime_type: raw.mime_type,
                    templated: false,
                });
            }
            for template in service.list_all_resource_templates().await.map_err(protocol)? {
                let raw = template.raw;
                items.push(CatalogItem::Resource {
                    uri: raw.uri_template,
                    name: raw.name,
                    description: raw.description,
                    mime_type: raw.mime_type,
                    templated: true,
                });
            }
        }

        if capabilities.is_some_and(|c| c.prompts.is_some()) {
            for prompt in service.list_all_prompts().await.map_err(protocol)? {
                items.push(CatalogItem::Prompt {
                    name: prompt.name,
                    description: prompt.description,
                    arguments: prompt
                        .arguments
                        .unwrap_or_default()
                        .into_iter()
                        .map(|a| PromptArgument {
                            name: a.name,
                            description: a.description,
                            required: a.required.unwrap_or(false),
                        })
                        .collect(),
                });
            }
        }

        self.logger.info(&format!("[McpClient] Listed {} catalog items", items.len()));
        Ok(items)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        self.logger.info(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result = self
            .service()?
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        // Content is Annotated<RawContent>; only text parts reach the model
        let text = result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolOutput {
            content: text,
            is_error: result.is_error.unwrap_or(false),
        })
    }

    async fn read_resource(&self, uri: &str) -> McpResult<String> {
        let result = self
            .service()?
            .read_resource(ReadResourceRequestParams {
                meta: None,
                uri: uri.to_string(),
            })
            .await
            .map_err(protocol)?;

        Ok(result
            .contents
            .into_iter()
            .filter_map(|c| match c {
                ResourceContents::TextResourceContents { text, .. } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn get_prompt(&self, name: &str, arguments: Option<Map<String, Value>>) -> McpResult<String> {
        let result = self
            .service()?
            .get_prompt(GetPromptRequestParams {
                meta: None,
                name: name.to_string(),
                arguments,
            })
            .await
            .map_err(protocol)?;

        Ok(result
            .messages
            .into_iter()
            .filter_map(|m| match m.content {
                PromptMessageContent::Text { text } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn close(&mut self) -> McpResult<()> {
        if let Some(service) = self.service.take() {
            self.logger.info("[McpClient] Closing connection");
            service.cancel().await.map_err(protocol)?;
        }
        Ok(())
    }
}
