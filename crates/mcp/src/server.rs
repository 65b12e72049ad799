//! MCP server over stdio.
//!
//! Reads one JSON-RPC 2.0 message per line from stdin and writes one
//! response per line to stdout. Logs go to stderr so they never mix with
//! protocol output.

use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
    PROTOCOL_VERSION,
};
use crate::tools::{ErrorBody, ToolError, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "polarion-mcp";

/// MCP server dispatching `tools/call` to a [`ToolRegistry`]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    initialized: bool,
}

impl McpServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Serve stdin/stdout until the client closes stdin
    pub async fn run(&mut self) -> std::io::Result<()> {
        info!(tools = self.registry.len(), "MCP server listening on stdio");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Line-delimited JSON-RPC loop over any reader/writer pair
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                info!("Client disconnected");
                break;
            }

            // A line that is not UTF-8 is answered like any other unparsable
            // message; the loop keeps going.
            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let message = line.trim();
                    if message.is_empty() {
                        continue;
                    }
                    debug!(bytes = message.len(), "Received message");
                    self.handle_message(message).await
                }
                Err(e) => {
                    warn!(error = %e, "Received a line that is not valid UTF-8");
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        JsonRpcError::parse_error(e),
                    ))
                }
            };

            if let Some(response) = response {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one raw message; `None` for notifications
    pub async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to parse message");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(e),
                ));
            }
        };

        let id_hint = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Malformed JSON-RPC request");
                return Some(JsonRpcResponse::error(
                    id_hint,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        let Some(id) = request.id.clone() else {
            self.handle_notification(&request.method);
            return None;
        };

        match self.handle_request(&request.method, request.params).await {
            Ok(result) => Some(JsonRpcResponse::success(id, result)),
            Err(error) => Some(JsonRpcResponse::error(id, error)),
        }
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" => {
                info!("Client initialized");
                self.initialized = true;
            }
            "notifications/cancelled" => debug!("Request cancelled"),
            _ => debug!(method, "Ignoring notification"),
        }
    }

    async fn handle_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => self.handle_initialize(),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => {
                warn!(method, "Unknown method");
                Err(JsonRpcError::method_not_found(method))
            }
        }
    }

    fn handle_initialize(&self) -> Result<Value, JsonRpcError> {
        info!("Initializing MCP session");

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_result(&result)
    }

    fn handle_list_tools(&self) -> Result<Value, JsonRpcError> {
        to_result(&ListToolsResult {
            tools: self.registry.list_schemas(),
        })
    }

    /// Tool failures are reported in-band with `isError`; only an unknown
    /// tool or unreadable params fail the JSON-RPC call itself.
    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?,
            None => return Err(JsonRpcError::invalid_params("Missing params")),
        };

        info!(tool = %params.name, "Calling tool");
        let result = match self.registry.invoke(&params.name, params.arguments).await {
            Ok(value) => CallToolResult::json(&value, false),
            Err(ToolError::UnknownTool(name)) => {
                return Err(JsonRpcError::invalid_params(format!("Unknown tool: {}", name)))
            }
            Err(err) => CallToolResult::json(&to_result(&ErrorBody::from(&err))?, true),
        };

        to_result(&result)
    }
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value)
        .map_err(|e| JsonRpcError::internal_error(format!("Serialization error: {}", e)))
}
