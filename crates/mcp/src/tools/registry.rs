// Tool trait and registry shared by the stdio and HTTP adapters

use crate::protocol::ToolSchema;
use polarion_core::{PolarionError, PolarionResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: Value) -> PolarionResult<Value>;
}

/// Failure of a registry invocation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Polarion(#[from] PolarionError),
}

/// Error payload shared by both transports: `{error, detail, guidance?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl From<&ToolError> for ErrorBody {
    fn from(err: &ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => Self {
                error: "unknown_tool".to_string(),
                detail: err.to_string(),
                guidance: None,
            },
            ToolError::Polarion(e) => Self {
                error: e.kind().to_string(),
                detail: e.to_string(),
                guidance: e.guidance().map(str::to_string),
            },
        }
    }
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, sorted by name
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name. Each invocation is independent; a failure
    /// leaves nothing behind for the next call.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tracing::debug!(tool = name, "Invoking tool");
        match tool.execute(arguments).await {
            Ok(value) => Ok(value),
            Err(e) => {
                match &e {
                    PolarionError::Protocol(_) | PolarionError::Storage(_) => {
                        tracing::warn!(tool = name, kind = e.kind(), error = %e, "Tool failed")
                    }
                    _ => tracing::info!(tool = name, kind = e.kind(), error = %e, "Tool failed"),
                }
                Err(e.into())
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode tool arguments; `null` is treated as `{}`
pub fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> PolarionResult<T> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| PolarionError::Validation(format!("Invalid arguments for {}: {}", tool, e)))
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str, minimum: u64, maximum: u64) -> Value {
    serde_json::json!({
        "type": "integer",
        "description": description,
        "minimum": minimum,
        "maximum": maximum
    })
}
