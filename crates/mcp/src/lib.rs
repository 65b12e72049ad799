// Model Context Protocol adapter for the Polarion tools

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
pub use tools::{default_registry, ErrorBody, Tool, ToolError, ToolRegistry};
