pub mod auth;
pub mod documents;
pub mod projects;
pub mod status;
pub mod users;
pub mod work_items;
mod registry;

pub use auth::{LogoutTool, OpenLoginTool, SetTokenTool, VerifyTokenTool};
pub use documents::GetDocumentTool;
pub use projects::{GetProjectTool, ListProjectsTool};
pub use registry::{
    json_schema_integer, json_schema_object, json_schema_string, parse_args, ErrorBody, Tool,
    ToolError, ToolRegistry,
};
pub use status::{CheckConnectivityTool, CheckStatusTool};
pub use users::GetUserTool;
pub use work_items::{GetWorkItemTool, ListRequirementsTool, ListWorkItemsTool};

use polarion_sdk::PolarionClient;
use std::sync::Arc;

/// Registry with every Polarion tool, all sharing one client and vault
pub fn default_registry(client: PolarionClient, default_project: Option<String>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    // Login flow
    registry.register(Arc::new(OpenLoginTool::new(client.clone())));
    registry.register(Arc::new(SetTokenTool::new(client.clone())));
    registry.register(Arc::new(VerifyTokenTool::new(client.clone())));
    registry.register(Arc::new(LogoutTool::new(client.clone())));

    // Polarion resources
    registry.register(Arc::new(ListProjectsTool::new(client.clone())));
    registry.register(Arc::new(GetProjectTool::new(client.clone())));
    registry.register(Arc::new(ListWorkItemsTool::new(client.clone())));
    registry.register(Arc::new(GetWorkItemTool::new(client.clone())));
    registry.register(Arc::new(ListRequirementsTool::new(
        client.clone(),
        default_project,
    )));
    registry.register(Arc::new(GetDocumentTool::new(client.clone())));
    registry.register(Arc::new(GetUserTool::new(client.clone())));

    // Status
    registry.register(Arc::new(CheckStatusTool::new(client.clone())));
    registry.register(Arc::new(CheckConnectivityTool::new(client)));

    registry
}
