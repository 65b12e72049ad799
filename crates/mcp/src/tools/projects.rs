// Project tools

use crate::protocol::ToolSchema;
use crate::tools::{json_schema_integer, json_schema_object, json_schema_string, parse_args, Tool};
use polarion_core::PolarionResult;
use polarion_sdk::config::MAX_PAGE_SIZE;
use polarion_sdk::PolarionClient;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ListProjectsArgs {
    #[serde(default)]
    limit: Option<usize>,
}

/// Lists projects with minimal fields
pub struct ListProjectsTool {
    client: PolarionClient,
}

impl ListProjectsTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ListProjectsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_polarion_projects".to_string(),
            description: "List projects (fast, minimal fields)".to_string(),
            input_schema: json_schema_object(
                json!({
                    "limit": json_schema_integer("Maximum number of projects (default: 10)", 1, MAX_PAGE_SIZE as u64)
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: ListProjectsArgs = parse_args("get_polarion_projects", arguments)?;
        let projects = self.client.projects().list(args.limit).await?;
        Ok(json!({
            "status": "success",
            "message": format!("Successfully fetched {} projects", projects.len()),
            "count": projects.len(),
            "projects": projects,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct GetProjectArgs {
    project_id: String,
    #[serde(default)]
    fields: Option<String>,
}

/// Fetches one project
pub struct GetProjectTool {
    client: PolarionClient,
}

impl GetProjectTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetProjectTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_polarion_project".to_string(),
            description: "Get a specific project by ID".to_string(),
            input_schema: json_schema_object(
                json!({
                    "project_id": json_schema_string("Project ID"),
                    "fields": json_schema_string("Fields to return: @basic (default), @all or a comma-separated list")
                }),
                vec!["project_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: GetProjectArgs = parse_args("get_polarion_project", arguments)?;
        let project = self
            .client
            .projects()
            .get(&args.project_id, args.fields.as_deref())
            .await?;
        Ok(json!({
            "status": "success",
            "message": format!("Successfully fetched project: {}", args.project_id),
            "project": project,
        }))
    }
}
