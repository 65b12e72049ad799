// Work item tools, including the requirements shortcut

use crate::protocol::ToolSchema;
use crate::tools::{json_schema_integer, json_schema_object, json_schema_string, parse_args, Tool};
use polarion_core::{PolarionError, PolarionResult};
use polarion_sdk::config::MAX_PAGE_SIZE;
use polarion_sdk::PolarionClient;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ListWorkItemsArgs {
    project_id: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    fields: Option<String>,
}

/// Lists work items of a project with a light field set
pub struct ListWorkItemsTool {
    client: PolarionClient,
}

impl ListWorkItemsTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ListWorkItemsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_polarion_work_items".to_string(),
            description: "List work items of a project with minimal fields".to_string(),
            input_schema: json_schema_object(
                json!({
                    "project_id": json_schema_string("Project ID"),
                    "limit": json_schema_integer("Maximum number of work items (default: 10)", 1, MAX_PAGE_SIZE as u64),
                    "query": json_schema_string("Optional Polarion query, e.g. status:open"),
                    "fields": json_schema_string("Fields to return (default: id,title,type,description)")
                }),
                vec!["project_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: ListWorkItemsArgs = parse_args("get_polarion_work_items", arguments)?;
        let items = self
            .client
            .work_items()
            .list(
                &args.project_id,
                args.query.as_deref(),
                args.limit,
                args.fields.as_deref(),
            )
            .await?;
        Ok(json!({
            "status": "success",
            "message": format!(
                "Successfully fetched {} work items from project {}",
                items.len(),
                args.project_id
            ),
            "count": items.len(),
            "project_id": args.project_id,
            "work_items": items,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct GetWorkItemArgs {
    project_id: String,
    work_item_id: String,
    #[serde(default)]
    fields: Option<String>,
}

/// Fetches one work item
pub struct GetWorkItemTool {
    client: PolarionClient,
}

impl GetWorkItemTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetWorkItemTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_polarion_work_item".to_string(),
            description: "Get a specific work item by ID".to_string(),
            input_schema: json_schema_object(
                json!({
                    "project_id": json_schema_string("Project ID"),
                    "work_item_id": json_schema_string("Work item ID, e.g. WI-123"),
                    "fields": json_schema_string("Fields to return: @basic (default), @all or a comma-separated list")
                }),
                vec!["project_id", "work_item_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: GetWorkItemArgs = parse_args("get_polarion_work_item", arguments)?;
        let item = self
            .client
            .work_items()
            .get(&args.project_id, &args.work_item_id, args.fields.as_deref())
            .await?;
        Ok(json!({
            "status": "success",
            "message": format!(
                "Successfully fetched work item: {} from project {}",
                args.work_item_id, args.project_id
            ),
            "work_item": item,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct RequirementsArgs {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    query: Option<String>,
}

/// Lists requirement work items, falling back to a configured project
pub struct ListRequirementsTool {
    client: PolarionClient,
    default_project: Option<String>,
}

impl ListRequirementsTool {
    pub fn new(client: PolarionClient, default_project: Option<String>) -> Self {
        Self {
            client,
            default_project,
        }
    }
}

#[async_trait::async_trait]
impl Tool for ListRequirementsTool {
    fn schema(&self) -> ToolSchema {
        let project_hint = match self.default_project {
            Some(ref p) => format!("Project ID (default: {})", p),
            None => "Project ID".to_string(),
        };
        ToolSchema {
            name: "get_polarion_requirements".to_string(),
            description: "List requirement work items of a project".to_string(),
            input_schema: json_schema_object(
                json!({
                    "project_id": json_schema_string(&project_hint),
                    "limit": json_schema_integer("Maximum number of requirements (default: 10)", 1, MAX_PAGE_SIZE as u64),
                    "query": json_schema_string("Optional extra Polarion query, combined with AND")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: RequirementsArgs = parse_args("get_polarion_requirements", arguments)?;
        let project_id = args
            .project_id
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.default_project.clone())
            .ok_or_else(|| {
                PolarionError::Validation(
                    "project_id is required (no default project configured)".to_string(),
                )
            })?;

        let items = self
            .client
            .work_items()
            .requirements(&project_id, args.query.as_deref(), args.limit)
            .await?;
        Ok(json!({
            "status": "success",
            "message": format!(
                "Successfully fetched {} requirements from project {}",
                items.len(),
                project_id
            ),
            "count": items.len(),
            "project_id": project_id,
            "requirements": items,
        }))
    }
}
