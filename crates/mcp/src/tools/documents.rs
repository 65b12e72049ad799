// Document tool

use crate::protocol::ToolSchema;
use crate::tools::{json_schema_object, json_schema_string, parse_args, Tool};
use polarion_core::PolarionResult;
use polarion_sdk::PolarionClient;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct GetDocumentArgs {
    project_id: String,
    space_id: String,
    document_name: String,
    #[serde(default)]
    fields: Option<String>,
}

/// Fetches a document from a project space
pub struct GetDocumentTool {
    client: PolarionClient,
}

impl GetDocumentTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetDocumentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_polarion_document".to_string(),
            description: "Get a specific document by space and name".to_string(),
            input_schema: json_schema_object(
                json!({
                    "project_id": json_schema_string("Project ID"),
                    "space_id": json_schema_string("Space ID, e.g. _default"),
                    "document_name": json_schema_string("Document name"),
                    "fields": json_schema_string("Fields to return: @basic (default), @all or a comma-separated list")
                }),
                vec!["project_id", "space_id", "document_name"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: GetDocumentArgs = parse_args("get_polarion_document", arguments)?;
        let document = self
            .client
            .documents()
            .get(
                &args.project_id,
                &args.space_id,
                &args.document_name,
                args.fields.as_deref(),
            )
            .await?;
        Ok(json!({
            "status": "success",
            "message": format!(
                "Successfully fetched document: {} from space {} in project {}",
                args.document_name, args.space_id, args.project_id
            ),
            "document": document,
        }))
    }
}
