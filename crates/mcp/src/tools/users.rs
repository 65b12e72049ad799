// User tool

use crate::protocol::ToolSchema;
use crate::tools::{json_schema_object, json_schema_string, parse_args, Tool};
use polarion_core::PolarionResult;
use polarion_sdk::PolarionClient;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct GetUserArgs {
    user_id: String,
    #[serde(default)]
    fields: Option<String>,
}

/// Fetches a Polarion user
pub struct GetUserTool {
    client: PolarionClient,
}

impl GetUserTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetUserTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_polarion_user".to_string(),
            description: "Get a Polarion user by ID".to_string(),
            input_schema: json_schema_object(
                json!({
                    "user_id": json_schema_string("User ID"),
                    "fields": json_schema_string("Fields to return: @basic (default) or @all")
                }),
                vec!["user_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: GetUserArgs = parse_args("get_polarion_user", arguments)?;
        let user = self
            .client
            .users()
            .get(&args.user_id, args.fields.as_deref())
            .await?;
        Ok(json!({
            "status": "success",
            "message": format!("Successfully fetched user: {}", args.user_id),
            "user": user,
        }))
    }
}
