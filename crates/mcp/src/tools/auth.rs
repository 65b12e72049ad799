// Login flow tools: open the login page, set/verify/clear the token

use crate::protocol::ToolSchema;
use crate::tools::{json_schema_object, json_schema_string, parse_args, Tool};
use polarion_core::PolarionResult;
use polarion_sdk::PolarionClient;
use serde::Deserialize;
use serde_json::{json, Value};

/// Returns the login and token-generation URLs; never opens a browser
pub struct OpenLoginTool {
    client: PolarionClient,
}

impl OpenLoginTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for OpenLoginTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "open_polarion_login".to_string(),
            description: "Get the Polarion login page and token generation page for manual authentication"
                .to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> PolarionResult<Value> {
        let info = self.client.auth().open_login().await;
        Ok(json!({
            "status": "success",
            "message": format!("Open the Polarion login page: {}", info.login_url),
            "login_url": info.login_url,
            "token_page_url": info.token_page_url,
            "instructions": info.instructions,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct SetTokenArgs {
    token: String,
}

/// Stores a token the user generated in Polarion
pub struct SetTokenTool {
    client: PolarionClient,
}

impl SetTokenTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SetTokenTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "set_polarion_token".to_string(),
            description: "Set the Polarion access token generated in the browser".to_string(),
            input_schema: json_schema_object(
                json!({ "token": json_schema_string("Polarion personal access token") }),
                vec!["token"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> PolarionResult<Value> {
        let args: SetTokenArgs = parse_args("set_polarion_token", arguments)?;
        let token = self.client.auth().set_token(&args.token).await?;
        Ok(json!({
            "status": "success",
            "message": "Token set successfully. Call verify_polarion_token or fetch projects to test it.",
            "token_preview": token.masked(),
        }))
    }
}

/// Checks the active token against Polarion
pub struct VerifyTokenTool {
    client: PolarionClient,
}

impl VerifyTokenTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for VerifyTokenTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "verify_polarion_token".to_string(),
            description: "Verify the current token with a lightweight authenticated request"
                .to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> PolarionResult<Value> {
        let outcome = self.client.auth().verify().await?;
        Ok(json!({
            "status": "success",
            "message": "Token accepted by Polarion",
            "state": outcome.state,
            "token_source": outcome.token_source,
            "verified_at": outcome.verified_at,
        }))
    }
}

/// Forgets the token and deletes the persisted copy
pub struct LogoutTool {
    client: PolarionClient,
}

impl LogoutTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for LogoutTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "logout_polarion".to_string(),
            description: "Clear the Polarion token from memory and storage".to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> PolarionResult<Value> {
        self.client.auth().logout().await?;
        Ok(json!({
            "status": "success",
            "message": "Token cleared",
        }))
    }
}
