// Status and connectivity tools; neither touches token state

use crate::protocol::ToolSchema;
use crate::tools::{json_schema_object, Tool};
use polarion_core::PolarionResult;
use polarion_sdk::PolarionClient;
use serde_json::{json, Value};

pub struct CheckStatusTool {
    client: PolarionClient,
}

impl CheckStatusTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for CheckStatusTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "check_polarion_status".to_string(),
            description: "Check the current Polarion authentication status".to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> PolarionResult<Value> {
        let status = self.client.health().check_status().await;
        Ok(json!({
            "status": "success",
            "polarion_status": status,
        }))
    }
}

pub struct CheckConnectivityTool {
    client: PolarionClient,
}

impl CheckConnectivityTool {
    pub fn new(client: PolarionClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for CheckConnectivityTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "check_polarion_connectivity".to_string(),
            description: "Probe whether the Polarion instance is reachable".to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> PolarionResult<Value> {
        let report = self.client.health().check_connectivity().await;
        Ok(json!({
            "status": if report.reachable { "success" } else { "error" },
            "base_url": self.client.config().login_url(),
            "connectivity": report,
        }))
    }
}
