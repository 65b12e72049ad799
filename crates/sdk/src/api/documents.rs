//! Documents API endpoints.

use super::{fields_or, require_id, Resource, ResourceDocument};
use crate::client::PolarionClient;
use crate::config::BASIC_FIELDS;
use crate::error::PolarionResult;

/// Documents API.
pub struct DocumentsApi<'a> {
    client: &'a PolarionClient,
}

impl<'a> DocumentsApi<'a> {
    pub(crate) fn new(client: &'a PolarionClient) -> Self {
        Self { client }
    }

    /// Get a document by space and name.
    pub async fn get(
        &self,
        project_id: &str,
        space_id: &str,
        document_name: &str,
        fields: Option<&str>,
    ) -> PolarionResult<Resource> {
        let project_id = require_id("project_id", project_id)?;
        let space_id = require_id("space_id", space_id)?;
        let document_name = require_id("document_name", document_name)?;
        let query = [("fields[documents]", fields_or(fields, BASIC_FIELDS))];

        let response: ResourceDocument = self
            .client
            .get_authenticated(
                &[
                    "rest",
                    "v1",
                    "projects",
                    project_id,
                    "spaces",
                    space_id,
                    "documents",
                    document_name,
                ],
                &query,
            )
            .await?;
        tracing::info!(project_id, space_id, document_name, "Fetched document");
        Ok(response.data)
    }
}
