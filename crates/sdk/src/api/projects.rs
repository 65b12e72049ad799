//! Projects API endpoints.

use super::{fields_or, require_id, Resource, ResourceDocument, ResourceList};
use crate::client::PolarionClient;
use crate::config::BASIC_FIELDS;
use crate::error::PolarionResult;

/// Projects API.
pub struct ProjectsApi<'a> {
    client: &'a PolarionClient,
}

impl<'a> ProjectsApi<'a> {
    pub(crate) fn new(client: &'a PolarionClient) -> Self {
        Self { client }
    }

    /// List projects with the light `@basic` field set.
    pub async fn list(&self, limit: Option<usize>) -> PolarionResult<Vec<Resource>> {
        let limit = self.client.config().effective_limit(limit);
        let query = [
            ("fields[projects]", BASIC_FIELDS.to_string()),
            ("page[size]", limit.to_string()),
        ];

        let response: ResourceList = self
            .client
            .get_authenticated(&["rest", "v1", "projects"], &query)
            .await?;
        let projects = response.into_limited(limit);
        tracing::info!(count = projects.len(), "Fetched projects");
        Ok(projects)
    }

    /// Get a specific project by ID.
    pub async fn get(&self, project_id: &str, fields: Option<&str>) -> PolarionResult<Resource> {
        let project_id = require_id("project_id", project_id)?;
        let query = [("fields[projects]", fields_or(fields, BASIC_FIELDS))];

        let response: ResourceDocument = self
            .client
            .get_authenticated(&["rest", "v1", "projects", project_id], &query)
            .await?;
        tracing::info!(project_id, "Fetched project");
        Ok(response.data)
    }
}
