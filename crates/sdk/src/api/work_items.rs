//! Work items API endpoints.

use super::{fields_or, require_id, Resource, ResourceDocument, ResourceList};
use crate::client::PolarionClient;
use crate::config::BASIC_FIELDS;
use crate::error::PolarionResult;

/// Lucene query selecting requirement work items.
pub const REQUIREMENT_QUERY: &str = "type:requirement";

/// Work items API.
pub struct WorkItemsApi<'a> {
    client: &'a PolarionClient,
}

impl<'a> WorkItemsApi<'a> {
    pub(crate) fn new(client: &'a PolarionClient) -> Self {
        Self { client }
    }

    /// List work items of a project.
    ///
    /// `query` is a Polarion Lucene query; `fields` defaults to the
    /// configured light field set.
    pub async fn list(
        &self,
        project_id: &str,
        query: Option<&str>,
        limit: Option<usize>,
        fields: Option<&str>,
    ) -> PolarionResult<Vec<Resource>> {
        let project_id = require_id("project_id", project_id)?;
        let limit = self.client.config().effective_limit(limit);

        let mut params = vec![
            (
                "fields[workitems]",
                fields_or(fields, &self.client.config().work_item_fields),
            ),
            ("page[size]", limit.to_string()),
        ];
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("query", q.to_string()));
        }

        let response: ResourceList = self
            .client
            .get_authenticated(&["rest", "v1", "projects", project_id, "workitems"], &params)
            .await?;
        let items = response.into_limited(limit);
        tracing::info!(project_id, count = items.len(), "Fetched work items");
        Ok(items)
    }

    /// List requirement work items, optionally narrowed by another query.
    pub async fn requirements(
        &self,
        project_id: &str,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> PolarionResult<Vec<Resource>> {
        let combined = requirement_query(query);
        self.list(project_id, Some(&combined), limit, None).await
    }

    /// Get a specific work item by ID.
    pub async fn get(
        &self,
        project_id: &str,
        work_item_id: &str,
        fields: Option<&str>,
    ) -> PolarionResult<Resource> {
        let project_id = require_id("project_id", project_id)?;
        let work_item_id = require_id("work_item_id", work_item_id)?;
        let query = [("fields[workitems]", fields_or(fields, BASIC_FIELDS))];

        let response: ResourceDocument = self
            .client
            .get_authenticated(
                &["rest", "v1", "projects", project_id, "workitems", work_item_id],
                &query,
            )
            .await?;
        tracing::info!(project_id, work_item_id, "Fetched work item");
        Ok(response.data)
    }
}

fn requirement_query(extra: Option<&str>) -> String {
    match extra.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("{} AND ({})", REQUIREMENT_QUERY, q),
        None => REQUIREMENT_QUERY.to_string(),
    }
}
