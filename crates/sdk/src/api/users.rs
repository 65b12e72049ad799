//! Users API endpoints.

use super::{fields_or, require_id, Resource, ResourceDocument};
use crate::client::PolarionClient;
use crate::config::BASIC_FIELDS;
use crate::error::PolarionResult;

/// Users API.
pub struct UsersApi<'a> {
    client: &'a PolarionClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a PolarionClient) -> Self {
        Self { client }
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str, fields: Option<&str>) -> PolarionResult<Resource> {
        let user_id = require_id("user_id", user_id)?;
        let query = [("fields[users]", fields_or(fields, BASIC_FIELDS))];

        let response: ResourceDocument = self
            .client
            .get_authenticated(&["rest", "v1", "users", user_id], &query)
            .await?;
        tracing::info!(user_id, "Fetched user");
        Ok(response.data)
    }
}
