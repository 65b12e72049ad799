//! Polarion REST API handles, one per resource type.

pub mod auth;
pub mod documents;
pub mod health;
pub mod projects;
pub mod users;
pub mod work_items;

pub use auth::{AuthApi, LoginInfo, VerifyOutcome};
pub use documents::DocumentsApi;
pub use health::HealthApi;
pub use projects::ProjectsApi;
pub use users::UsersApi;
pub use work_items::WorkItemsApi;

use crate::error::{PolarionError, PolarionResult};
use serde::{Deserialize, Serialize};

/// A JSON:API resource object as returned by Polarion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub attributes: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub relationships: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub links: serde_json::Value,
}

impl Resource {
    /// String attribute, if present.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_str())
    }
}

/// `{"data": [...]}`; a missing or null `data` means no results.
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    data: Option<Vec<Resource>>,
}

impl ResourceList {
    /// Results, cut to `limit` in case the server ignored `page[size]`.
    pub(crate) fn into_limited(self, limit: usize) -> Vec<Resource> {
        let mut data = self.data.unwrap_or_default();
        data.truncate(limit);
        data
    }
}

/// `{"data": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceDocument {
    pub(crate) data: Resource,
}

/// Reject empty identifiers before they turn into odd URLs.
pub(crate) fn require_id<'a>(name: &str, value: &'a str) -> PolarionResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PolarionError::Validation(format!("{} must not be empty", name)));
    }
    Ok(trimmed)
}

/// Caller-supplied field set, or the given default.
pub(crate) fn fields_or(fields: Option<&str>, default: &str) -> String {
    match fields.map(str::trim) {
        Some(f) if !f.is_empty() => f.to_string(),
        _ => default.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_list_limits_and_tolerates_null() {
        let list: ResourceList = serde_json::from_value(serde_json::json!({
            "data": [
                {"type": "projects", "id": "a"},
                {"type": "projects", "id": "b"},
                {"type": "projects", "id": "c"}
            ]
        }))
        .unwrap();
        let limited = list.into_limited(2);
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].id, "b");

        let empty: ResourceList = serde_json::from_value(serde_json::json!({"data": null})).unwrap();
        assert!(empty.into_limited(5).is_empty());
    }

    #[test]
    fn test_resource_requires_type_and_id() {
        let result: Result<ResourceList, _> =
            serde_json::from_value(serde_json::json!({"data": [{"id": "a"}]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id("project_id", " P1 ").unwrap(), "P1");
        assert!(matches!(
            require_id("project_id", "  "),
            Err(PolarionError::Validation(_))
        ));
    }

    #[test]
    fn test_fields_or() {
        assert_eq!(fields_or(None, "@basic"), "@basic");
        assert_eq!(fields_or(Some(" "), "@basic"), "@basic");
        assert_eq!(fields_or(Some("@all"), "@basic"), "@all");
    }
}
