use super::{ApiError, ApiResult};
use crate::config::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::Uri,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

type Shared = State<Arc<AppState>>;

/// Run a tool through the shared registry
async fn invoke(state: &AppState, tool: &str, arguments: Value) -> ApiResult<Json<Value>> {
    let value = state.registry.invoke(tool, arguments).await?;
    Ok(Json(value))
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(q)| q)
        .map_err(|e| ApiError::validation(e.body_text()))
}

fn path<T>(path: Result<Path<T>, PathRejection>) -> ApiResult<T> {
    path.map(|Path(p)| p)
        .map_err(|e| ApiError::validation(e.body_text()))
}

/// Unknown routes still answer with the JSON error body
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// Service info and the list of available tools
pub async fn root(State(state): Shared) -> Json<Value> {
    let tools: Vec<String> = state
        .registry
        .list_schemas()
        .into_iter()
        .map(|s| s.name)
        .collect();

    Json(json!({
        "service": "polarion-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "transport": "http",
        "tools": tools,
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "polarion-mcp",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn open_login(State(state): Shared) -> ApiResult<Json<Value>> {
    invoke(&state, "open_polarion_login", json!({})).await
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetTokenRequest {
    pub token: String,
}

pub async fn set_token(
    State(state): Shared,
    payload: Result<Json<SetTokenRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    invoke(&state, "set_polarion_token", json!({ "token": request.token })).await
}

pub async fn verify_token(State(state): Shared) -> ApiResult<Json<Value>> {
    invoke(&state, "verify_polarion_token", json!({})).await
}

pub async fn logout(State(state): Shared) -> ApiResult<Json<Value>> {
    invoke(&state, "logout_polarion", json!({})).await
}

pub async fn check_status(State(state): Shared) -> ApiResult<Json<Value>> {
    invoke(&state, "check_polarion_status", json!({})).await
}

pub async fn check_connectivity(State(state): Shared) -> ApiResult<Json<Value>> {
    invoke(&state, "check_polarion_connectivity", json!({})).await
}

#[derive(Debug, Deserialize)]
pub struct RequirementsQuery {
    pub project_id: Option<String>,
    pub limit: Option<usize>,
    pub query: Option<String>,
}

pub async fn list_requirements(
    State(state): Shared,
    params: Result<Query<RequirementsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let params = query(params)?;
    invoke(
        &state,
        "get_polarion_requirements",
        json!({
            "project_id": params.project_id,
            "limit": params.limit,
            "query": params.query,
        }),
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct FieldsQuery {
    pub fields: Option<String>,
}

pub async fn get_user(
    State(state): Shared,
    user_id: Result<Path<String>, PathRejection>,
    params: Result<Query<FieldsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let user_id = path(user_id)?;
    let params = query(params)?;
    invoke(
        &state,
        "get_polarion_user",
        json!({ "user_id": user_id, "fields": params.fields }),
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

pub async fn list_projects(
    State(state): Shared,
    params: Result<Query<LimitQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let params = query(params)?;
    invoke(&state, "get_polarion_projects", json!({ "limit": params.limit })).await
}

pub async fn get_project(
    State(state): Shared,
    project_id: Result<Path<String>, PathRejection>,
    params: Result<Query<FieldsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let project_id = path(project_id)?;
    let params = query(params)?;
    invoke(
        &state,
        "get_polarion_project",
        json!({ "project_id": project_id, "fields": params.fields }),
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct WorkItemsQuery {
    pub project_id: String,
    pub limit: Option<usize>,
    pub query: Option<String>,
    pub fields: Option<String>,
}

pub async fn list_work_items(
    State(state): Shared,
    params: Result<Query<WorkItemsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let params = query(params)?;
    invoke(
        &state,
        "get_polarion_work_items",
        json!({
            "project_id": params.project_id,
            "limit": params.limit,
            "query": params.query,
            "fields": params.fields,
        }),
    )
    .await
}

pub async fn get_work_item(
    State(state): Shared,
    ids: Result<Path<(String, String)>, PathRejection>,
    params: Result<Query<FieldsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let (project_id, work_item_id) = path(ids)?;
    let params = query(params)?;
    invoke(
        &state,
        "get_polarion_work_item",
        json!({
            "project_id": project_id,
            "work_item_id": work_item_id,
            "fields": params.fields,
        }),
    )
    .await
}

pub async fn get_document(
    State(state): Shared,
    ids: Result<Path<(String, String, String)>, PathRejection>,
    params: Result<Query<FieldsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let (project_id, space_id, document_name) = path(ids)?;
    let params = query(params)?;
    invoke(
        &state,
        "get_polarion_document",
        json!({
            "project_id": project_id,
            "space_id": space_id,
            "document_name": document_name,
            "fields": params.fields,
        }),
    )
    .await
}

pub async fn list_tools(State(state): Shared) -> Json<Value> {
    Json(json!({ "tools": state.registry.list_schemas() }))
}

/// Invoke any registered tool; the body holds its arguments, or is empty
pub async fn call_tool(
    State(state): Shared,
    name: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let name = path(name)?;
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))?
    };
    invoke(&state, &name, arguments).await
}
