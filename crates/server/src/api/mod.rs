use crate::config::AppState;
use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use polarion_core::PolarionError;
use polarion_mcp::{ErrorBody, ToolError};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Start the HTTP transport
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP transport listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// One route per tool, plus service info and generic tool dispatch
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Login flow
        .route("/open_polarion_login", post(handlers::open_login))
        .route("/set_polarion_token", post(handlers::set_token))
        .route("/verify_polarion_token", post(handlers::verify_token))
        .route("/logout_polarion", post(handlers::logout))
        // Status
        .route("/check_polarion_status", get(handlers::check_status))
        .route(
            "/check_polarion_connectivity",
            get(handlers::check_connectivity),
        )
        // Polarion resources
        .route("/get_polarion_requirements", get(handlers::list_requirements))
        .route("/get_polarion_user/{user_id}", get(handlers::get_user))
        .route("/get_polarion_projects", get(handlers::list_projects))
        .route("/get_polarion_project/{project_id}", get(handlers::get_project))
        .route("/get_polarion_work_items", get(handlers::list_work_items))
        .route(
            "/get_polarion_work_item/{project_id}/{work_item_id}",
            get(handlers::get_work_item),
        )
        .route(
            "/get_polarion_document/{project_id}/{space_id}/{document_name}",
            get(handlers::get_document),
        )
        // Generic dispatch
        .route("/tools", get(handlers::list_tools))
        .route("/tools/{name}", post(handlers::call_tool))
        .fallback(handlers::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Failure rendered as `{error, detail, guidance?}` with a matching status
#[derive(Debug)]
pub enum ApiError {
    Tool(ToolError),
    NotFound(String),
}

impl ApiError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Tool(ToolError::Polarion(PolarionError::Validation(detail.into())))
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::Tool(ToolError::UnknownTool(_)) => StatusCode::NOT_FOUND,
            Self::Tool(ToolError::Polarion(e)) => match e {
                PolarionError::Validation(_) => StatusCode::BAD_REQUEST,
                PolarionError::Unauthenticated | PolarionError::Auth { .. } => {
                    StatusCode::UNAUTHORIZED
                }
                PolarionError::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
                PolarionError::Api { .. } | PolarionError::Protocol(_) => StatusCode::BAD_GATEWAY,
                PolarionError::Storage(_) | PolarionError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Tool(err) => ErrorBody::from(err),
            Self::NotFound(detail) => ErrorBody {
                error: "not_found".to_string(),
                detail: detail.clone(),
                guidance: Some("GET / lists the available routes and tools".to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        Self::Tool(err)
    }
}

impl From<PolarionError> for ApiError {
    fn from(err: PolarionError) -> Self {
        Self::Tool(ToolError::Polarion(err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use polarion_core::storage::{FileTokenStore, TokenStore};
    use polarion_core::TokenVault;
    use polarion_mcp::default_registry;
    use polarion_sdk::PolarionClient;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn router_for(base_url: &str, dir: &TempDir, default_project: Option<&str>) -> Router {
        let store = Arc::new(FileTokenStore::in_dir(dir.path()));
        let vault = Arc::new(TokenVault::initialize(store, None).await);
        let client = PolarionClient::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(5))
            .vault(vault)
            .build()
            .unwrap();
        create_router(AppState::from_registry(default_registry(
            client,
            default_project.map(str::to_string),
        )))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn set_token(router: &Router, token: &str) {
        let (status, _) = send(router, post_json("/set_polarion_token", json!({"token": token}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_and_root() {
        let dir = TempDir::new().unwrap();
        let router = router_for("http://127.0.0.1:9/polarion", &dir, None).await;

        let (status, body) = send(&router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&router, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tools"].as_array().unwrap().len(), 13);
    }

    #[tokio::test]
    async fn test_unauthenticated_is_401_without_upstream_call() {
        let polarion = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&polarion)
            .await;

        let dir = TempDir::new().unwrap();
        let router = router_for(&format!("{}/polarion", polarion.uri()), &dir, Some("P1")).await;

        let (status, body) = send(&router, get("/get_polarion_requirements?limit=5")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthenticated");
        assert!(body["detail"].is_string());
        assert!(body["guidance"].is_string());
    }

    #[tokio::test]
    async fn test_set_token_validation() {
        let dir = TempDir::new().unwrap();
        let router = router_for("http://127.0.0.1:9/polarion", &dir, None).await;

        let (status, body) =
            send(&router, post_json("/set_polarion_token", json!({"token": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        let (status, body) = send(&router, post_json("/set_polarion_token", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        let (status, _) = send(&router, get("/get_polarion_projects?limit=lots")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_requirements_route() {
        let polarion = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/polarion/rest/v1/projects/P1/workitems"))
            .and(query_param("page[size]", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"type": "workitems", "id": "P1/REQ-1"},
                    {"type": "workitems", "id": "P1/REQ-2"}
                ]
            })))
            .expect(1)
            .mount(&polarion)
            .await;

        let dir = TempDir::new().unwrap();
        let router = router_for(&format!("{}/polarion", polarion.uri()), &dir, Some("P1")).await;
        set_token(&router, "tok").await;

        let (status, body) = send(&router, get("/get_polarion_requirements?limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["project_id"], "P1");
    }

    #[tokio::test]
    async fn test_upstream_errors_map_to_status() {
        let polarion = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/polarion/rest/v1/users/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&polarion)
            .await;
        Mock::given(method("GET"))
            .and(path("/polarion/rest/v1/users/revoked"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&polarion)
            .await;

        let dir = TempDir::new().unwrap();
        let router = router_for(&format!("{}/polarion", polarion.uri()), &dir, None).await;
        set_token(&router, "tok").await;

        let (status, body) = send(&router, get("/get_polarion_user/ghost")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "polarion_api_error");

        let (status, body) = send(&router, get("/get_polarion_user/revoked")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "auth_error");

        // The rejected token is gone from memory but still on disk
        let (_, body) = send(&router, get("/check_polarion_status")).await;
        assert_eq!(body["polarion_status"]["hasToken"], false);
        assert_eq!(body["polarion_status"]["tokenSaved"], true);
    }

    #[tokio::test]
    async fn test_connectivity_unreachable() {
        let dir = TempDir::new().unwrap();
        let router = router_for("http://127.0.0.1:9/polarion", &dir, None).await;

        let (status, body) = send(&router, get("/check_polarion_connectivity")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connectivity"]["reachable"], false);
        assert!(body["connectivity"]["error"].is_string());
    }

    #[tokio::test]
    async fn test_document_route_decodes_path() {
        let polarion = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/polarion/rest/v1/projects/P1/spaces/_default/documents/System%20Requirements",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"type": "documents", "id": "P1/_default/System Requirements"}
            })))
            .expect(1)
            .mount(&polarion)
            .await;

        let dir = TempDir::new().unwrap();
        let router = router_for(&format!("{}/polarion", polarion.uri()), &dir, None).await;
        set_token(&router, "tok").await;

        let (status, body) = send(
            &router,
            get("/get_polarion_document/P1/_default/System%20Requirements"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document"]["id"], "P1/_default/System Requirements");
    }

    #[tokio::test]
    async fn test_generic_tool_dispatch() {
        let dir = TempDir::new().unwrap();
        let router = router_for("http://127.0.0.1:9/polarion", &dir, None).await;

        let (status, body) = send(&router, get("/tools")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tools"].as_array().unwrap().len(), 13);

        let request = Request::builder()
            .method("POST")
            .uri("/tools/open_polarion_login")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["login_url"].is_string());

        let (status, body) = send(&router, post_json("/tools/nope", json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown_tool");
    }

    #[tokio::test]
    async fn test_unknown_routes_answer_with_json() {
        let dir = TempDir::new().unwrap();
        let router = router_for("http://127.0.0.1:9/polarion", &dir, None).await;

        for uri in ["/no_such_route", "/get_polarion_user/", "/get_polarion_work_item/P1"] {
            let (status, body) = send(&router, get(uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body["error"], "not_found");
            assert!(body["detail"].as_str().unwrap().contains(uri));
        }
    }

    #[tokio::test]
    async fn test_bad_path_encoding_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let router = router_for("http://127.0.0.1:9/polarion", &dir, None).await;

        // %FF does not decode to UTF-8
        let (status, body) = send(&router, get("/get_polarion_user/%FF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_concurrent_set_token_leaves_one_value() {
        let dir = TempDir::new().unwrap();
        let router = router_for("http://127.0.0.1:9/polarion", &dir, None).await;

        let a = "a".repeat(4096);
        let b = "b".repeat(4096);
        let mut handles = Vec::new();
        for i in 0..16 {
            let router = router.clone();
            let token = if i % 2 == 0 { a.clone() } else { b.clone() };
            handles.push(tokio::spawn(async move {
                let request = post_json("/set_polarion_token", json!({"token": token}));
                router.oneshot(request).await.unwrap().status()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::OK);
        }

        let stored = FileTokenStore::in_dir(dir.path())
            .load()
            .await
            .unwrap()
            .unwrap();
        assert!(stored.secret() == a || stored.secret() == b);
    }
}
