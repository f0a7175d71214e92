//! HTTP adapter.
//!
//! Thin request/response layer over the core: parses a JSON body into code
//! plus partial policy fields, invokes the supervisor on a blocking worker,
//! and serializes the [`ExecutionResult`] back as JSON. Permissive CORS for
//! browser clients.

use std::net::SocketAddr;

use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{Result, SandboxError};
use crate::exec::{run_sandboxed_code, ExecutionResult};
use crate::policy::PolicyConfig;

/// JSON body accepted by `POST /execute`. Absent fields fall back to the
/// policy defaults.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub code: String,
    pub timeout: Option<f64>,
    pub memory: Option<u64>,
    pub allow_file_read: Option<bool>,
    pub allow_file_write: Option<bool>,
    pub allow_network: Option<bool>,
    pub restricted_imports: Option<Vec<String>>,
    pub allowed_imports: Option<Vec<String>>,
    pub allowed_file_paths: Option<Vec<String>>,
    pub allowed_network_addresses: Option<Vec<String>>,
    pub input: Option<String>,
}

impl ExecuteRequest {
    pub fn to_policy(&self) -> PolicyConfig {
        let mut config = PolicyConfig::default();
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(memory) = self.memory {
            config.memory_limit_mb = memory;
        }
        if let Some(read) = self.allow_file_read {
            config.allow_file_read = read;
        }
        if let Some(write) = self.allow_file_write {
            config.allow_file_write = write;
        }
        if let Some(network) = self.allow_network {
            config.allow_network = network;
        }
        if let Some(restricted) = &self.restricted_imports {
            config.restricted_imports = restricted.clone();
        }
        if let Some(allowed) = &self.allowed_imports {
            config.allowed_imports = allowed.clone();
        }
        if let Some(paths) = &self.allowed_file_paths {
            config.allowed_file_paths = paths.clone();
        }
        if let Some(addresses) = &self.allowed_network_addresses {
            config.allowed_network_addresses = addresses.clone();
        }
        config
    }
}

pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(info))
        .route("/health", get(info))
        .route("/execute", post(execute))
        .layer(cors)
}

/// Bind and serve until the process is stopped.
pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("spybox API server listening on http://{}", addr);

    axum::serve(listener, router())
        .await
        .map_err(|e| SandboxError::Process(format!("server error: {}", e)))?;
    Ok(())
}

async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "running",
        "message": "Sandbox Runner API",
        "endpoints": {
            "POST /execute": "Execute Python code in sandbox",
            "GET /health": "Health check"
        }
    }))
}

async fn execute(
    Json(request): Json<ExecuteRequest>,
) -> std::result::Result<Json<ExecutionResult>, (StatusCode, Json<serde_json::Value>)> {
    if request.code.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Missing 'code' parameter",
        ));
    }

    let config = request.to_policy();
    if let Err(e) = config.validate() {
        return Err(error_response(StatusCode::BAD_REQUEST, &e.to_string()));
    }

    let code = request.code.clone();
    let input = request.input.clone();
    let result = tokio::task::spawn_blocking(move || {
        run_sandboxed_code(&code, &config, input.as_deref())
    })
    .await
    .map_err(|e| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Server error: {}", e),
        )
    })?;

    Ok(Json(result))
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn post_execute(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/execute")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn blank_code_is_rejected_with_400() {
        let response = router()
            .oneshot(post_execute(r#"{"code": "   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_timeout_is_rejected_with_400() {
        let response = router()
            .oneshot(post_execute(r#"{"code": "print(1)", "timeout": -1.0}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_endpoint_answers_ok() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn request_fields_override_policy_defaults() {
        let request: ExecuteRequest = serde_json::from_str(
            r#"{
                "code": "print('hi')",
                "timeout": 3.0,
                "allow_network": true,
                "allowed_imports": ["requests"]
            }"#,
        )
        .unwrap();

        let config = request.to_policy();
        assert_eq!(config.timeout_seconds, 3.0);
        assert_eq!(config.memory_limit_mb, 128);
        assert!(config.allow_network);
        assert_eq!(config.allowed_imports, vec!["requests"]);
        assert_eq!(config.restricted_imports.len(), 6);
    }

    #[test]
    fn missing_code_deserializes_to_empty_string() {
        let request: ExecuteRequest = serde_json::from_str(r#"{"timeout": 1.0}"#).unwrap();
        assert!(request.code.is_empty());
    }
}
