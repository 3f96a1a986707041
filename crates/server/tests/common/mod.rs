//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router around a real
//! ticket service, backed by either a temp JSON file or an in-memory store
//! with failure injection.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use helpdesk_core::{
    Config, JsonFileStore, MemoryTicketStore, StorageBackend, StorageConfig, TicketService,
    TicketStore, WritePolicy,
};
use helpdesk_server::{api::create_router, state::AppState};

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/tickets", json!({
///         "subject": "Printer",
///         "description": "Jammed"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Memory store, when the fixture was built with one
    pub memory_store: Option<Arc<MemoryTicketStore>>,
    /// Temporary directory for the ticket file
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

impl TestFixture {
    /// Fixture backed by a JSON file in a temp directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("tickets.json");

        let store: Arc<dyn TicketStore> =
            Arc::new(JsonFileStore::new(&path).expect("Failed to create ticket store"));

        let config = Config {
            storage: StorageConfig {
                backend: StorageBackend::File,
                path: Some(path),
                ..StorageConfig::default()
            },
            ..Config::default()
        };

        Self::build(config, store, None, temp_dir)
    }

    /// Fixture backed by an in-memory store whose failures can be toggled.
    pub fn with_memory_store(write_policy: WritePolicy) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let memory_store = Arc::new(MemoryTicketStore::new());

        let config = Config {
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                write_policy,
                ..StorageConfig::default()
            },
            ..Config::default()
        };

        let store = Arc::clone(&memory_store) as Arc<dyn TicketStore>;
        Self::build(config, store, Some(memory_store), temp_dir)
    }

    fn build(
        config: Config,
        store: Arc<dyn TicketStore>,
        memory_store: Option<Arc<MemoryTicketStore>>,
        temp_dir: TempDir,
    ) -> Self {
        let tickets = TicketService::new(store).with_write_policy(config.storage.write_policy);
        let state = Arc::new(AppState::new(config, tickets));
        let router = create_router(state);

        Self {
            router,
            memory_store,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a request with raw string body and custom content type
    /// (for testing malformed JSON and wrong content types).
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Create a ticket and return its JSON.
    pub async fn create_ticket(&self, subject: &str, description: &str) -> Value {
        let response = self
            .post(
                "/api/tickets",
                serde_json::json!({ "subject": subject, "description": description }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
