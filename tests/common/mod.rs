#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use concesionario::{app_router, config::AppConfig, db, AppState};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up the application against an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// Status, headers and decoded JSON body of one test request.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Header value as a string, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = test_config();
        // every connection to sqlite::memory: is its own database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = app_router(state.clone());

        Self { router, state }
    }

    /// Send a JSON request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.request_with_content_type(method, uri, body, "application/json")
            .await
    }

    /// Send a request whose JSON body is labelled with `content_type`.
    pub async fn request_with_content_type(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        content_type: &str,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", content_type);
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body bytes");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json response")
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Creates a marca through the API and returns its id.
    pub async fn seed_marca(&self, name: &str) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/api/marcas",
                Some(serde_json::json!({ "marca": name })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_i64().expect("seeded marca id")
    }

    /// Creates a modelo through the API and returns the created body.
    pub async fn seed_modelo(&self, payload: Value) -> Value {
        let response = self.request(Method::POST, "/api/modelos", Some(payload)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

/// Development configuration pointing at an in-memory database.
pub fn test_config() -> AppConfig {
    AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18_080,
        "development".to_string(),
    )
}
