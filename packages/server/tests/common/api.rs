//! In-process HTTP client for the REST API.
//!
//! Drives the full axum router (middleware, extractors, error rendering)
//! against the in-memory dependencies, without binding a socket.

#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use family_core::kernel::TestDependencies;
use family_core::server::{build_app, HttpSettings};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "family-moments-test-boundary";

/// A file part for a multipart upload.
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> FilePart<'a> {
    pub fn image(file_name: &'a str) -> Self {
        Self {
            file_name,
            content_type: Some("image/jpeg"),
            bytes: b"\xFF\xD8\xFF\xE0fake-jpeg",
        }
    }
}

pub struct ApiClient {
    pub deps: TestDependencies,
    router: Router,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    pub fn with_deps(deps: TestDependencies) -> Self {
        Self::with_timeout(deps, Duration::from_secs(30))
    }

    pub fn with_timeout(deps: TestDependencies, request_timeout: Duration) -> Self {
        let router = build_app(
            deps.server_deps(),
            HttpSettings {
                environment: "test".to_string(),
                client_url: None,
                request_timeout,
                rate_limit_enabled: false,
            },
        );
        Self { deps, router }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// Send a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// `POST /posts` with multipart `media` files and text fields.
    pub async fn upload(
        &self,
        token: &str,
        files: &[FilePart<'_>],
        fields: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        for file in files {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"media\"; filename=\"{}\"\r\n",
                    file.file_name
                )
                .as_bytes(),
            );
            if let Some(content_type) = file.content_type {
                body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(file.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/posts")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .expect("request should build");
        self.send(request).await
    }

    /// Register a user and return `(token, user json)`.
    pub async fn register(&self, first_name: &str) -> (String, Value) {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                serde_json::json!({
                    "email": format!("{}@example.com", first_name.to_lowercase()),
                    "password": "secret123",
                    "firstName": first_name,
                    "lastName": "Tester",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let token = body["token"].as_str().expect("token").to_string();
        (token, body["user"].clone())
    }
}
