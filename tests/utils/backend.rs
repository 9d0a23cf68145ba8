#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

// ============================================================================
// Fake inventory backend
// ============================================================================

#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Default)]
struct BackendState {
    responses: HashMap<String, CannedResponse>,
    requests: Vec<RecordedRequest>,
}

/// Records every request and answers with whatever was scripted for `METHOD /path`.
/// Unscripted routes answer 404 with a FastAPI-style detail.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves the backend on an ephemeral local port and returns its base URL
    pub async fn start(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let router = Router::new().fallback(handle).with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}", address)
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.respond_raw(method, path, status, &body.to_string(), Duration::ZERO)
    }

    pub fn respond_after(
        &self,
        method: &str,
        path: &str,
        delay: Duration,
        status: u16,
        body: Value,
    ) -> &Self {
        self.respond_raw(method, path, status, &body.to_string(), delay)
    }

    pub fn respond_raw(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: &str,
        delay: Duration,
    ) -> &Self {
        self.state.lock().unwrap().responses.insert(
            route_key(method, path),
            CannedResponse {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.to_string(),
                delay,
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

fn route_key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_uppercase(), path)
}

async fn handle(State(backend): State<FakeBackend>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let header_text = |name: header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).to_string(),
    };

    let canned = {
        let mut state = backend.state.lock().unwrap();
        let key = route_key(&recorded.method, &recorded.path);
        state.requests.push(recorded);
        state.responses.get(&key).cloned()
    };

    match canned {
        Some(canned) => {
            if !canned.delay.is_zero() {
                tokio::time::sleep(canned.delay).await;
            }
            (
                canned.status,
                [(header::CONTENT_TYPE, "application/json")],
                Body::from(canned.body),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"detail":"Not Found"}"#,
        )
            .into_response(),
    }
}
