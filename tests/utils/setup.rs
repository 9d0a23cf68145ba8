#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use inventory_portal::{
    session::{
        cookie::SESSION_COOKIE_NAME, HttpTokenRefresher, InMemorySessionRepository, SessionData,
        SessionModel, SessionRepository,
    },
    AppState, BackendGateway, PortalConfig,
};

use super::backend::FakeBackend;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A portal wired to a fake backend, with direct access to the session store
pub struct TestSetup {
    pub backend: FakeBackend,
    pub backend_url: String,
    pub repo: Arc<InMemorySessionRepository>,
    pub state: AppState,
}

pub struct TestSetupBuilder {
    backend: FakeBackend,
    backend_url: Option<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            backend: FakeBackend::new(),
            backend_url: None,
        }
    }

    /// Points the portal at a fixed URL instead of the fake backend
    pub fn with_backend_url(mut self, url: &str) -> Self {
        self.backend_url = Some(url.to_string());
        self
    }

    pub async fn build(self) -> TestSetup {
        let backend_url = match self.backend_url {
            Some(url) => url,
            None => self.backend.start().await,
        };

        let config = PortalConfig::new(backend_url.clone());
        let gateway = BackendGateway::new(&config).unwrap();
        let refresher =
            HttpTokenRefresher::new(gateway.http_client().clone(), &config).unwrap();
        let repo = Arc::new(InMemorySessionRepository::new());

        let state = AppState::new(config, repo.clone(), gateway, Arc::new(refresher));

        TestSetup {
            backend: self.backend,
            backend_url,
            repo,
            state,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSetup {
    pub fn app(&self) -> Router {
        inventory_portal::app(self.state.clone())
    }

    /// Stores a signed-in session and returns its id
    pub async fn signed_in_session(&self, access_token: &str, refresh_token: &str) -> String {
        let session = SessionModel::new(
            SessionData::signed_in(
                access_token.to_string(),
                refresh_token.to_string(),
                "alice".to_string(),
            ),
            self.state.config.session_ttl,
        );
        self.repo.create_session(&session).await.unwrap();
        session.id
    }

    /// Stores a session that holds no tokens at all
    pub async fn anonymous_session(&self) -> String {
        let session = SessionModel::new(SessionData::anonymous(), self.state.config.session_ttl);
        self.repo.create_session(&session).await.unwrap();
        session.id
    }

    pub async fn stored_access_token(&self, session_id: &str) -> Option<String> {
        self.repo
            .get_session(session_id)
            .await
            .unwrap()
            .and_then(|session| session.data.access_token().map(str::to_string))
    }

    pub async fn get(&self, uri: &str, session_id: Option<&str>) -> Response {
        let request = with_cookie(Request::builder().uri(uri), session_id)
            .body(Body::empty())
            .unwrap();
        self.app().oneshot(request).await.unwrap()
    }

    pub async fn post_form(&self, uri: &str, session_id: Option<&str>, form: &str) -> Response {
        let request = with_cookie(Request::builder().method("POST").uri(uri), session_id)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.app().oneshot(request).await.unwrap()
    }
}

fn with_cookie(
    builder: axum::http::request::Builder,
    session_id: Option<&str>,
) -> axum::http::request::Builder {
    match session_id {
        Some(id) => builder.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={id}")),
        None => builder,
    }
}

// ============================================================================
// Response helpers
// ============================================================================

pub async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Session id issued by a `Set-Cookie` header, if any
pub fn issued_session_id(response: &Response) -> Option<String> {
    let cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let (pair, _) = cookie.split_once(';').unwrap_or((cookie, ""));
    let (name, value) = pair.split_once('=')?;
    (name == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
}
