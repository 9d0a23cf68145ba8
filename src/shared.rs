use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::PortalConfig;
use crate::gateway::{BackendGateway, GatewayError};
use crate::session::{
    HttpTokenRefresher, InMemorySessionRepository, SessionRepository, SessionTokenGuard,
    TokenRefresher,
};

/// Where unauthenticated browsers are sent
pub const LOGIN_ROUTE: &str = "/";

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub session_repository: Arc<dyn SessionRepository + Send + Sync>,
    pub gateway: BackendGateway,
    pub token_guard: Arc<SessionTokenGuard>,
}

impl AppState {
    pub fn new(
        config: PortalConfig,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        gateway: BackendGateway,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        let token_guard = Arc::new(SessionTokenGuard::new(refresher, config.refresh_threshold));

        Self {
            config: Arc::new(config),
            session_repository,
            gateway,
            token_guard,
        }
    }

    /// Production wiring: in-memory sessions and the backend's own refresh endpoint
    pub fn from_config(config: PortalConfig) -> Result<Self, AppError> {
        let gateway = BackendGateway::new(&config)?;
        let refresher = HttpTokenRefresher::new(gateway.http_client().clone(), &config)?;

        Ok(Self::new(
            config,
            Arc::new(InMemorySessionRepository::new()),
            gateway,
            Arc::new(refresher),
        ))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// No usable token in the session; the browser is sent back to the login page
    #[error("Login required")]
    LoginRequired,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::LoginRequired => return Redirect::to(LOGIN_ROUTE).into_response(),
            AppError::InvalidCredentials(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Gateway(error) => (error.status_code(), error.to_string()),
            AppError::SessionStore(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Session store error: {}", msg),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Config(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
