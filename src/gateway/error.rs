use axum::http::StatusCode;
use thiserror::Error;

/// Outcome of every outbound backend call
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Every way a backend call can fail. The gateway never panics or propagates
/// transport errors directly; callers match on these variants instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// 401/403 from the backend: the bearer token was missing, expired or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other 4xx, carrying the backend's own explanation when it sent one
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("Backend error ({status}): {detail}")]
    BackendError { status: u16, detail: String },

    /// Timeout, refused connection, or a transport failure mid-response
    #[error("API Connection Error: {0}")]
    ConnectionFailure(String),

    /// Success status but a body that does not match the expected shape
    #[error("Invalid response from backend: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Status the portal answers with when this error reaches a handler boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            GatewayError::BackendError { .. } | GatewayError::Decode(_) => StatusCode::BAD_GATEWAY,
            GatewayError::ConnectionFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
