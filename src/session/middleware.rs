use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::cookie;
use super::guard::GuardOutcome;
use super::models::SessionData;
use crate::shared::{AppError, AppState};

/// Session resolved for the current request, after the token guard ran
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub id: Option<String>,
    pub data: SessionData,
}

/// Token refresh middleware - resolves the session cookie, renews a stale access
/// token and exposes the result as a `CurrentSession` request extension.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::session_guard))
///
/// Never rejects a request: store and refresh failures are logged and the request
/// continues with whatever the session held before.
#[instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn session_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let current = resolve_session(&state, cookie::session_id(req.headers())).await;
    req.extensions_mut().insert(current);
    next.run(req).await
}

async fn resolve_session(state: &AppState, session_id: Option<&str>) -> CurrentSession {
    let Some(session_id) = session_id else {
        return CurrentSession::default();
    };

    let mut session = match state.session_repository.get_session(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            debug!("Unknown or expired session cookie");
            return CurrentSession::default();
        }
        Err(e) => {
            warn!(error = %e, "Session lookup failed, treating request as anonymous");
            return CurrentSession::default();
        }
    };

    let outcome = state.token_guard.process(&mut session.data).await;

    if outcome == GuardOutcome::Refreshed {
        if let Some(token) = session.data.access_token() {
            // Only the access token is written, so a concurrent refresh simply overwrites it
            if let Err(e) = state
                .session_repository
                .update_access_token(&session.id, token)
                .await
            {
                warn!(error = %e, "Could not persist refreshed access token");
            }
        }
    }

    CurrentSession {
        id: Some(session.id),
        data: session.data,
    }
}

/// Capability check for handlers that need a bearer token.
///
/// Rejects with `AppError::LoginRequired` before the handler runs, so no backend
/// call is attempted without a token.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub session_id: String,
    pub access_token: String,
    pub username: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = parts
            .extensions
            .get::<CurrentSession>()
            .ok_or(AppError::LoginRequired)?;

        match (&current.id, current.data.access_token()) {
            (Some(session_id), Some(access_token)) => Ok(Self {
                session_id: session_id.clone(),
                access_token: access_token.to_string(),
                username: current.data.username().map(str::to_string),
            }),
            _ => {
                debug!("No access token in session, redirecting to login");
                Err(AppError::LoginRequired)
            }
        }
    }
}
