use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use tracing::{info, instrument, warn};

use super::{
    cookie,
    middleware::{Authenticated, CurrentSession},
    models::{SessionData, SessionModel},
    types::{LandingView, LoginForm},
};
use crate::gateway::GatewayError;
use crate::shared::{AppError, AppState, LOGIN_ROUTE};

pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// GET /
/// Login landing page model with the backend's identity
#[instrument(name = "landing", skip_all)]
pub async fn landing(
    State(state): State<AppState>,
    current: Option<Extension<CurrentSession>>,
) -> Json<LandingView> {
    let current = current.map(|Extension(current)| current).unwrap_or_default();

    Json(LandingView {
        authenticated: current.data.access_token().is_some(),
        username: current.data.username().map(str::to_string),
        api_info: state.gateway.api_info().await,
    })
}

/// POST /login
/// Exchanges credentials for a token pair and binds it to a fresh session
#[instrument(name = "login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let tokens = state
        .gateway
        .login(&form.username, &form.password)
        .await
        .map_err(|e| match e {
            GatewayError::Unauthorized(msg) => AppError::InvalidCredentials(msg),
            GatewayError::ConnectionFailure(_) => AppError::Gateway(GatewayError::ConnectionFailure(
                "Backend server unreachable. Please try again.".to_string(),
            )),
            other => AppError::Gateway(other),
        })?;

    // A new login never reuses the previous session id
    if let Some(previous) = cookie::session_id(&headers) {
        if let Err(e) = state.session_repository.delete_session(previous).await {
            warn!(error = %e, "Could not discard previous session");
        }
    }

    let session = SessionModel::new(
        SessionData::signed_in(tokens.access_token, tokens.refresh_token, form.username),
        state.config.session_ttl,
    );
    state.session_repository.create_session(&session).await?;

    match state.session_repository.cleanup_expired_sessions().await {
        Ok(0) => {}
        Ok(removed) => info!(removed, "Dropped expired sessions"),
        Err(e) => warn!(error = %e, "Expired session cleanup failed"),
    }

    info!(session_id = %session.id, username = ?session.data.username(), "User signed in");

    Ok((
        StatusCode::SEE_OTHER,
        [
            (
                header::SET_COOKIE,
                cookie::session_cookie(
                    &session.id,
                    state.config.session_ttl,
                    state.config.secure_cookies,
                ),
            ),
            (header::LOCATION, HeaderValue::from_static(DASHBOARD_ROUTE)),
        ],
    )
        .into_response())
}

/// GET /logout
/// Destroys the session and its cookie
#[instrument(name = "logout", skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = cookie::session_id(&headers) {
        match state.session_repository.delete_session(session_id).await {
            Ok(()) => info!(session_id = %session_id, "User signed out"),
            Err(e) => warn!(error = %e, "Could not delete session on logout"),
        }
    }

    (
        [(header::SET_COOKIE, cookie::expired_session_cookie())],
        Redirect::to(LOGIN_ROUTE),
    )
        .into_response()
}

/// GET /check_session
/// Asks the backend whether the session's token is still accepted
#[instrument(name = "check_session", skip_all)]
pub async fn check_session(State(state): State<AppState>, auth: Authenticated) -> Redirect {
    match state.gateway.ping(&auth.access_token).await {
        Ok(()) => Redirect::to(DASHBOARD_ROUTE),
        Err(e) => {
            warn!(error = %e, "Session check failed");
            Redirect::to(LOGIN_ROUTE)
        }
    }
}
