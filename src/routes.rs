use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::inventory;
use crate::session;
use crate::shared::AppState;

/// Builds the full portal router. Every route passes through the session guard,
/// which renews stale access tokens before any handler talks to the backend.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(session::landing))
        .route("/login", post(session::login))
        .route("/logout", get(session::logout))
        .route("/check_session", get(session::check_session))
        .route("/dashboard", get(inventory::dashboard))
        .route("/devices", get(inventory::device_list))
        .route("/devices/provision", post(inventory::provision_device))
        .route("/devices/:device_id/:hostname", get(inventory::device_detail))
        .route("/jobs", get(inventory::job_list))
        .route("/vlans/assign", post(inventory::assign_vlan))
        .route("/vlans/catalog", get(inventory::vlan_catalog))
        .route("/api/info", get(inventory::api_info))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
