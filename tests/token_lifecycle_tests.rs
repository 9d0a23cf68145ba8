//! Session token lifecycle through the full router: login, transparent refresh
//! of stale access tokens, session checks and logout.

mod utils;

use axum::http::StatusCode;
use chrono::Duration as TokenLifetime;
use rstest::rstest;
use serde_json::json;
use std::time::Duration;

use inventory_portal::{
    session::{HttpTokenRefresher, RefreshError, TokenRefresher},
    PortalConfig,
};
use utils::setup::{issued_session_id, json_body, location};
use utils::{access_token_expiring_in, FakeBackend, TestSetupBuilder};

// ============================================================================
// HttpTokenRefresher
// ============================================================================

async fn refresher_for(backend: &FakeBackend) -> HttpTokenRefresher {
    let config = PortalConfig::new(backend.start().await);
    HttpTokenRefresher::new(reqwest::Client::new(), &config).unwrap()
}

#[tokio::test]
async fn test_refresher_posts_refresh_token_and_returns_new_access_token() {
    let backend = FakeBackend::new();
    backend.respond("POST", "/refresh", 200, json!({ "access_token": "T2" }));
    let refresher = refresher_for(&backend).await;

    let token = refresher.refresh("R1").await.unwrap();

    assert_eq!(token, "T2");
    let calls = backend.requests_to("/refresh");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].json_body(), json!({ "refresh_token": "R1" }));
    assert!(calls[0].authorization.is_none());
}

#[rstest]
#[case(401, r#"{"detail":"Refresh token expired"}"#)]
#[case(500, r#"{"detail":"boom"}"#)]
#[case(201, r#"{"access_token":"T2"}"#)] // only 200 counts as success
#[tokio::test]
async fn test_refresher_rejects_non_ok_status(#[case] status: u16, #[case] body: &str) {
    let backend = FakeBackend::new();
    backend.respond_raw("POST", "/refresh", status, body, Duration::ZERO);
    let refresher = refresher_for(&backend).await;

    let result = refresher.refresh("R1").await;

    assert_eq!(result, Err(RefreshError::Rejected { status }));
}

#[rstest]
#[case(r#"{}"#)]
#[case(r#"{"access_token":""}"#)]
#[case(r#"{"access_token":null}"#)]
#[case("<html>oops</html>")]
#[tokio::test]
async fn test_refresher_rejects_body_without_access_token(#[case] body: &str) {
    let backend = FakeBackend::new();
    backend.respond_raw("POST", "/refresh", 200, body, Duration::ZERO);
    let refresher = refresher_for(&backend).await;

    let result = refresher.refresh("R1").await;

    assert!(matches!(result, Err(RefreshError::MalformedBody(_))));
}

#[tokio::test]
async fn test_refresher_reports_unreachable_backend() {
    let config = PortalConfig::new("http://127.0.0.1:9");
    let refresher = HttpTokenRefresher::new(reqwest::Client::new(), &config).unwrap();

    let result = refresher.refresh("R1").await;

    assert!(matches!(result, Err(RefreshError::Network(_))));
}

#[tokio::test]
async fn test_refresher_gives_up_on_slow_backend() {
    let backend = FakeBackend::new();
    backend.respond_after(
        "POST",
        "/refresh",
        Duration::from_secs(6),
        200,
        json!({ "access_token": "T2" }),
    );
    let refresher = refresher_for(&backend).await;

    let started = std::time::Instant::now();
    let result = refresher.refresh("R1").await;

    assert!(matches!(result, Err(RefreshError::Network(_))));
    assert!(started.elapsed() < Duration::from_secs(6));
}

// ============================================================================
// Transparent refresh through the router
// ============================================================================

#[tokio::test]
async fn test_stale_token_is_refreshed_before_the_backend_call() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond_after(
        "POST",
        "/refresh",
        Duration::from_millis(50),
        200,
        json!({ "access_token": "T2" }),
    );
    setup
        .backend
        .respond("GET", "/devices", 200, json!([{ "hostname": "core-sw1" }]));

    let stale = access_token_expiring_in(TokenLifetime::minutes(2));
    let session_id = setup.signed_in_session(&stale, "R1").await;

    let response = setup.get("/devices", Some(&session_id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["devices"]["total_count"], json!(1));

    let refreshes = setup.backend.requests_to("/refresh");
    assert_eq!(refreshes.len(), 1);
    assert_eq!(refreshes[0].json_body(), json!({ "refresh_token": "R1" }));

    let device_calls = setup.backend.requests_to("/devices");
    assert_eq!(device_calls.len(), 1);
    assert_eq!(device_calls[0].authorization.as_deref(), Some("Bearer T2"));

    assert_eq!(
        setup.stored_access_token(&session_id).await.as_deref(),
        Some("T2")
    );
}

#[tokio::test]
async fn test_fresh_token_is_used_without_refreshing() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond("GET", "/devices", 200, json!([]));

    let fresh = access_token_expiring_in(TokenLifetime::hours(1));
    let session_id = setup.signed_in_session(&fresh, "R1").await;

    let response = setup.get("/dashboard", Some(&session_id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], json!("alice"));
    assert!(setup.backend.requests_to("/refresh").is_empty());
    assert_eq!(
        setup.backend.requests_to("/devices")[0].authorization,
        Some(format!("Bearer {fresh}"))
    );
}

#[tokio::test]
async fn test_unreadable_token_is_passed_through_unchanged() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond("GET", "/devices", 200, json!([]));
    let session_id = setup.signed_in_session("not-a-jwt", "R1").await;

    let response = setup.get("/dashboard", Some(&session_id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(setup.backend.requests_to("/refresh").is_empty());
    assert_eq!(
        setup.backend.requests_to("/devices")[0].authorization.as_deref(),
        Some("Bearer not-a-jwt")
    );
    assert_eq!(
        setup.stored_access_token(&session_id).await.as_deref(),
        Some("not-a-jwt")
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_stale_token_and_surfaces_backend_rejection() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond(
        "POST",
        "/refresh",
        401,
        json!({ "detail": "Refresh token expired" }),
    );
    setup
        .backend
        .respond("GET", "/devices", 401, json!({ "detail": "Token expired" }));

    let stale = access_token_expiring_in(TokenLifetime::seconds(30));
    let session_id = setup.signed_in_session(&stale, "R1").await;

    let response = setup.get("/devices", Some(&session_id)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(setup.backend.requests_to("/refresh").len(), 1);
    assert_eq!(
        setup.backend.requests_to("/devices")[0].authorization,
        Some(format!("Bearer {stale}"))
    );
    assert_eq!(setup.stored_access_token(&session_id).await, Some(stale));
}

#[tokio::test]
async fn test_session_without_tokens_is_sent_to_login_without_backend_traffic() {
    let setup = TestSetupBuilder::new().build().await;
    let session_id = setup.anonymous_session().await;

    for uri in ["/dashboard", "/devices", "/jobs", "/vlans/catalog", "/check_session"] {
        let response = setup.get(uri, Some(&session_id)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/", "{uri}");
    }

    let response = setup.get("/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(setup.backend.requests().is_empty());
}

#[tokio::test]
async fn test_concurrent_requests_with_stale_token_both_succeed() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond_after(
        "POST",
        "/refresh",
        Duration::from_millis(50),
        200,
        json!({ "access_token": "T2" }),
    );
    setup.backend.respond("GET", "/devices", 200, json!([]));

    let stale = access_token_expiring_in(TokenLifetime::minutes(1));
    let session_id = setup.signed_in_session(&stale, "R1").await;

    let (first, second) = tokio::join!(
        setup.get("/dashboard", Some(&session_id)),
        setup.get("/dashboard", Some(&session_id)),
    );

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    // No per-session lock: each request may refresh on its own, the last write wins
    let refreshes = setup.backend.requests_to("/refresh").len();
    assert!((1..=2).contains(&refreshes));
    for call in setup.backend.requests_to("/devices") {
        assert_eq!(call.authorization.as_deref(), Some("Bearer T2"));
    }
    assert_eq!(
        setup.stored_access_token(&session_id).await.as_deref(),
        Some("T2")
    );
}

// ============================================================================
// Login, session check and logout
// ============================================================================

#[tokio::test]
async fn test_login_creates_session_and_redirects_to_dashboard() {
    let setup = TestSetupBuilder::new().build().await;
    let access = access_token_expiring_in(TokenLifetime::minutes(30));
    setup.backend.respond(
        "POST",
        "/token",
        200,
        json!({ "access_token": access, "refresh_token": "R1", "token_type": "bearer" }),
    );

    let response = setup
        .post_form("/login", None, "username=alice&password=s3cret")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let session_id = issued_session_id(&response).expect("session cookie issued");
    assert_eq!(setup.stored_access_token(&session_id).await, Some(access));
    assert_eq!(setup.repo.session_count(), 1);

    let token_calls = setup.backend.requests_to("/token");
    assert_eq!(token_calls.len(), 1);
    assert_eq!(token_calls[0].body, "username=alice&password=s3cret");
    assert_eq!(
        token_calls[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
}

#[tokio::test]
async fn test_login_replaces_previous_session() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond(
        "POST",
        "/token",
        200,
        json!({ "access_token": "T1", "refresh_token": "R1" }),
    );
    let previous = setup.signed_in_session("T0", "R0").await;

    let response = setup
        .post_form("/login", Some(&previous), "username=alice&password=s3cret")
        .await;

    let session_id = issued_session_id(&response).unwrap();
    assert_ne!(session_id, previous);
    assert_eq!(setup.stored_access_token(&previous).await, None);
    assert_eq!(setup.repo.session_count(), 1);
}

#[tokio::test]
async fn test_login_with_bad_credentials_creates_no_session() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond(
        "POST",
        "/token",
        401,
        json!({ "detail": "Incorrect username or password" }),
    );

    let response = setup
        .post_form("/login", None, "username=alice&password=wrong")
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(issued_session_id(&response).is_none());
    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        json!("Invalid credentials or unauthorized access. Please try again.")
    );
    assert_eq!(setup.repo.session_count(), 0);
}

#[tokio::test]
async fn test_check_session_follows_backend_verdict() {
    let setup = TestSetupBuilder::new().build().await;
    let session_id = setup
        .signed_in_session(&access_token_expiring_in(TokenLifetime::hours(1)), "R1")
        .await;

    setup.backend.respond("GET", "/ping", 200, json!({ "status": "ok" }));
    let response = setup.get("/check_session", Some(&session_id)).await;
    assert_eq!(location(&response), "/dashboard");

    setup
        .backend
        .respond("GET", "/ping", 401, json!({ "detail": "Not authenticated" }));
    let response = setup.get("/check_session", Some(&session_id)).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let setup = TestSetupBuilder::new().build().await;
    setup.backend.respond("GET", "/devices", 200, json!([]));
    let session_id = setup
        .signed_in_session(&access_token_expiring_in(TokenLifetime::hours(1)), "R1")
        .await;

    let response = setup.get("/logout", Some(&session_id)).await;

    assert_eq!(location(&response), "/");
    assert_eq!(setup.repo.session_count(), 0);

    let response = setup.get("/dashboard", Some(&session_id)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(setup.backend.requests_to("/devices").is_empty());
}
