//! Session cookie parsing and issuing.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;

/// Cookie carrying the browser's session id
pub const SESSION_COOKIE_NAME: &str = "sessionid";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    get_cookie(headers, SESSION_COOKIE_NAME).filter(|id| !id.is_empty())
}

/// `Set-Cookie` value binding the browser to a session
pub fn session_cookie(session_id: &str, ttl: Duration, secure: bool) -> HeaderValue {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.num_seconds().max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    // Session ids are UUIDs, always valid header text
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| expired_session_cookie())
}

/// `Set-Cookie` value that makes the browser drop its session id
pub fn expired_session_cookie() -> HeaderValue {
    HeaderValue::from_static("sessionid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
