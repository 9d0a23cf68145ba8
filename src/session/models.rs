use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three fields the portal keeps per browser session.
///
/// The access and refresh tokens are always set or cleared together; the only
/// in-place mutation is replacing the access token after a refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(rename = "auth_token")]
    access_token: Option<String>,
    refresh_token: Option<String>,
    username: Option<String>,
}

impl SessionData {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(access_token: String, refresh_token: String, username: String) -> Self {
        Self {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            username: Some(username),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Both tokens are present
    pub fn has_token_pair(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// Swaps in a renewed access token, leaving refresh token and username alone
    pub fn replace_access_token(&mut self, access_token: String) {
        self.access_token = Some(access_token);
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        username: Option<&str>,
    ) -> Self {
        Self {
            access_token: access_token.map(str::to_string),
            refresh_token: refresh_token.map(str::to_string),
            username: username.map(str::to_string),
        }
    }
}

/// Stored session record keyed by the browser-issued session id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionModel {
    pub id: String, // UUID v4, also the value of the session cookie
    pub data: SessionData,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl SessionModel {
    /// Creates a new session record with a generated id
    pub fn new(data: SessionData, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            data,
            created_at: now,
            expires_at: now + ttl,
            last_accessed: Some(now),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn touch(&mut self) {
        self.last_accessed = Some(Utc::now());
    }
}
