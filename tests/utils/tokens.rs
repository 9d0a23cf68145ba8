#![allow(dead_code)] // Test utilities may not all be used in every test

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

/// Access token expiring `lifetime` from now, signed with a secret the portal never sees
pub fn access_token_expiring_in(lifetime: Duration) -> String {
    let exp = (Utc::now() + lifetime).timestamp();
    encode(
        &Header::default(),
        &json!({ "sub": "alice", "exp": exp }),
        &EncodingKey::from_secret(b"backend-signing-key"),
    )
    .unwrap()
}
