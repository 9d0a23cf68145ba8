use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Why a token's expiry could not be read
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token carries no expiry claim")]
    MissingExpiry,

    #[error("Token expiry claim is out of range: {0}")]
    InvalidExpiry(f64),
}

/// Freshness of an access token relative to the refresh threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Claims the portal reads out of an access token; recomputed on every request
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<f64>,
}

/// Reads the expiry of a bearer token.
///
/// The signature is not verified. Tokens are issued and checked by the
/// backend, the portal only needs to know when to ask for a new one.
#[instrument(skip(token))]
pub fn read_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode access token payload");
            TokenError::Malformed(e.to_string())
        })?;

    let exp = data.claims.exp.ok_or(TokenError::MissingExpiry)?;
    if !exp.is_finite() {
        return Err(TokenError::InvalidExpiry(exp));
    }

    let secs = exp.floor();
    let nanos = ((exp - secs) * 1_000_000_000.0) as u32;
    let expires_at =
        DateTime::from_timestamp(secs as i64, nanos).ok_or(TokenError::InvalidExpiry(exp))?;

    Ok(TokenClaims { expires_at })
}

/// Classifies a token as fresh or stale. A token is stale when strictly less than
/// `threshold` remains before it expires; exactly `threshold` left is still fresh.
pub fn classify(
    token: &str,
    now: DateTime<Utc>,
    threshold: Duration,
) -> Result<Freshness, TokenError> {
    let claims = read_claims(token)?;
    let remaining = claims.expires_at - now;

    debug!(
        remaining_seconds = remaining.num_seconds(),
        threshold_seconds = threshold.num_seconds(),
        "Classified access token"
    );

    if remaining < threshold {
        Ok(Freshness::Stale)
    } else {
        Ok(Freshness::Fresh)
    }
}
