use chrono::Duration;
use tracing::debug;

use crate::shared::AppError;

/// Minutes before expiry at which an access token is considered stale
pub const DEFAULT_REFRESH_THRESHOLD_MINUTES: i64 = 5;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_EXPIRATION_HOURS: i64 = 12;

/// Runtime configuration, built once at startup and injected everywhere it is needed
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Backend root for authenticated operations, `/token` and `/refresh`
    pub api_url: String,
    /// Backend root used for the `/openapi.json` metadata probe
    pub api_root: String,
    pub bind_address: String,
    pub refresh_threshold: Duration,
    pub session_ttl: Duration,
    pub secure_cookies: bool,
}

impl PortalConfig {
    /// Builds a configuration pointing at the given backend, with defaults for everything else
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = trim_root(api_url.into());
        Self {
            api_root: api_url.clone(),
            api_url,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            refresh_threshold: Duration::minutes(DEFAULT_REFRESH_THRESHOLD_MINUTES),
            session_ttl: Duration::hours(DEFAULT_SESSION_EXPIRATION_HOURS),
            secure_cookies: false,
        }
    }

    /// Reads the configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so parsing can be tested
    /// without touching the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(api_url);

        if let Some(api_root) = lookup("API_ROOT") {
            config.api_root = trim_root(api_root);
        }
        if let Some(bind_address) = lookup("BIND_ADDRESS") {
            config.bind_address = bind_address;
        }
        if let Some(minutes) = lookup("REFRESH_THRESHOLD_MINUTES") {
            let minutes: i64 = minutes.parse().map_err(|_| {
                AppError::Config(format!("REFRESH_THRESHOLD_MINUTES is not a number: {minutes}"))
            })?;
            config.refresh_threshold = Duration::minutes(minutes);
        }
        if let Some(hours) = lookup("SESSION_EXPIRATION_HOURS") {
            let hours: i64 = hours.parse().map_err(|_| {
                AppError::Config(format!("SESSION_EXPIRATION_HOURS is not a number: {hours}"))
            })?;
            config.session_ttl = Duration::hours(hours);
        }
        if let Some(secure) = lookup("SECURE_COOKIES") {
            config.secure_cookies = matches!(secure.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;

        debug!(
            api_url = %config.api_url,
            api_root = %config.api_root,
            refresh_threshold_minutes = config.refresh_threshold.num_minutes(),
            "Loaded portal configuration"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        for (name, url) in [("API_URL", &self.api_url), ("API_ROOT", &self.api_root)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "{name} must be an http(s) URL, got {url}"
                )));
            }
        }
        if self.refresh_threshold < Duration::zero() {
            return Err(AppError::Config(
                "REFRESH_THRESHOLD_MINUTES must not be negative".to_string(),
            ));
        }
        if self.session_ttl <= Duration::zero() {
            return Err(AppError::Config(
                "SESSION_EXPIRATION_HOURS must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn trim_root(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
