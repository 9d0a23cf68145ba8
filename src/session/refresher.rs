use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::PortalConfig;
use crate::shared::AppError;

const REFRESH_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a refresh attempt did not produce a new access token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefreshError {
    #[error("Refresh endpoint unreachable: {0}")]
    Network(String),

    #[error("Refresh rejected by backend with status {status}")]
    Rejected { status: u16 },

    #[error("Refresh response carried no access token: {0}")]
    MalformedBody(String),
}

/// Exchanges a refresh token for a new access token.
///
/// Implementations make at most one attempt per call and never touch session state.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<String, RefreshError>;
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Refresher backed by the backend's `/refresh` endpoint
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    client: Client,
    refresh_url: Url,
}

impl HttpTokenRefresher {
    pub fn new(client: Client, config: &PortalConfig) -> Result<Self, AppError> {
        let refresh_url = Url::parse(&format!("{}/refresh", config.api_url))
            .map_err(|e| AppError::Config(format!("Invalid refresh URL: {e}")))?;

        Ok(Self {
            client,
            refresh_url,
        })
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<String, RefreshError> {
        debug!(url = %self.refresh_url, "Requesting new access token");

        let response = self
            .client
            .post(self.refresh_url.clone())
            .json(&RefreshRequest { refresh_token })
            .timeout(REFRESH_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Refresh request failed");
                RefreshError::Network(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Backend rejected refresh token");
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Refresh response is not valid JSON");
            RefreshError::MalformedBody(e.to_string())
        })?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                info!("Obtained new access token");
                Ok(token)
            }
            _ => Err(RefreshError::MalformedBody(
                "access_token missing or empty".to_string(),
            )),
        }
    }
}
