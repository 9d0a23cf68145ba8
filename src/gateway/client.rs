//! Uniform call layer for the inventory backend.

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::error::{GatewayError, GatewayResult};
use super::operations::Operation;
use super::types::{ApiInfo, DeviceInterfaces, JobAccepted, ProvisionRequest, Record, TokenPair};
use crate::config::PortalConfig;
use crate::shared::AppError;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);
const METADATA_TIMEOUT: Duration = Duration::from_millis(500);

/// Authenticated client for every backend capability the portal exposes.
///
/// Nothing is retried here. Reads are safe to repeat but mutating calls are
/// at-most-once, so repetition is left to the user re-submitting a form.
#[derive(Debug, Clone)]
pub struct BackendGateway {
    client: Client,
    api_url: Url,
    api_root: Url,
}

impl BackendGateway {
    pub fn new(config: &PortalConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: &PortalConfig) -> Result<Self, AppError> {
        let parse = |name: &str, url: &str| {
            Url::parse(url).map_err(|e| AppError::Config(format!("Invalid {name} {url}: {e}")))
        };

        Ok(Self {
            client,
            api_url: parse("API_URL", &config.api_url)?,
            api_root: parse("API_ROOT", &config.api_root)?,
        })
    }

    /// Shared HTTP client, so the token refresher can reuse its connection pool
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Calls an operation and decodes the success body into `T`
    pub async fn call<T>(&self, operation: &Operation, token: &str) -> GatewayResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.authenticated_request(operation, token)?;
        self.execute(operation, request).await
    }

    /// Calls an operation with a JSON payload
    pub async fn call_with_body<T, B>(
        &self,
        operation: &Operation,
        token: &str,
        body: &B,
    ) -> GatewayResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.authenticated_request(operation, token)?.json(body);
        self.execute(operation, request).await
    }

    pub async fn list_devices(&self, token: &str) -> GatewayResult<Vec<Record>> {
        self.call(&Operation::ListDevices, token).await
    }

    pub async fn device_interfaces(
        &self,
        token: &str,
        device_id: &str,
    ) -> GatewayResult<DeviceInterfaces> {
        let operation = Operation::DeviceInterfaces {
            device_id: device_id.to_string(),
        };
        self.call(&operation, token).await
    }

    pub async fn device_vlans(&self, token: &str, device_id: &str) -> GatewayResult<Value> {
        let operation = Operation::DeviceVlans {
            device_id: device_id.to_string(),
        };
        self.call(&operation, token).await
    }

    pub async fn vlan_catalog(&self, token: &str) -> GatewayResult<Vec<Record>> {
        self.call(&Operation::VlanCatalog, token).await
    }

    pub async fn assign_vlan(
        &self,
        token: &str,
        device_id: &str,
        interface_name: &str,
        vlan_id: &str,
    ) -> GatewayResult<JobAccepted> {
        let operation = Operation::AssignVlan {
            device_id: device_id.to_string(),
            vlan_id: vlan_id.to_string(),
            interface_name: interface_name.to_string(),
        };
        self.call(&operation, token).await
    }

    pub async fn provision_device(
        &self,
        token: &str,
        hostname: &str,
        username: &str,
        password: &str,
        session_id: &str,
    ) -> GatewayResult<JobAccepted> {
        let operation = Operation::ProvisionDevice {
            hostname: hostname.to_string(),
        };
        let payload = ProvisionRequest {
            username,
            password,
            session_id,
        };
        self.call_with_body(&operation, token, &payload).await
    }

    pub async fn list_jobs(&self, token: &str) -> GatewayResult<Vec<Record>> {
        self.call(&Operation::ListJobs, token).await
    }

    /// Liveness check with the session's token; only a 200 counts, the body is ignored
    #[instrument(skip(self, token))]
    pub async fn ping(&self, token: &str) -> GatewayResult<()> {
        let operation = Operation::Ping;
        let request = self.authenticated_request(&operation, token)?;
        let (status, body) = self.send(&operation, request).await?;
        if status == StatusCode::OK {
            return Ok(());
        }

        classify_status(&operation, status, &body)?;
        Err(GatewayError::BackendError {
            status: status.as_u16(),
            detail: operation.failure_message().to_string(),
        })
    }

    /// Exchanges credentials for a token pair via the form-encoded `/token` endpoint
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> GatewayResult<TokenPair> {
        let url = join(&self.api_url, &["token"], &[])?;
        let response = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .timeout(LOGIN_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error("login", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("login", e))?;

        if status == StatusCode::OK {
            info!("Backend accepted credentials");
            return decode(&body);
        }

        warn!(status = status.as_u16(), "Backend rejected credentials");
        if status.is_server_error() {
            return Err(GatewayError::BackendError {
                status: status.as_u16(),
                detail: error_detail(&body).unwrap_or_else(|| "Login failed".to_string()),
            });
        }
        Err(GatewayError::Unauthorized(
            "Invalid credentials or unauthorized access. Please try again.".to_string(),
        ))
    }

    /// Reads the backend's OpenAPI metadata. Never fails: any problem yields the offline view.
    #[instrument(skip(self))]
    pub async fn api_info(&self) -> ApiInfo {
        let url = match join(&self.api_root, &["openapi.json"], &[]) {
            Ok(url) => url,
            Err(_) => return ApiInfo::offline(),
        };

        let response = match self.client.get(url).timeout(METADATA_TIMEOUT).send().await {
            Ok(response) if response.status() == StatusCode::OK => response,
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Metadata probe failed");
                return ApiInfo::offline();
            }
            Err(e) => {
                debug!(error = %e, "Backend metadata unreachable");
                return ApiInfo::offline();
            }
        };

        match response.json::<Value>().await {
            Ok(document) => ApiInfo::from_openapi(&document),
            Err(e) => {
                debug!(error = %e, "Backend metadata is not JSON");
                ApiInfo::offline()
            }
        }
    }

    fn authenticated_request(
        &self,
        operation: &Operation,
        token: &str,
    ) -> GatewayResult<RequestBuilder> {
        let url = join(&self.api_url, &operation.path_segments(), &operation.query())?;

        Ok(self
            .client
            .request(operation.method(), url)
            .header("accept", "application/json")
            .bearer_auth(token)
            .timeout(operation.timeout()))
    }

    #[instrument(skip(self, request), fields(operation = operation.name()))]
    async fn execute<T>(&self, operation: &Operation, request: RequestBuilder) -> GatewayResult<T>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.send(operation, request).await?;
        classify_status(operation, status, &body)?;
        decode(&body)
    }

    async fn send(
        &self,
        operation: &Operation,
        request: RequestBuilder,
    ) -> GatewayResult<(StatusCode, String)> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation.name(), e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation.name(), e))?;

        debug!(
            operation = operation.name(),
            status = status.as_u16(),
            "Backend responded"
        );

        Ok((status, body))
    }
}

/// Maps a backend status onto the gateway's result shape
pub fn classify_status(operation: &Operation, status: StatusCode, body: &str) -> GatewayResult<()> {
    let code = status.as_u16();

    match code {
        200..=202 => Ok(()),
        401 | 403 => {
            warn!(operation = operation.name(), status = code, "Backend refused the bearer token");
            Err(GatewayError::Unauthorized(
                error_detail(body).unwrap_or_else(|| "Not authenticated".to_string()),
            ))
        }
        404 => Err(GatewayError::NotFound(
            error_detail(body).unwrap_or_else(|| operation.failure_message().to_string()),
        )),
        400..=499 => Err(GatewayError::Rejected {
            status: code,
            detail: error_detail(body).unwrap_or_else(|| operation.failure_message().to_string()),
        }),
        _ => {
            warn!(operation = operation.name(), status = code, "Backend call failed");
            Err(GatewayError::BackendError {
                status: code,
                detail: error_detail(body).unwrap_or_else(|| operation.failure_message().to_string()),
            })
        }
    }
}

/// Extracts the backend's structured `detail` field, if any
pub fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Backend returned a body of unexpected shape");
        GatewayError::Decode(e.to_string())
    })
}

fn transport_error(operation: &str, error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        warn!(operation, "Backend call timed out");
        GatewayError::ConnectionFailure(format!("{operation} timed out"))
    } else {
        warn!(operation, error = %error, "Backend unreachable");
        GatewayError::ConnectionFailure(error.to_string())
    }
}

fn join(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> GatewayResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GatewayError::ConnectionFailure(format!("Invalid backend URL {base}")))?
        .pop_if_empty()
        .extend(segments);

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url)
}
