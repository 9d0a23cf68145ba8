use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A backend record (device, job, VLAN...) passed through without a fixed schema
pub type Record = serde_json::Map<String, Value>;

/// Token pair returned by `/token`
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Body of `/interfaces/{device_id}/interfaces_db`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceInterfaces {
    pub interfaces: Vec<Value>,
    #[serde(flatten)]
    pub extra: Record,
}

/// Acknowledgement of a queued backend job
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobAccepted {
    pub job_id: Value,
    #[serde(flatten)]
    pub extra: Record,
}

impl JobAccepted {
    pub fn job_id_text(&self) -> String {
        match &self.job_id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }
}

/// Payload for `/devices/provision/{hostname}`
#[derive(Serialize)]
pub struct ProvisionRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub session_id: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Online,
    Offline,
}

/// Backend identity shown on every page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub version: String,
    pub title: String,
    pub status: ApiStatus,
}

pub const DEFAULT_API_TITLE: &str = "Inventory API";

impl ApiInfo {
    pub fn offline() -> Self {
        Self {
            version: "Offline".to_string(),
            title: DEFAULT_API_TITLE.to_string(),
            status: ApiStatus::Offline,
        }
    }

    /// Builds the online view from an OpenAPI document, tolerating missing fields
    pub fn from_openapi(document: &Value) -> Self {
        let info = document.get("info");
        let version = info
            .and_then(|info| info.get("version"))
            .and_then(Value::as_str)
            .unwrap_or("0.0.0");
        let title = info
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_API_TITLE);

        Self {
            version: format!("v{version}"),
            title: title.to_string(),
            status: ApiStatus::Online,
        }
    }
}
