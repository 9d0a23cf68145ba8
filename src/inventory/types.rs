use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::listing::Page;
use crate::gateway::Record;

/// Query string of the device list
#[derive(Debug, Default, Deserialize)]
pub struct DeviceListQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Query string of the job list
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignVlanForm {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub interface_name: String,
    #[serde(default)]
    pub vlan_id: String,
}

#[derive(Deserialize)]
pub struct ProvisionForm {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardView {
    pub username: Option<String>,
    pub device_list: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceListView {
    pub devices: Page,
    pub search_query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceDetailView {
    pub device_id: String,
    pub hostname: String,
    pub device_interfaces: Vec<Value>,
    /// `None` when the VLAN fetch failed; the interfaces are still shown
    pub vlan_list: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListView {
    pub jobs: Page,
    pub search_query: String,
    pub current_sort: String,
    pub current_order: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VlanCatalogView {
    pub catalog: Vec<Record>,
}

/// Answer to a mutating request that queued a backend job
#[derive(Debug, Serialize, Deserialize)]
pub struct JobAcknowledgement {
    pub job_id: String,
    pub message: String,
}
