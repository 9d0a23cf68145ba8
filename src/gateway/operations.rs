use reqwest::Method;
use std::time::Duration;

const SHORT_READ: Duration = Duration::from_secs(5);
const LONG_READ: Duration = Duration::from_secs(10);
const MUTATION: Duration = Duration::from_secs(10);
const PROVISIONING: Duration = Duration::from_secs(15);

/// One authenticated backend capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListDevices,
    DeviceInterfaces {
        device_id: String,
    },
    DeviceVlans {
        device_id: String,
    },
    VlanCatalog,
    AssignVlan {
        device_id: String,
        vlan_id: String,
        interface_name: String,
    },
    ProvisionDevice {
        hostname: String,
    },
    ListJobs,
    Ping,
}

impl Operation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListDevices => "list_devices",
            Operation::DeviceInterfaces { .. } => "device_interfaces",
            Operation::DeviceVlans { .. } => "device_vlans",
            Operation::VlanCatalog => "vlan_catalog",
            Operation::AssignVlan { .. } => "assign_vlan",
            Operation::ProvisionDevice { .. } => "provision_device",
            Operation::ListJobs => "list_jobs",
            Operation::Ping => "ping",
        }
    }

    pub fn method(&self) -> Method {
        if self.is_mutating() {
            Method::POST
        } else {
            Method::GET
        }
    }

    /// Path segments below the backend root; each one is percent-encoded when joined
    pub fn path_segments(&self) -> Vec<&str> {
        match self {
            Operation::ListDevices => vec!["devices"],
            Operation::DeviceInterfaces { device_id } => {
                vec!["interfaces", device_id.as_str(), "interfaces_db"]
            }
            Operation::DeviceVlans { device_id } => vec!["vlans", device_id.as_str(), "fetch_vlans_db"],
            Operation::VlanCatalog => vec!["vlans", "get_vlan_catalog_db"],
            Operation::AssignVlan {
                device_id, vlan_id, ..
            } => vec!["vlans", "access_vlan", device_id.as_str(), vlan_id.as_str()],
            Operation::ProvisionDevice { hostname } => vec!["devices", "provision", hostname.as_str()],
            Operation::ListJobs => vec!["other", "jobs", "all"],
            Operation::Ping => vec!["ping"],
        }
    }

    pub fn query(&self) -> Vec<(&'static str, &str)> {
        match self {
            Operation::AssignVlan { interface_name, .. } => {
                vec![("interface_name", interface_name.as_str())]
            }
            _ => Vec::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        match self {
            Operation::ListDevices
            | Operation::DeviceInterfaces { .. }
            | Operation::DeviceVlans { .. }
            | Operation::Ping => SHORT_READ,
            Operation::VlanCatalog | Operation::ListJobs => LONG_READ,
            Operation::AssignVlan { .. } => MUTATION,
            Operation::ProvisionDevice { .. } => PROVISIONING,
        }
    }

    /// Mutating calls are delivered at most once; a retry could start a second job
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::AssignVlan { .. } | Operation::ProvisionDevice { .. }
        )
    }

    /// Message shown when the backend fails without explaining why
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::ListDevices => "Failed to fetch devices",
            Operation::DeviceInterfaces { .. } => "Failed to fetch device interfaces",
            Operation::DeviceVlans { .. } => "Failed to fetch device VLANs",
            Operation::VlanCatalog => "Failed to fetch VLAN catalog",
            Operation::AssignVlan { .. } => "Failed to assign VLAN",
            Operation::ProvisionDevice { .. } => "Provisioning failed",
            Operation::ListJobs => "Failed to fetch jobs",
            Operation::Ping => "Session check failed",
        }
    }
}
