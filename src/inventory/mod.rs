// Public API - what other modules can use
pub use handlers::{
    api_info, assign_vlan, dashboard, device_detail, device_list, job_list, provision_device,
    vlan_catalog,
};
pub use listing::{Page, SortOrder, ITEMS_PER_PAGE};
pub use types::{
    DashboardView, DeviceDetailView, DeviceListView, JobAcknowledgement, JobListView,
    VlanCatalogView,
};

// Internal modules
mod handlers;
pub mod listing;
mod types;
