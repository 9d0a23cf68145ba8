use axum::{
    extract::{Path, Query, State},
    Form, Json,
};
use tracing::{info, instrument, warn};

use super::{
    listing::{filter_records, paginate, parse_page, sort_records, SortOrder, ITEMS_PER_PAGE},
    types::{
        AssignVlanForm, DashboardView, DeviceDetailView, DeviceListQuery, DeviceListView,
        JobAcknowledgement, JobListQuery, JobListView, ProvisionForm, VlanCatalogView,
    },
};
use crate::gateway::ApiInfo;
use crate::session::Authenticated;
use crate::shared::{AppError, AppState};

const DEVICE_SEARCH_FIELDS: &[&str] = &["hostname", "ip_address", "serialnumber", "model"];
const JOB_SEARCH_FIELDS: &[&str] = &["id", "target"];
const DEFAULT_JOB_SORT: &str = "created_at";

/// GET /dashboard
#[instrument(name = "dashboard", skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<DashboardView>, AppError> {
    let device_list = state.gateway.list_devices(&auth.access_token).await?;

    info!(device_count = device_list.len(), "Dashboard loaded");

    Ok(Json(DashboardView {
        username: auth.username,
        device_list,
    }))
}

/// GET /devices?q=&page=
/// Searchable, paginated device inventory
#[instrument(name = "device_list", skip(state, auth))]
pub async fn device_list(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<DeviceListQuery>,
) -> Result<Json<DeviceListView>, AppError> {
    let devices = state.gateway.list_devices(&auth.access_token).await?;

    let search_query = query.q.unwrap_or_default().trim().to_string();
    let devices = filter_records(devices, &search_query, DEVICE_SEARCH_FIELDS);
    let page = paginate(devices, parse_page(query.page.as_deref()), ITEMS_PER_PAGE);

    Ok(Json(DeviceListView {
        devices: page,
        search_query,
    }))
}

/// GET /devices/:device_id/:hostname
/// Interfaces and VLANs of one device, fetched concurrently
#[instrument(name = "device_detail", skip(state, auth))]
pub async fn device_detail(
    State(state): State<AppState>,
    auth: Authenticated,
    Path((device_id, hostname)): Path<(String, String)>,
) -> Result<Json<DeviceDetailView>, AppError> {
    let (interfaces, vlans) = tokio::join!(
        state.gateway.device_interfaces(&auth.access_token, &device_id),
        state.gateway.device_vlans(&auth.access_token, &device_id),
    );

    let interfaces = interfaces?;
    let vlan_list = match vlans {
        Ok(vlans) => Some(vlans),
        Err(e) => {
            warn!(error = %e, "VLAN fetch failed, showing interfaces only");
            None
        }
    };

    Ok(Json(DeviceDetailView {
        device_id,
        hostname,
        device_interfaces: interfaces.interfaces,
        vlan_list,
    }))
}

/// POST /devices/provision
/// Queues a provisioning job; never retried automatically
#[instrument(name = "provision_device", skip_all)]
pub async fn provision_device(
    State(state): State<AppState>,
    auth: Authenticated,
    Form(form): Form<ProvisionForm>,
) -> Result<Json<JobAcknowledgement>, AppError> {
    let hostname = form.hostname.trim();
    if hostname.is_empty() {
        return Err(AppError::BadRequest("hostname is required".to_string()));
    }

    let job = state
        .gateway
        .provision_device(
            &auth.access_token,
            hostname,
            &form.username,
            &form.password,
            &auth.session_id,
        )
        .await?;

    let job_id = job.job_id_text();
    info!(job_id = %job_id, hostname = %hostname, "Provisioning job queued");

    Ok(Json(JobAcknowledgement {
        message: format!(
            "Device {hostname} registration request has been sent successfully! JOB-ID: {job_id}"
        ),
        job_id,
    }))
}

/// GET /jobs?q=&sort=&order=&page=
#[instrument(name = "job_list", skip(state, auth))]
pub async fn job_list(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<JobListQuery>,
) -> Result<Json<JobListView>, AppError> {
    let jobs = state.gateway.list_jobs(&auth.access_token).await?;

    let search_query = query.q.unwrap_or_default().trim().to_lowercase();
    let current_sort = query
        .sort
        .filter(|sort| !sort.is_empty())
        .unwrap_or_else(|| DEFAULT_JOB_SORT.to_string());
    let order = SortOrder::parse(query.order.as_deref());

    let mut jobs = filter_records(jobs, &search_query, JOB_SEARCH_FIELDS);
    sort_records(&mut jobs, &current_sort, order);
    let page = paginate(jobs, parse_page(query.page.as_deref()), ITEMS_PER_PAGE);

    Ok(Json(JobListView {
        jobs: page,
        search_query,
        current_sort,
        current_order: order.as_str().to_string(),
    }))
}

/// POST /vlans/assign
/// Puts an interface into an access VLAN; never retried automatically
#[instrument(name = "assign_vlan", skip(state, auth))]
pub async fn assign_vlan(
    State(state): State<AppState>,
    auth: Authenticated,
    Form(form): Form<AssignVlanForm>,
) -> Result<Json<JobAcknowledgement>, AppError> {
    for (name, value) in [
        ("device_id", &form.device_id),
        ("interface_name", &form.interface_name),
        ("vlan_id", &form.vlan_id),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{name} is required")));
        }
    }

    let job = state
        .gateway
        .assign_vlan(
            &auth.access_token,
            &form.device_id,
            &form.interface_name,
            &form.vlan_id,
        )
        .await?;

    let job_id = job.job_id_text();
    info!(job_id = %job_id, "VLAN assignment job queued");

    Ok(Json(JobAcknowledgement {
        message: format!(
            "Job ID: {job_id} assigned to {} on {}",
            form.interface_name, form.hostname
        ),
        job_id,
    }))
}

/// GET /vlans/catalog
#[instrument(name = "vlan_catalog", skip_all)]
pub async fn vlan_catalog(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<VlanCatalogView>, AppError> {
    let catalog = state.gateway.vlan_catalog(&auth.access_token).await?;
    Ok(Json(VlanCatalogView { catalog }))
}

/// GET /api/info
/// Backend version banner; works without a session
#[instrument(name = "api_info", skip_all)]
pub async fn api_info(State(state): State<AppState>) -> Json<ApiInfo> {
    Json(state.gateway.api_info().await)
}
