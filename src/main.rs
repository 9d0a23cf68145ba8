use inventory_portal::{app, AppState, PortalConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match PortalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    info!(api_url = %config.api_url, "Starting inventory portal");

    let bind_address = config.bind_address.clone();
    let app_state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialise application state");
            std::process::exit(1);
        }
    };

    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();
    info!("Server running on http://{}", bind_address);
    axum::serve(listener, app(app_state)).await.unwrap();
}
