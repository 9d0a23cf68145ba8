// Library crate for the inventory portal
// This file exposes the public API for integration tests

pub mod config;
pub mod gateway;
pub mod inventory;
pub mod routes;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::PortalConfig;
pub use gateway::{BackendGateway, GatewayError, GatewayResult};
pub use routes::app;
pub use session::{SessionTokenGuard, TokenRefresher};
pub use shared::{AppError, AppState};
