// Public API - what other modules can use
pub use client::{classify_status, error_detail, BackendGateway};
pub use error::{GatewayError, GatewayResult};
pub use operations::Operation;
pub use types::{ApiInfo, ApiStatus, DeviceInterfaces, JobAccepted, Record, TokenPair};

// Internal modules
mod client;
mod error;
mod operations;
pub mod types;
