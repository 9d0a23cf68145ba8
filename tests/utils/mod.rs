pub mod backend;
pub mod setup;
pub mod tokens;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use backend::{FakeBackend, RecordedRequest};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
#[allow(unused_imports)]
pub use tokens::access_token_expiring_in;
