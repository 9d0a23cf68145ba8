// Public API - what other modules can use
pub use guard::{GuardOutcome, SessionTokenGuard};
pub use handlers::{check_session, landing, login, logout, DASHBOARD_ROUTE};
pub use middleware::{session_guard, Authenticated, CurrentSession};
pub use models::{SessionData, SessionModel};
pub use refresher::{HttpTokenRefresher, RefreshError, TokenRefresher};
pub use repository::{InMemorySessionRepository, SessionRepository};
pub use token::{classify, read_claims, Freshness, TokenClaims, TokenError};

// Internal modules
pub mod cookie;
pub(crate) mod guard;
mod handlers;
mod middleware;
pub mod models;
mod refresher;
pub mod repository;
pub(crate) mod token;
mod types;

pub use types::{LandingView, LoginForm};
