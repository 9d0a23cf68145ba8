use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::models::SessionData;
use super::refresher::TokenRefresher;
use super::token::{classify, Freshness};

/// What the guard did with a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// One or both tokens missing; nothing to do
    Anonymous,
    Fresh,
    /// Expiry could not be read; the token is left for the backend to judge
    Unreadable,
    Refreshed,
    /// Token was stale but no replacement was obtained; the stale token stays
    RefreshFailed,
}

/// Per-request gate that renews a soon-to-expire access token before any backend call.
///
/// Best effort only: it never fails and never blocks the request on a refresh
/// problem. Downstream calls are expected to handle an expired token on their own.
///
/// Two concurrent requests on one session may both refresh; whichever write lands
/// last wins and both tokens are valid.
pub struct SessionTokenGuard {
    refresher: Arc<dyn TokenRefresher>,
    threshold: Duration,
}

impl SessionTokenGuard {
    pub fn new(refresher: Arc<dyn TokenRefresher>, threshold: Duration) -> Self {
        Self {
            refresher,
            threshold,
        }
    }

    pub async fn process(&self, session: &mut SessionData) -> GuardOutcome {
        self.process_at(session, Utc::now()).await
    }

    #[instrument(skip(self, session))]
    pub async fn process_at(&self, session: &mut SessionData, now: DateTime<Utc>) -> GuardOutcome {
        if !session.has_token_pair() {
            debug!("Session has no token pair, skipping refresh check");
            return GuardOutcome::Anonymous;
        }

        match classify(session.access_token().unwrap_or_default(), now, self.threshold) {
            Ok(Freshness::Fresh) => GuardOutcome::Fresh,
            Err(e) => {
                warn!(error = %e, "Could not read access token expiry, leaving it in place");
                GuardOutcome::Unreadable
            }
            Ok(Freshness::Stale) => {
                debug!("Access token is close to expiry, refreshing");
                let refresh_token = session.refresh_token().unwrap_or_default().to_string();
                match self.refresher.refresh(&refresh_token).await {
                    Ok(new_token) => {
                        session.replace_access_token(new_token);
                        info!("Access token refreshed");
                        GuardOutcome::Refreshed
                    }
                    Err(e) => {
                        warn!(error = %e, "Token refresh failed, continuing with stale token");
                        GuardOutcome::RefreshFailed
                    }
                }
            }
        }
    }
}
