use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::SessionModel;
use crate::shared::AppError;

/// Trait for session persistence
#[async_trait]
pub trait SessionRepository {
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError>;
    /// Returns the session if it exists and has not expired
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionModel>, AppError>;
    /// Overwrites only the access token of an existing session
    async fn update_access_token(&self, session_id: &str, access_token: &str)
        -> Result<(), AppError>;
    async fn delete_session(&self, session_id: &str) -> Result<(), AppError>;
    async fn cleanup_expired_sessions(&self) -> Result<u64, AppError>;
}

/// In-memory session store. Data is lost when the process restarts.
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, SessionModel>>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated sessions
    pub fn with_sessions(sessions: Vec<SessionModel>) -> Self {
        let session_map = sessions
            .into_iter()
            .map(|session| (session.id.clone(), session))
            .collect();

        Self {
            sessions: Mutex::new(session_map),
        }
    }

    pub fn session_count(&self) -> usize {
        self.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SessionModel>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::SessionStore("Session store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError> {
        debug!("Creating session in memory");

        let mut sessions = self.lock()?;
        if sessions.contains_key(&session.id) {
            warn!("Session already exists in memory");
            return Err(AppError::SessionStore("Session already exists".to_string()));
        }
        sessions.insert(session.id.clone(), session.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionModel>, AppError> {
        let mut sessions = self.lock()?;

        match sessions.get_mut(session_id) {
            Some(session) if session.is_expired() => {
                debug!("Session found in memory but has expired");
                Ok(None)
            }
            Some(session) => {
                session.touch();
                Ok(Some(session.clone()))
            }
            None => {
                debug!("Session not found in memory");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, access_token))]
    async fn update_access_token(
        &self,
        session_id: &str,
        access_token: &str,
    ) -> Result<(), AppError> {
        let mut sessions = self.lock()?;
        let session = sessions.get_mut(session_id).ok_or_else(|| {
            warn!("Session not found for access token update");
            AppError::SessionStore("Session not found".to_string())
        })?;
        session.data.replace_access_token(access_token.to_string());

        debug!("Access token updated in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        let mut sessions = self.lock()?;
        if sessions.remove(session_id).is_none() {
            // Logging out twice is harmless
            debug!("Session already gone");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let mut sessions = self.lock()?;
        let now = Utc::now();
        let initial_count = sessions.len();

        sessions.retain(|_, session| session.expires_at > now);

        let removed_count = initial_count - sessions.len();
        debug!(
            expired_sessions_removed = removed_count,
            "Expired sessions cleaned up from memory"
        );
        Ok(removed_count as u64)
    }
}
