use crate::core::data::Session;
use crate::core::operations::{Repository, Storage};
use crate::manager::Actor;
use crate::utils::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionService {
    sessions: Repository<Session>,
    ttl_hours: i64,
}

impl SessionService {
    pub fn new(storage: &Storage, ttl_hours: i64) -> Self {
        Self {
            sessions: storage.repo(),
            ttl_hours,
        }
    }

    /// Issue a session for an operator; the token is the cookie value
    pub async fn create(&self, email: &str, role: &str) -> AppResult<Session> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::Validation(format!("'{}' is not an email address", email)));
        }
        let role = role.trim();
        if role.is_empty() {
            return Err(AppError::Validation("Role is required".to_string()));
        }

        let now = Utc::now();
        let expires_at = Duration::try_hours(self.ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::Validation(format!("Session TTL of {} hours is out of range", self.ttl_hours)))?;
        let session = Session {
            token: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
            user_id: Uuid::new_v4().to_string(),
            email,
            role: role.to_string(),
            created_at: now,
            expires_at,
        };

        let session = self.sessions.insert(session).await?;
        tracing::info!(email = %session.email, role = %session.role, "session created");
        Ok(session)
    }

    /// Live session for a token; expired ones are removed on sight
    pub async fn resolve(&self, token: &str) -> AppResult<Option<Session>> {
        let Some(session) = self.sessions.find_by_id(token).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            if let Err(e) = self.sessions.delete(token).await {
                tracing::debug!(error = %e, "expired session already gone");
            }
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub async fn revoke(&self, token: &str) -> AppResult<bool> {
        match self.sessions.delete(token).await {
            Ok(session) => {
                tracing::info!(email = %session.email, "session revoked");
                Ok(true)
            }
            Err(AppError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn purge_expired(&self) -> AppResult<usize> {
        let now = Utc::now();
        let mut purged = 0;
        for session in self.sessions.list().await? {
            if session.is_expired(now) && self.revoke(&session.token).await? {
                purged += 1;
            }
        }
        Ok(purged)
    }
}

impl From<Session> for Actor {
    fn from(session: Session) -> Self {
        Actor {
            user_id: session.user_id,
            email: session.email,
            role: session.role,
        }
    }
}
