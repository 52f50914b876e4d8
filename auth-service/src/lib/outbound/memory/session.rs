use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Session;
use crate::domain::auth::models::SessionToken;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::SessionRegistry;

/// Attempts at drawing a token not already in the registry
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// In-memory implementation of SessionRegistry.
///
/// Expired sessions are hidden on lookup and dropped by `purge_expired`.
pub struct InMemorySessionRegistry {
    sessions: RwLock<HashMap<SessionToken, Session>>,
    authenticator: Arc<Authenticator>,
}

impl InMemorySessionRegistry {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            authenticator,
        }
    }

    /// Number of stored sessions, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn create(&self, user_id: &UserId, ttl: Duration) -> Result<SessionToken, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Unknown("Session expiry out of range".to_string()))?;

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = SessionToken::new(self.authenticator.issue_token()?);

            let mut sessions = self.sessions.write().await;
            if sessions.contains_key(&token) {
                tracing::warn!("Session token collision, regenerating");
                continue;
            }

            sessions.insert(
                token.clone(),
                Session {
                    token: token.clone(),
                    user_id: user_id.clone(),
                    created_at: now,
                    expires_at,
                },
            );
            return Ok(token);
        }

        Err(AuthError::Unknown(
            "Failed to generate a unique session token".to_string(),
        ))
    }

    async fn lookup(&self, token: &SessionToken) -> Result<Option<UserId>, AuthError> {
        let sessions = self.sessions.read().await;

        Ok(sessions
            .get(token)
            .filter(|session| !session.is_expired(Utc::now()))
            .map(|session| session.user_id.clone()))
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));

        Ok((before - sessions.len()) as u64)
    }
}
