use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::SessionToken;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::SessionRegistry;

const MAX_TOKEN_ATTEMPTS: usize = 3;

/// PostgreSQL implementation of SessionRegistry.
///
/// Expired rows are filtered on lookup and deleted by `purge_expired`.
pub struct PostgresSessionRegistry {
    pool: PgPool,
    authenticator: Arc<Authenticator>,
}

impl PostgresSessionRegistry {
    /// Create a new PostgreSQL session registry.
    ///
    /// # Arguments
    /// * `pool` - PostgreSQL connection pool
    /// * `authenticator` - Session token source
    ///
    /// # Returns
    /// Configured registry instance
    pub fn new(pool: PgPool, authenticator: Arc<Authenticator>) -> Self {
        Self {
            pool,
            authenticator,
        }
    }
}

#[async_trait]
impl SessionRegistry for PostgresSessionRegistry {
    async fn create(&self, user_id: &UserId, ttl: Duration) -> Result<SessionToken, AuthError> {
        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Unknown("Session expiry out of range".to_string()))?;

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = SessionToken::new(self.authenticator.issue_token()?);

            let result = sqlx::query(
                r#"
                INSERT INTO sessions (token, user_id, created_at, expires_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(token.as_str())
            .bind(user_id.as_str())
            .bind(created_at)
            .bind(expires_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => return Ok(token),
                Err(e)
                    if e.as_database_error()
                        .is_some_and(|db_err| db_err.is_unique_violation()) =>
                {
                    tracing::warn!("Session token collision, regenerating");
                }
                Err(e) => return Err(AuthError::Unavailable(e.to_string())),
            }
        }

        Err(AuthError::Unknown(
            "Failed to generate a unique session token".to_string(),
        ))
    }

    async fn lookup(&self, token: &SessionToken) -> Result<Option<UserId>, AuthError> {
        let user_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM sessions
            WHERE token = $1 AND expires_at > $2
            "#,
        )
        .bind(token.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match user_id {
            Some(user_id) => Ok(Some(UserId::new(user_id)?)),
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at <= $1
            "#,
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
