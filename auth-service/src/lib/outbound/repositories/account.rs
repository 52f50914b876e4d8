use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Account;
use crate::domain::auth::models::Password;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CredentialStore;

/// PostgreSQL implementation of CredentialStore.
///
/// Counter updates are single-statement `UPDATE ... RETURNING`, so concurrent
/// attempts on the same row are serialized by the database.
pub struct PostgresCredentialStore {
    pool: PgPool,
    authenticator: Arc<Authenticator>,
}

impl PostgresCredentialStore {
    /// Create a new PostgreSQL credential store.
    ///
    /// # Arguments
    /// * `pool` - PostgreSQL connection pool
    /// * `authenticator` - Password verification backend
    ///
    /// # Returns
    /// Configured store instance
    pub fn new(pool: PgPool, authenticator: Arc<Authenticator>) -> Self {
        Self {
            pool,
            authenticator,
        }
    }
}

fn counter_value(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn verify_password(
        &self,
        user_id: &UserId,
        password: &Password,
    ) -> Result<bool, AuthError> {
        let stored_hash: Option<String> = sqlx::query_scalar(
            r#"
            SELECT password_hash
            FROM accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let matches = self
            .authenticator
            .verify_password(password.as_str(), stored_hash.as_deref())?;

        match stored_hash {
            Some(_) => Ok(matches),
            None => Err(AuthError::NotFound(user_id.to_string())),
        }
    }

    async fn record_failure(&self, user_id: &UserId) -> Result<u32, AuthError> {
        let count: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET failed_attempts = failed_attempts + 1, last_failed_at = $2
            WHERE user_id = $1
            RETURNING failed_attempts
            "#,
        )
        .bind(user_id.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        count
            .map(counter_value)
            .ok_or_else(|| AuthError::NotFound(user_id.to_string()))
    }

    async fn record_success(&self, user_id: &UserId) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET failed_attempts = 0, last_failed_at = NULL
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound(user_id.to_string()));
        }

        Ok(())
    }

    async fn get_failed_attempts(&self, user_id: &UserId) -> Result<u32, AuthError> {
        let count: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT failed_attempts
            FROM accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        count
            .map(counter_value)
            .ok_or_else(|| AuthError::NotFound(user_id.to_string()))
    }

    async fn last_failed_at(
        &self,
        user_id: &UserId,
    ) -> Result<Option<DateTime<Utc>>, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT last_failed_at
            FROM accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match row {
            Some(r) => Ok(r.get("last_failed_at")),
            None => Err(AuthError::NotFound(user_id.to_string())),
        }
    }

    async fn provision(&self, account: Account) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (user_id, password_hash, failed_attempts, last_failed_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(account.user_id.as_str())
        .bind(&account.password_hash)
        .bind(i32::try_from(account.failed_attempts).unwrap_or(i32::MAX))
        .bind(account.last_failed_at)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
