use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Account;
use crate::domain::auth::models::Password;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CredentialStore;

/// In-memory implementation of CredentialStore.
///
/// The outer map is only write-locked when provisioning; counter updates
/// lock the single account they touch.
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<UserId, Arc<Mutex<Account>>>>,
    authenticator: Arc<Authenticator>,
}

impl InMemoryCredentialStore {
    /// Create an empty in-memory credential store.
    ///
    /// # Arguments
    /// * `authenticator` - Password verification backend
    ///
    /// # Returns
    /// Store without accounts
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            authenticator,
        }
    }

    async fn account(&self, user_id: &UserId) -> Result<Arc<Mutex<Account>>, AuthError> {
        self.accounts
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| AuthError::NotFound(user_id.to_string()))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn verify_password(
        &self,
        user_id: &UserId,
        password: &Password,
    ) -> Result<bool, AuthError> {
        let stored_hash = match self.account(user_id).await {
            Ok(account) => {
                let account = account.lock().await;
                Some(account.password_hash.clone())
            }
            Err(AuthError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let matches = self
            .authenticator
            .verify_password(password.as_str(), stored_hash.as_deref())?;

        match stored_hash {
            Some(_) => Ok(matches),
            None => Err(AuthError::NotFound(user_id.to_string())),
        }
    }

    async fn record_failure(&self, user_id: &UserId) -> Result<u32, AuthError> {
        let account = self.account(user_id).await?;
        let mut account = account.lock().await;

        account.failed_attempts = account.failed_attempts.saturating_add(1);
        account.last_failed_at = Some(Utc::now());

        Ok(account.failed_attempts)
    }

    async fn record_success(&self, user_id: &UserId) -> Result<(), AuthError> {
        let account = self.account(user_id).await?;
        let mut account = account.lock().await;

        account.failed_attempts = 0;
        account.last_failed_at = None;

        Ok(())
    }

    async fn get_failed_attempts(&self, user_id: &UserId) -> Result<u32, AuthError> {
        let account = self.account(user_id).await?;
        let failed_attempts = account.lock().await.failed_attempts;
        Ok(failed_attempts)
    }

    async fn last_failed_at(
        &self,
        user_id: &UserId,
    ) -> Result<Option<DateTime<Utc>>, AuthError> {
        let account = self.account(user_id).await?;
        let last_failed_at = account.lock().await.last_failed_at;
        Ok(last_failed_at)
    }

    async fn provision(&self, account: Account) -> Result<bool, AuthError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.user_id) {
            return Ok(false);
        }

        accounts.insert(account.user_id.clone(), Arc::new(Mutex::new(account)));
        Ok(true)
    }
}
