use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Account;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::Password;
use crate::domain::auth::models::SessionToken;
use crate::domain::auth::models::SweepReport;
use crate::domain::auth::models::UserId;

/// Port for authentication domain service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Attempt to log in with a user ID and password.
    ///
    /// # Arguments
    /// * `command` - Validated command containing user ID and password
    ///
    /// # Returns
    /// Success with a new session token, or a failure carrying the attempt counter
    ///
    /// # Errors
    /// * `Unavailable` - A store could not be reached
    /// * `Unknown` - Password verification or token generation failed
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AuthError>;

    /// Check whether a session token belongs to a live session.
    ///
    /// # Arguments
    /// * `token` - Session token delivered by the transport, if any
    ///
    /// # Returns
    /// True when the token resolves to an unexpired session
    ///
    /// # Errors
    /// * `Unavailable` - Session registry could not be reached
    async fn verify(&self, token: Option<&SessionToken>) -> Result<bool, AuthError>;

    /// End the session identified by a token.
    ///
    /// Idempotent: absent, unknown, and already revoked tokens all succeed.
    ///
    /// # Errors
    /// * `Unavailable` - Session registry could not be reached
    async fn logout(&self, token: Option<&SessionToken>) -> Result<(), AuthError>;

    /// Release expired sessions and idle in-memory bookkeeping.
    ///
    /// # Returns
    /// Counts of released state
    ///
    /// # Errors
    /// * `Unavailable` - Session registry could not be reached
    async fn sweep(&self) -> Result<SweepReport, AuthError>;
}

/// Persistence of account credentials and failure counters.
///
/// Every mutation is atomic per user ID.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Compare a submitted password with the stored hash in constant time.
    ///
    /// For unknown accounts an equivalent hashing workload is still performed.
    ///
    /// # Arguments
    /// * `user_id` - Account to check
    /// * `password` - Submitted plaintext password
    ///
    /// # Returns
    /// True if the password matches
    ///
    /// # Errors
    /// * `NotFound` - No account for this user ID
    /// * `Unavailable` - Store could not be reached
    /// * `Unknown` - Stored hash is malformed
    async fn verify_password(&self, user_id: &UserId, password: &Password)
        -> Result<bool, AuthError>;

    /// Atomically increment the failure counter and stamp the failure time.
    ///
    /// # Returns
    /// Counter value after the increment
    ///
    /// # Errors
    /// * `NotFound` - No account for this user ID
    /// * `Unavailable` - Store could not be reached
    async fn record_failure(&self, user_id: &UserId) -> Result<u32, AuthError>;

    /// Atomically reset the failure counter to zero.
    ///
    /// # Errors
    /// * `NotFound` - No account for this user ID
    /// * `Unavailable` - Store could not be reached
    async fn record_success(&self, user_id: &UserId) -> Result<(), AuthError>;

    /// Read the current failure counter.
    ///
    /// # Errors
    /// * `NotFound` - No account for this user ID
    /// * `Unavailable` - Store could not be reached
    async fn get_failed_attempts(&self, user_id: &UserId) -> Result<u32, AuthError>;

    /// Read the time of the most recent failure.
    ///
    /// # Returns
    /// None when no failure was recorded since the last reset
    ///
    /// # Errors
    /// * `NotFound` - No account for this user ID
    /// * `Unavailable` - Store could not be reached
    async fn last_failed_at(&self, user_id: &UserId)
        -> Result<Option<DateTime<Utc>>, AuthError>;

    /// Insert an account unless one already exists for its user ID.
    ///
    /// Existing accounts keep their hash and counter.
    ///
    /// # Returns
    /// True if the account was inserted
    ///
    /// # Errors
    /// * `Unavailable` - Store could not be reached
    async fn provision(&self, account: Account) -> Result<bool, AuthError>;
}

/// Storage of live sessions keyed by token.
#[async_trait]
pub trait SessionRegistry: Send + Sync + 'static {
    /// Create a session for a user with a fresh random token.
    ///
    /// # Arguments
    /// * `user_id` - Owning account
    /// * `ttl` - Session lifetime
    ///
    /// # Returns
    /// Token unique among all stored sessions
    ///
    /// # Errors
    /// * `Unavailable` - Registry could not be reached
    /// * `Unknown` - Token generation failed
    async fn create(&self, user_id: &UserId, ttl: Duration) -> Result<SessionToken, AuthError>;

    /// Resolve a token to its owner.
    ///
    /// # Returns
    /// Owning user ID, or None if the token is unknown or expired
    ///
    /// # Errors
    /// * `Unavailable` - Registry could not be reached
    async fn lookup(&self, token: &SessionToken) -> Result<Option<UserId>, AuthError>;

    /// Remove a session. Removing an absent token is not an error.
    ///
    /// # Errors
    /// * `Unavailable` - Registry could not be reached
    async fn revoke(&self, token: &SessionToken) -> Result<(), AuthError>;

    /// Delete every expired session.
    ///
    /// # Returns
    /// Number of sessions removed
    ///
    /// # Errors
    /// * `Unavailable` - Registry could not be reached
    async fn purge_expired(&self) -> Result<u64, AuthError>;
}
