use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Duration;
use chrono::Utc;

use crate::domain::auth::attempts::UnknownAccountAttempts;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::lockout::LockoutPolicy;
use crate::domain::auth::locks::KeyedLocks;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::Password;
use crate::domain::auth::models::SessionToken;
use crate::domain::auth::models::SweepReport;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialStore;
use crate::domain::auth::ports::SessionRegistry;

/// Where the failure counter for a login attempt lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    Account,
    Unknown,
}

/// Domain service implementation for login, verify and logout.
///
/// Concrete implementation of AuthServicePort with dependency injection.
/// Login attempts for the same user ID are serialized; different IDs proceed
/// in parallel.
pub struct AuthService<CS, SR>
where
    CS: CredentialStore,
    SR: SessionRegistry,
{
    credentials: Arc<CS>,
    sessions: Arc<SR>,
    policy: LockoutPolicy,
    session_ttl: Duration,
    account_locks: KeyedLocks<UserId>,
    unknown_attempts: UnknownAccountAttempts,
}

impl<CS, SR> AuthService<CS, SR>
where
    CS: CredentialStore,
    SR: SessionRegistry,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `credentials` - Credential store implementation
    /// * `sessions` - Session registry implementation
    /// * `policy` - Lockout policy
    /// * `session_ttl` - Lifetime of sessions created by login
    ///
    /// # Returns
    /// Configured auth service instance
    pub fn new(
        credentials: Arc<CS>,
        sessions: Arc<SR>,
        policy: LockoutPolicy,
        session_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            sessions,
            policy,
            session_ttl,
            account_locks: KeyedLocks::new(),
            unknown_attempts: UnknownAccountAttempts::new(),
        }
    }

    /// Replace the default bounds on counters kept for unknown user IDs.
    pub fn with_unknown_account_attempts(mut self, attempts: UnknownAccountAttempts) -> Self {
        self.unknown_attempts = attempts;
        self
    }

    async fn current_attempts(&self, user_id: &UserId) -> Result<(Subject, u32), AuthError> {
        match self.credentials.get_failed_attempts(user_id).await {
            Ok(count) => Ok((Subject::Account, count)),
            Err(AuthError::NotFound(_)) => Ok((
                Subject::Unknown,
                self.unknown_attempts.failed_attempts(user_id),
            )),
            Err(e) => Err(e),
        }
    }

    /// Returns true when the lockout window has passed and the counter was reset.
    async fn release_elapsed_lockout(
        &self,
        subject: Subject,
        user_id: &UserId,
    ) -> Result<bool, AuthError> {
        let last_failed_at = match subject {
            Subject::Account => self.credentials.last_failed_at(user_id).await?,
            Subject::Unknown => self.unknown_attempts.last_failed_at(user_id),
        };

        if !self.policy.lockout_elapsed(last_failed_at, Utc::now()) {
            return Ok(false);
        }

        match subject {
            Subject::Account => self.credentials.record_success(user_id).await?,
            Subject::Unknown => self.unknown_attempts.reset(user_id),
        }

        tracing::info!(user_id = %user_id, "Lockout window elapsed, failure counter reset");
        Ok(true)
    }

    async fn attempt(
        &self,
        user_id: &UserId,
        password: &Password,
    ) -> Result<LoginOutcome, AuthError> {
        match self.credentials.verify_password(user_id, password).await {
            Ok(true) => {
                self.credentials.record_success(user_id).await?;
                let token = self.sessions.create(user_id, self.session_ttl).await?;
                Ok(LoginOutcome::Success(token))
            }
            Ok(false) => {
                let count = self.credentials.record_failure(user_id).await?;
                Ok(LoginOutcome::Failed(count))
            }
            Err(AuthError::NotFound(_)) => {
                let count = self.unknown_attempts.record_failure(user_id, Utc::now());
                Ok(LoginOutcome::Failed(count))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<CS, SR> AuthServicePort for AuthService<CS, SR>
where
    CS: CredentialStore,
    SR: SessionRegistry,
{
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AuthError> {
        let started = Instant::now();
        let LoginCommand { user_id, password } = command;

        let _guard = self.account_locks.lock(&user_id).await;

        let (subject, count) = self.current_attempts(&user_id).await?;

        let outcome = if self.policy.decide(count).allow_attempt
            || self.release_elapsed_lockout(subject, &user_id).await?
        {
            self.attempt(&user_id, &password).await?
        } else {
            LoginOutcome::LockedOut(count)
        };

        tracing::info!(
            procedure = "login",
            user_id = %user_id,
            outcome = outcome.label(),
            failed_attempts = outcome.failed_attempts(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Login processed"
        );

        Ok(outcome)
    }

    async fn verify(&self, token: Option<&SessionToken>) -> Result<bool, AuthError> {
        let Some(token) = token else {
            return Ok(false);
        };

        let owner = self.sessions.lookup(token).await?;
        tracing::debug!(
            procedure = "verify",
            authenticated = owner.is_some(),
            "Session verified"
        );

        Ok(owner.is_some())
    }

    async fn logout(&self, token: Option<&SessionToken>) -> Result<(), AuthError> {
        if let Some(token) = token {
            self.sessions.revoke(token).await?;
        }

        tracing::info!(procedure = "logout", "Logout processed");
        Ok(())
    }

    async fn sweep(&self) -> Result<SweepReport, AuthError> {
        let expired_sessions = self.sessions.purge_expired().await?;
        let forgotten_attempts = self
            .unknown_attempts
            .forget_stale(&self.policy, Utc::now());
        let released_locks = self.account_locks.prune();

        Ok(SweepReport {
            expired_sessions,
            forgotten_attempts,
            released_locks,
        })
    }
}

#[cfg(test)]
mod tests {
    use auth::Authenticator;
    use chrono::DateTime;
    use mockall::mock;

    use super::*;
    use crate::domain::auth::models::Account;
    use crate::outbound::memory::InMemoryCredentialStore;
    use crate::outbound::memory::InMemorySessionRegistry;

    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn verify_password(&self, user_id: &UserId, password: &Password) -> Result<bool, AuthError>;
            async fn record_failure(&self, user_id: &UserId) -> Result<u32, AuthError>;
            async fn record_success(&self, user_id: &UserId) -> Result<(), AuthError>;
            async fn get_failed_attempts(&self, user_id: &UserId) -> Result<u32, AuthError>;
            async fn last_failed_at(&self, user_id: &UserId) -> Result<Option<DateTime<Utc>>, AuthError>;
            async fn provision(&self, account: Account) -> Result<bool, AuthError>;
        }
    }

    mock! {
        pub TestSessionRegistry {}

        #[async_trait]
        impl SessionRegistry for TestSessionRegistry {
            async fn create(&self, user_id: &UserId, ttl: Duration) -> Result<SessionToken, AuthError>;
            async fn lookup(&self, token: &SessionToken) -> Result<Option<UserId>, AuthError>;
            async fn revoke(&self, token: &SessionToken) -> Result<(), AuthError>;
            async fn purge_expired(&self) -> Result<u64, AuthError>;
        }
    }

    type MemoryAuthService = AuthService<InMemoryCredentialStore, InMemorySessionRegistry>;

    const PASSWORD: &str = "correct horse battery staple";

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn login_command(user_id: &str, password: &str) -> LoginCommand {
        LoginCommand::new(user_id.to_string(), password.to_string()).unwrap()
    }

    async fn memory_service(
        policy: LockoutPolicy,
    ) -> (Arc<MemoryAuthService>, Arc<InMemoryCredentialStore>) {
        let authenticator = Arc::new(Authenticator::new());
        let credentials = Arc::new(InMemoryCredentialStore::new(Arc::clone(&authenticator)));
        let sessions = Arc::new(InMemorySessionRegistry::new(Arc::clone(&authenticator)));

        let hash = authenticator.hash_password(PASSWORD).unwrap();
        credentials
            .provision(Account::new(user("alice"), hash))
            .await
            .unwrap();

        let service = Arc::new(AuthService::new(
            Arc::clone(&credentials),
            sessions,
            policy,
            Duration::hours(24),
        ));
        (service, credentials)
    }

    #[tokio::test]
    async fn test_login_success_creates_live_session() {
        let (service, credentials) = memory_service(LockoutPolicy::default()).await;

        let outcome = service.login(login_command("alice", PASSWORD)).await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.failed_attempts(), None);
        assert!(service.verify(outcome.session_token()).await.unwrap());
        assert_eq!(credentials.get_failed_attempts(&user("alice")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_success_resets_counter() {
        let (service, credentials) = memory_service(LockoutPolicy::default()).await;

        for _ in 0..3 {
            service.login(login_command("alice", "wrong")).await.unwrap();
        }
        assert_eq!(credentials.get_failed_attempts(&user("alice")).await.unwrap(), 3);

        let outcome = service.login(login_command("alice", PASSWORD)).await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.failed_attempts(), None);
        assert_eq!(credentials.get_failed_attempts(&user("alice")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_counts_up_then_locks_out() {
        let (service, credentials) = memory_service(LockoutPolicy::new(5, None)).await;

        for expected in 1..=4 {
            let outcome = service.login(login_command("alice", "wrong")).await.unwrap();
            assert_eq!(outcome, LoginOutcome::Failed(expected));
        }

        // Counter is 4, below the threshold: the attempt is still evaluated
        let outcome = service.login(login_command("alice", "wrong")).await.unwrap();
        assert_eq!(outcome, LoginOutcome::Failed(5));

        // Lockout overrides a correct password and leaves the counter alone
        let outcome = service.login(login_command("alice", PASSWORD)).await.unwrap();
        assert_eq!(outcome, LoginOutcome::LockedOut(5));
        assert!(outcome.session_token().is_none());
        assert_eq!(credentials.get_failed_attempts(&user("alice")).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_lockout_lifts_after_window() {
        let (service, credentials) =
            memory_service(LockoutPolicy::new(2, Some(Duration::zero()))).await;

        service.login(login_command("alice", "wrong")).await.unwrap();
        service.login(login_command("alice", "wrong")).await.unwrap();
        assert_eq!(credentials.get_failed_attempts(&user("alice")).await.unwrap(), 2);

        let outcome = service.login(login_command("alice", PASSWORD)).await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(credentials.get_failed_attempts(&user("alice")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_account_looks_like_wrong_password() {
        let (service, _) = memory_service(LockoutPolicy::new(3, None)).await;

        let first = service.login(login_command("mallory", PASSWORD)).await.unwrap();
        let second = service.login(login_command("mallory", PASSWORD)).await.unwrap();
        let third = service.login(login_command("mallory", PASSWORD)).await.unwrap();
        let fourth = service.login(login_command("mallory", PASSWORD)).await.unwrap();

        assert_eq!(first, LoginOutcome::Failed(1));
        assert_eq!(second, LoginOutcome::Failed(2));
        assert_eq!(third, LoginOutcome::Failed(3));
        assert_eq!(fourth, LoginOutcome::LockedOut(3));
    }

    #[tokio::test]
    async fn test_concurrent_failures_are_all_counted() {
        let (service, credentials) = memory_service(LockoutPolicy::new(1000, None)).await;

        let attempts = (0..10).map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.login(login_command("alice", "wrong")).await })
        });
        let results = futures::future::join_all(attempts).await;

        let mut counts: Vec<u32> = results
            .into_iter()
            .map(|r| r.unwrap().unwrap().failed_attempts().unwrap())
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, (1..=10).collect::<Vec<u32>>());
        assert_eq!(credentials.get_failed_attempts(&user("alice")).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_verify_without_token_is_unauthenticated() {
        let (service, _) = memory_service(LockoutPolicy::default()).await;

        assert!(!service.verify(None).await.unwrap());

        let never_issued = SessionToken::new("never-issued".to_string());
        assert!(!service.verify(Some(&never_issued)).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (service, _) = memory_service(LockoutPolicy::default()).await;
        let outcome = service.login(login_command("alice", PASSWORD)).await.unwrap();
        let token = outcome.session_token().cloned();

        service.logout(token.as_ref()).await.unwrap();
        assert!(!service.verify(token.as_ref()).await.unwrap());

        service.logout(token.as_ref()).await.unwrap();
        assert!(!service.verify(token.as_ref()).await.unwrap());

        service.logout(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_sessions_are_independent_per_login() {
        let (service, _) = memory_service(LockoutPolicy::default()).await;

        let laptop = service.login(login_command("alice", PASSWORD)).await.unwrap();
        let phone = service.login(login_command("alice", PASSWORD)).await.unwrap();
        assert_ne!(laptop.session_token(), phone.session_token());

        service.logout(laptop.session_token()).await.unwrap();

        assert!(!service.verify(laptop.session_token()).await.unwrap());
        assert!(service.verify(phone.session_token()).await.unwrap());
    }

    #[tokio::test]
    async fn test_locked_out_attempt_skips_password_check() {
        let mut credentials = MockTestCredentialStore::new();
        let sessions = MockTestSessionRegistry::new();

        credentials
            .expect_get_failed_attempts()
            .times(1)
            .returning(|_| Ok(5));
        credentials
            .expect_last_failed_at()
            .times(1)
            .returning(|_| Ok(Some(Utc::now())));
        credentials.expect_verify_password().times(0);
        credentials.expect_record_failure().times(0);

        let service = AuthService::new(
            Arc::new(credentials),
            Arc::new(sessions),
            LockoutPolicy::default(),
            Duration::hours(1),
        );

        let outcome = service.login(login_command("alice", PASSWORD)).await.unwrap();
        assert_eq!(outcome, LoginOutcome::LockedOut(5));
    }

    #[tokio::test]
    async fn test_counter_increment_failure_is_surfaced() {
        let mut credentials = MockTestCredentialStore::new();
        let sessions = MockTestSessionRegistry::new();

        credentials
            .expect_get_failed_attempts()
            .returning(|_| Ok(0));
        credentials
            .expect_verify_password()
            .returning(|_, _| Ok(false));
        credentials
            .expect_record_failure()
            .times(1)
            .returning(|_| Err(AuthError::Unavailable("connection reset".to_string())));

        let service = AuthService::new(
            Arc::new(credentials),
            Arc::new(sessions),
            LockoutPolicy::default(),
            Duration::hours(1),
        );

        let result = service.login(login_command("alice", "wrong")).await;
        assert!(matches!(result, Err(AuthError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_store_unavailable_before_check_is_surfaced() {
        let mut credentials = MockTestCredentialStore::new();
        let sessions = MockTestSessionRegistry::new();

        credentials
            .expect_get_failed_attempts()
            .returning(|_| Err(AuthError::Unavailable("timeout".to_string())));
        credentials.expect_verify_password().times(0);

        let service = AuthService::new(
            Arc::new(credentials),
            Arc::new(sessions),
            LockoutPolicy::default(),
            Duration::hours(1),
        );

        let result = service.login(login_command("alice", PASSWORD)).await;
        assert!(matches!(result, Err(AuthError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_verify_registry_unavailable_is_surfaced() {
        let credentials = MockTestCredentialStore::new();
        let mut sessions = MockTestSessionRegistry::new();

        sessions
            .expect_lookup()
            .returning(|_| Err(AuthError::Unavailable("refused".to_string())));

        let service = AuthService::new(
            Arc::new(credentials),
            Arc::new(sessions),
            LockoutPolicy::default(),
            Duration::hours(1),
        );

        let token = SessionToken::new("token".to_string());
        let result = service.verify(Some(&token)).await;
        assert!(matches!(result, Err(AuthError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_sweep_reports_released_state() {
        let credentials = MockTestCredentialStore::new();
        let mut sessions = MockTestSessionRegistry::new();

        sessions.expect_purge_expired().times(1).returning(|| Ok(3));

        let service = AuthService::new(
            Arc::new(credentials),
            Arc::new(sessions),
            LockoutPolicy::default(),
            Duration::hours(1),
        );

        let report = service.sweep().await.unwrap();
        assert_eq!(report.expired_sessions, 3);
        assert_eq!(report.forgotten_attempts, 0);
    }

    #[tokio::test]
    async fn test_sweep_forgets_unknown_ids_without_lockout_duration() {
        let authenticator = Arc::new(Authenticator::new());
        let service = AuthService::new(
            Arc::new(InMemoryCredentialStore::new(Arc::clone(&authenticator))),
            Arc::new(InMemorySessionRegistry::new(authenticator)),
            LockoutPolicy::new(5, None),
            Duration::hours(24),
        )
        .with_unknown_account_attempts(UnknownAccountAttempts::with_limits(Duration::zero(), 100));

        for i in 0..20 {
            let outcome = service
                .login(login_command(&format!("ghost-{}", i), "anything"))
                .await
                .unwrap();
            assert_eq!(outcome, LoginOutcome::Failed(1));
        }

        let report = service.sweep().await.unwrap();
        assert_eq!(report.forgotten_attempts, 20);
        assert!(service.unknown_attempts.is_empty());
    }

    #[tokio::test]
    async fn test_session_ttl_beyond_time_range_fails_login_without_panic() {
        let authenticator = Arc::new(Authenticator::new());
        let credentials = Arc::new(InMemoryCredentialStore::new(Arc::clone(&authenticator)));
        let hash = authenticator.hash_password(PASSWORD).unwrap();
        credentials
            .provision(Account::new(user("alice"), hash))
            .await
            .unwrap();

        let service = AuthService::new(
            credentials,
            Arc::new(InMemorySessionRegistry::new(authenticator)),
            LockoutPolicy::default(),
            Duration::days(200_000_000),
        );

        let result = service.login(login_command("alice", PASSWORD)).await;
        assert!(matches!(result, Err(AuthError::Unknown(_))));
    }
}
