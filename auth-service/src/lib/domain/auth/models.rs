use std::fmt;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::InputError;

/// Account aggregate entity.
///
/// Provisioned out-of-band; only login outcomes mutate the failure counter.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: UserId,
    pub password_hash: String,
    pub failed_attempts: u32,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a freshly provisioned account with a clean failure counter.
    ///
    /// # Arguments
    /// * `user_id` - Unique account identifier
    /// * `password_hash` - Argon2 PHC string
    ///
    /// # Returns
    /// Account with zero failed attempts
    pub fn new(user_id: UserId, password_hash: String) -> Self {
        Self {
            user_id,
            password_hash,
            failed_attempts: 0,
            last_failed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Account identifier type
///
/// Non-empty and at most 128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    const MAX_LENGTH: usize = 128;

    /// Create a new validated user ID.
    ///
    /// # Arguments
    /// * `user_id` - Raw identifier string
    ///
    /// # Returns
    /// Validated UserId value object
    ///
    /// # Errors
    /// * `EmptyUserId` - Identifier is empty
    /// * `UserIdTooLong` - Identifier longer than 128 characters
    pub fn new(user_id: String) -> Result<Self, InputError> {
        let length = user_id.chars().count();
        if length == 0 {
            Err(InputError::EmptyUserId)
        } else if length > Self::MAX_LENGTH {
            Err(InputError::UserIdTooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(user_id))
        }
    }

    /// Get user ID as string slice.
    ///
    /// # Returns
    /// User ID string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password submitted with a login attempt.
///
/// Never printed; `Debug` output is redacted.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    /// Create a new non-empty password.
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is empty
    pub fn new(password: String) -> Result<Self, InputError> {
        if password.is_empty() {
            Err(InputError::EmptyPassword)
        } else {
            Ok(Self(password))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Opaque session token proving a prior successful login.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a freshly generated token.
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Interpret a token delivered by the transport.
    ///
    /// Blank values are treated as an absent token.
    ///
    /// # Arguments
    /// * `raw` - Token as received (cookie value, bearer credential)
    ///
    /// # Returns
    /// Some(token) when non-blank, None otherwise
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Extract the token from an `Authorization` value using the Bearer scheme.
    ///
    /// The scheme name is matched case-insensitively. Other schemes and
    /// blank credentials yield `None`.
    pub fn from_authorization(value: &str) -> Option<Self> {
        let (scheme, credentials) = value.trim_start().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        Self::parse(credentials)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Live session entry held by the session registry.
///
/// `user_id` refers to the owning account by key only.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Command to attempt a login with validated fields
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub user_id: UserId,
    pub password: Password,
}

impl LoginCommand {
    /// Construct a login command from raw transport fields.
    ///
    /// # Arguments
    /// * `user_id` - Raw user identifier
    /// * `password` - Raw plaintext password
    ///
    /// # Returns
    /// LoginCommand with validated fields
    ///
    /// # Errors
    /// * `EmptyUserId` / `UserIdTooLong` - Invalid identifier
    /// * `EmptyPassword` - Empty password
    pub fn new(user_id: String, password: String) -> Result<Self, InputError> {
        Ok(Self {
            user_id: UserId::new(user_id)?,
            password: Password::new(password)?,
        })
    }
}

/// Result of a single login attempt.
///
/// Collapsed at the transport boundary into a success flag and an optional
/// failed-attempt count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted and a session was created.
    Success(SessionToken),
    /// Credentials rejected; carries the counter after this failure.
    Failed(u32),
    /// Attempt refused without checking the password; carries the current counter.
    LockedOut(u32),
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success(_))
    }

    /// Failed-attempt count as reported to the caller.
    ///
    /// # Returns
    /// None on success (not applicable), Some(count) on any failure
    pub fn failed_attempts(&self) -> Option<u32> {
        match self {
            LoginOutcome::Success(_) => None,
            LoginOutcome::Failed(count) | LoginOutcome::LockedOut(count) => Some(*count),
        }
    }

    pub fn session_token(&self) -> Option<&SessionToken> {
        match self {
            LoginOutcome::Success(token) => Some(token),
            _ => None,
        }
    }

    /// Short label used in structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            LoginOutcome::Success(_) => "success",
            LoginOutcome::Failed(_) => "failed",
            LoginOutcome::LockedOut(_) => "locked_out",
        }
    }
}

/// Counts of state released by one maintenance sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_sessions: u64,
    pub forgotten_attempts: usize,
    pub released_locks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        assert!(UserId::new("alice".to_string()).is_ok());
        assert_eq!(UserId::new(String::new()), Err(InputError::EmptyUserId));
        assert_eq!(
            UserId::new("a".repeat(129)),
            Err(InputError::UserIdTooLong {
                max: 128,
                actual: 129
            })
        );
    }

    #[test]
    fn test_login_command_rejects_empty_password() {
        let result = LoginCommand::new("alice".to_string(), String::new());
        assert!(matches!(result, Err(InputError::EmptyPassword)));
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("hunter2".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("hunter2"));

        let token = SessionToken::new("secret-token".to_string());
        assert!(!format!("{:?}", token).contains("secret-token"));
    }

    #[test]
    fn test_session_token_parse_blank_is_absent() {
        assert!(SessionToken::parse("").is_none());
        assert!(SessionToken::parse("   ").is_none());
        assert_eq!(
            SessionToken::parse(" abc ").map(|t| t.as_str().to_string()),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_session_token_from_authorization() {
        for value in ["Bearer abc", "bearer abc", "BEARER abc", "Bearer  abc "] {
            let token = SessionToken::from_authorization(value).unwrap();
            assert_eq!(token.as_str(), "abc");
        }

        assert_eq!(SessionToken::from_authorization("Basic abc"), None);
        assert_eq!(SessionToken::from_authorization("Bearer"), None);
        assert_eq!(SessionToken::from_authorization("Bearer   "), None);
        assert_eq!(SessionToken::from_authorization("abc"), None);
    }

    #[test]
    fn test_login_outcome_collapse() {
        let success = LoginOutcome::Success(SessionToken::new("t".to_string()));
        assert!(success.is_success());
        assert_eq!(success.failed_attempts(), None);

        assert_eq!(LoginOutcome::Failed(3).failed_attempts(), Some(3));
        assert_eq!(LoginOutcome::LockedOut(5).failed_attempts(), Some(5));
        assert!(!LoginOutcome::LockedOut(5).is_success());
        assert!(LoginOutcome::Failed(1).session_token().is_none());
    }
}
