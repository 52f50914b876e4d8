use thiserror::Error;

/// Error for rejected login input, raised before any store is touched
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("User ID must not be empty")]
    EmptyUserId,

    #[error("User ID too long: maximum {max} characters, got {actual}")]
    UserIdTooLong { max: usize, actual: usize },

    #[error("Password must not be empty")]
    EmptyPassword,
}

/// Top-level error for all authentication operations.
///
/// Business negatives (wrong password, lockout, unknown session) are never
/// errors; they are carried by the operation outcomes.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    // Absorbed by the service, never surfaced as "account does not exist"
    #[error("Account not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}

impl From<auth::AuthenticationError> for AuthError {
    fn from(err: auth::AuthenticationError) -> Self {
        AuthError::Unknown(err.to_string())
    }
}

impl From<auth::TokenError> for AuthError {
    fn from(err: auth::TokenError) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
