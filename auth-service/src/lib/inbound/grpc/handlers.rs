use tonic::metadata::MetadataMap;
use tonic::Status;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::SessionToken;
use crate::proto::LoginResponse;

pub mod login;
pub mod logout;
pub mod verify;

/// Response metadata key carrying the token issued by Login.
pub const SESSION_TOKEN_METADATA: &str = "x-session-token";

/// Read the session token from `authorization: Bearer <token>` metadata.
///
/// The scheme is matched case-insensitively. Missing, non-ASCII or
/// non-bearer values yield `None`.
pub fn bearer_token(metadata: &MetadataMap) -> Option<SessionToken> {
    metadata
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(SessionToken::from_authorization)
}

impl From<&LoginOutcome> for LoginResponse {
    fn from(outcome: &LoginOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            failed_attempts: outcome.failed_attempts(),
        }
    }
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidInput(e) => Status::invalid_argument(e.to_string()),
            AuthError::Unavailable(msg) => Status::unavailable(msg),
            AuthError::NotFound(_) | AuthError::Unknown(_) => {
                tracing::error!(error = %err, "Internal error in auth procedure");
                Status::internal("Internal error")
            }
        }
    }
}
