use thiserror::Error;

/// Error type for session token operations.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("System entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}
