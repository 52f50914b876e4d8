use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::TokenError;
use crate::token::TokenGenerator;

/// Authentication coordinator combining password verification and session token issuance.
///
/// Provides high-level credential operations by coordinating
/// password hashing and token generation.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_generator: TokenGenerator,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator with 256-bit session tokens.
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new() -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_generator: TokenGenerator::new(),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// A `stored_hash` of `None` means the account does not exist; the same
    /// hashing work is still performed and `false` is returned.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash, if any
    ///
    /// # Returns
    /// True if the password matches the stored hash
    ///
    /// # Errors
    /// * `PasswordError` - The stored hash is malformed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<bool, AuthenticationError> {
        match stored_hash {
            Some(hash) => Ok(self.password_hasher.verify(password, hash)?),
            None => {
                self.password_hasher.verify_absent(password);
                Ok(false)
            }
        }
    }

    /// Issue a new opaque session token.
    ///
    /// # Returns
    /// Random token string
    ///
    /// # Errors
    /// * `TokenError` - Entropy source unavailable
    pub fn issue_token(&self) -> Result<String, TokenError> {
        self.token_generator.generate()
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new()
    }
}
