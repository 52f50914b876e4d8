use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::TokenError;

/// Opaque session token generator.
///
/// Tokens are drawn from the operating system CSPRNG and encoded as
/// URL-safe base64 without padding, so they can travel in cookies and
/// headers unchanged.
pub struct TokenGenerator {
    length: usize,
}

impl TokenGenerator {
    /// Number of random bytes in a token (256 bits).
    pub const DEFAULT_LENGTH: usize = 32;

    /// Smallest accepted token size (128 bits).
    pub const MIN_LENGTH: usize = 16;

    /// Create a generator producing 256-bit tokens.
    ///
    /// # Returns
    /// TokenGenerator with default length
    pub fn new() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
        }
    }

    /// Create a generator with a custom byte length.
    ///
    /// Lengths below [`Self::MIN_LENGTH`] are raised to the minimum.
    ///
    /// # Arguments
    /// * `length` - Number of random bytes per token
    ///
    /// # Returns
    /// TokenGenerator with the given length
    pub fn with_length(length: usize) -> Self {
        Self {
            length: length.max(Self::MIN_LENGTH),
        }
    }

    /// Generate a fresh random token.
    ///
    /// # Returns
    /// Encoded token string
    ///
    /// # Errors
    /// * `EntropyUnavailable` - The OS random source could not be read
    pub fn generate(&self) -> Result<String, TokenError> {
        let mut bytes = vec![0u8; self.length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::EntropyUnavailable(e.to_string()))?;

        Ok(URL_SAFE_NO_PAD.encode(&bytes))
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
