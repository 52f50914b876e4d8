use argon2::password_hash;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as _;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Argon2id password hashing with constant-time verification.
///
/// Hashes are PHC strings, so the parameters used to produce a stored hash
/// travel with it and verification keeps working if the defaults change.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string (algorithm, parameters, salt and digest)
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 rejected the input or parameters
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash
    ///
    /// # Returns
    /// True if the password matches, false on mismatch
    ///
    /// # Errors
    /// * `MalformedHash` - Stored hash is not a valid PHC string
    /// * `VerificationFailed` - Hash parameters could not be applied
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
        }
    }

    /// Whether `hash` is a PHC string usable by [`Self::verify`].
    pub fn is_valid_hash(hash: &str) -> bool {
        PasswordHash::new(hash).is_ok()
    }

    /// Spend the work of a verification when no stored hash exists.
    ///
    /// Keeps the response time for unknown accounts in line with known ones.
    pub fn verify_absent(&self, password: &str) {
        let salt = SaltString::generate(&mut OsRng);
        let _ = self.argon2.hash_password(password.as_bytes(), &salt);
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$v=19$"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new();

        let first = hasher.hash("same_password").expect("Failed to hash password");
        let second = hasher.hash("same_password").expect("Failed to hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn test_is_valid_hash() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("password").expect("Failed to hash password");

        assert!(PasswordHasher::is_valid_hash(&hash));
        assert!(!PasswordHasher::is_valid_hash("salt:hash"));
        assert!(!PasswordHasher::is_valid_hash(""));
    }

    #[test]
    fn test_verify_malformed_hash() {
        let hasher = PasswordHasher::new();
        assert!(matches!(
            hasher.verify("password", "invalid_hash"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
