//! Authentication utilities library
//!
//! Provides reusable credential infrastructure for the auth service:
//! - Password hashing (Argon2id) with constant-time verification
//! - Opaque session token generation
//! - Authentication coordination
//!
//! The service defines its own storage ports and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenGenerator;
//!
//! let generator = TokenGenerator::new();
//! let token = generator.generate().unwrap();
//! assert_eq!(token.len(), 43);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new();
//!
//! // Provision: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue a session token
//! assert!(auth.verify_password("password123", Some(&hash)).unwrap());
//! let token = auth.issue_token().unwrap();
//! println!("Session: {}", token);
//! ```

pub mod authenticator;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenError;
pub use token::TokenGenerator;
