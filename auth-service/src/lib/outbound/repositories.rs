pub mod account;
pub mod session;

pub use account::PostgresCredentialStore;
pub use session::PostgresSessionRegistry;
