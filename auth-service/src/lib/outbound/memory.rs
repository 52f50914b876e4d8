pub mod account;
pub mod session;

pub use account::InMemoryCredentialStore;
pub use session::InMemorySessionRegistry;
