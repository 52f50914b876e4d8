pub mod handlers;
pub mod router;
pub mod session;

pub use router::create_router;
pub use router::AppState;
pub use session::SessionCookie;
