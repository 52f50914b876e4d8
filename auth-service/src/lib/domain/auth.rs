pub mod attempts;
pub mod errors;
pub mod lockout;
pub mod locks;
pub mod models;
pub mod ports;
pub mod service;
