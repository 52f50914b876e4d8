pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod provisioning;

pub use outbound::memory;
pub use outbound::repositories;

pub mod proto {
    tonic::include_proto!("auth.v1");
}
