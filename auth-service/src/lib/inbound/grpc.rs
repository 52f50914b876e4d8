pub mod auth_grpc_server;
pub mod handlers;

pub use auth_grpc_server::AuthGrpcService;
