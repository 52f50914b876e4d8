use std::sync::Arc;

use tonic::Request;
use tonic::Response;
use tonic::Status;

use super::handlers::bearer_token;
use super::handlers::login;
use super::handlers::logout;
use super::handlers::verify;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::auth_service_server::AuthService as AuthServiceProto;
use crate::proto::LoginRequest;
use crate::proto::LoginResponse;
use crate::proto::LogoutRequest;
use crate::proto::LogoutResponse;
use crate::proto::VerifyRequest;
use crate::proto::VerifyResponse;

pub struct AuthGrpcService {
    service: Arc<dyn AuthServicePort>,
}

impl AuthGrpcService {
    pub fn new(service: Arc<dyn AuthServicePort>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl AuthServiceProto for AuthGrpcService {
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        login::login(self.service.clone(), request.into_inner()).await
    }

    async fn verify(
        &self,
        request: Request<VerifyRequest>,
    ) -> Result<Response<VerifyResponse>, Status> {
        let token = bearer_token(request.metadata());
        let response = verify::verify(self.service.clone(), token).await?;
        Ok(Response::new(response))
    }

    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let token = bearer_token(request.metadata());
        let response = logout::logout(self.service.clone(), token).await?;
        Ok(Response::new(response))
    }
}
