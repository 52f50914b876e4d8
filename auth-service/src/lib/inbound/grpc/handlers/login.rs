use std::sync::Arc;

use tonic::metadata::MetadataValue;
use tonic::Response;
use tonic::Status;

use super::SESSION_TOKEN_METADATA;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::LoginRequest;
use crate::proto::LoginResponse;

pub async fn login(
    service: Arc<dyn AuthServicePort>,
    request: LoginRequest,
) -> Result<Response<LoginResponse>, Status> {
    let command = LoginCommand::new(request.user_id, request.password)
        .map_err(|e| Status::invalid_argument(e.to_string()))?;

    let outcome = service.login(command).await?;

    let mut response = Response::new(LoginResponse::from(&outcome));
    if let Some(token) = outcome.session_token() {
        let value = MetadataValue::try_from(token.as_str())
            .map_err(|_| Status::internal("Session token is not valid metadata"))?;
        response.metadata_mut().insert(SESSION_TOKEN_METADATA, value);
    }

    Ok(response)
}
