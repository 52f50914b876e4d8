use std::sync::Arc;

use tonic::Status;

use crate::domain::auth::models::SessionToken;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::VerifyResponse;

pub async fn verify(
    service: Arc<dyn AuthServicePort>,
    token: Option<SessionToken>,
) -> Result<VerifyResponse, Status> {
    let authenticated = service.verify(token.as_ref()).await?;
    Ok(VerifyResponse { authenticated })
}
