use std::sync::Arc;

use tonic::Status;

use crate::domain::auth::models::SessionToken;
use crate::domain::auth::ports::AuthServicePort;
use crate::proto::LogoutResponse;

pub async fn logout(
    service: Arc<dyn AuthServicePort>,
    token: Option<SessionToken>,
) -> Result<LogoutResponse, Status> {
    service.logout(token.as_ref()).await?;
    Ok(LogoutResponse { success: true })
}
