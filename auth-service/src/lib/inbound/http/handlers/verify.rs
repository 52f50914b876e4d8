use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::PresentedSession;

/// Report whether any presented token belongs to a live session.
pub async fn verify(
    State(state): State<AppState>,
    session: PresentedSession,
) -> Result<ApiSuccess<VerifyResponseData>, ApiError> {
    let mut authenticated = false;
    for token in session.tokens() {
        if state.auth_service.verify(Some(token)).await? {
            authenticated = true;
            break;
        }
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        VerifyResponseData { authenticated },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResponseData {
    pub authenticated: bool,
}
