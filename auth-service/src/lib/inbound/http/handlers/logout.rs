use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::PresentedSession;

/// Revoke every presented session token and clear the session cookie.
pub async fn logout(
    State(state): State<AppState>,
    session: PresentedSession,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<LogoutResponseData>), ApiError> {
    if session.is_empty() {
        state.auth_service.logout(None).await?;
    }
    for token in session.tokens() {
        state.auth_service.logout(Some(token)).await?;
    }

    Ok((
        jar.remove(state.session_cookie.removal()),
        ApiSuccess::new(StatusCode::OK, LogoutResponseData { success: true }),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub success: bool,
}
