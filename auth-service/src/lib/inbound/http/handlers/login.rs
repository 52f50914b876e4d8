use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Log in and, on success, set the session cookie.
///
/// Wrong passwords and locked accounts are reported in the body with
/// `success: false`, not as HTTP errors.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequestBody>,
) -> Result<(CookieJar, ApiSuccess<LoginResponseData>), ApiError> {
    let command = LoginCommand::new(body.user_id, body.password)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let outcome = state.auth_service.login(command).await?;

    let jar = match outcome.session_token() {
        Some(token) => jar.add(state.session_cookie.issue(token)),
        None => jar,
    };

    Ok((jar, ApiSuccess::new(StatusCode::OK, (&outcome).into())))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    user_id: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_attempts: Option<u32>,
}

impl From<&LoginOutcome> for LoginResponseData {
    fn from(outcome: &LoginOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            failed_attempts: outcome.failed_attempts(),
        }
    }
}
