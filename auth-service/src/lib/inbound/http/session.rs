use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;

use crate::domain::auth::models::SessionToken;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Attributes of the session cookie set by login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookie {
    pub max_age_secs: i64,
    pub secure: bool,
}

impl SessionCookie {
    pub fn new(max_age_secs: i64, secure: bool) -> Self {
        Self {
            max_age_secs,
            secure,
        }
    }

    /// Build the cookie delivering a freshly issued token.
    pub fn issue(&self, token: &SessionToken) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.as_str().to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(self.max_age_secs))
            .build()
    }

    /// Cookie matching [`Self::issue`] for removal from a jar.
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}

/// Session tokens presented with a request.
///
/// Collected from the `session_id` cookie and from an `Authorization: Bearer`
/// header. Both are kept so that a stale cookie does not hide a valid bearer
/// token. Never rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentedSession {
    cookie: Option<SessionToken>,
    bearer: Option<SessionToken>,
}

impl PresentedSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookie = CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .and_then(|cookie| SessionToken::parse(cookie.value()));

        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(SessionToken::from_authorization);

        Self { cookie, bearer }
    }

    /// Candidate tokens, cookie first, without duplicates.
    pub fn tokens(&self) -> Vec<&SessionToken> {
        let mut tokens: Vec<&SessionToken> = self.cookie.iter().collect();
        if let Some(bearer) = &self.bearer {
            if self.cookie.as_ref() != Some(bearer) {
                tokens.push(bearer);
            }
        }
        tokens
    }

    pub fn is_empty(&self) -> bool {
        self.cookie.is_none() && self.bearer.is_none()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PresentedSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
