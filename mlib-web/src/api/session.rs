//! Session cookie handling and the logged-in user extractor

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Duration;
use tracing::debug;

use mlib_common::User;

use super::error::WebError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "MLIB_SESSION";
pub const LOGIN_PATH: &str = "/user/login";

/// Value of our session cookie in the request, if present
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_str = headers.get(header::COOKIE)?.to_str().ok()?;

    cookie_str.split(';').find_map(|cookie| {
        let (name, value) = cookie.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    )
}

/// `Set-Cookie` value that makes the browser drop the session
pub fn cleared_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// The user owning the request's session.
///
/// Requests without a live session are redirected to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Err(Redirect::to(LOGIN_PATH).into_response());
        };

        match state.users.session_user(&token).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                debug!("Session cookie did not match a live session");
                Err(Redirect::to(LOGIN_PATH).into_response())
            }
            Err(e) => Err(WebError::from(e).into_response()),
        }
    }
}
