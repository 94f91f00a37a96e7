//! `/user/*` pages: login, logout, signup, access denied and the profile

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use mlib_common::dto::{FieldErrors, UserDto, Validation};
use mlib_common::{Entity, Error, User};

use super::error::WebError;
use super::session::{cleared_cookie, session_cookie, session_token, CurrentUser};
use crate::messages::{self, message};
use crate::AppState;

const LOGIN_VIEW: &str = "user/login";
const SIGNUP_VIEW: &str = "user/signup";
const PROFILE_VIEW: &str = "user/profile";
const EDIT_VIEW: &str = "user/edit";
const ERROR_VIEW: &str = "error-pages/default";

const PROFILE_PATH: &str = "/user/profile";
const ACCESS_DENIED_PATH: &str = "/user/403";

/// Page model: the view name plus its attributes
fn page(view: &str, mut model: Value) -> Json<Value> {
    if let Value::Object(attributes) = &mut model {
        attributes.insert("view".to_string(), Value::from(view));
    }
    Json(model)
}

/// Re-display a form with its field errors
fn invalid_form(view: &str, dto: &UserDto, errors: FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        page(view, json!({ "user": dto, "errors": errors })),
    )
        .into_response()
}

/// Redirect that also installs a session cookie
fn redirect_with_cookie(to: &str, cookie: String) -> Response {
    ([(header::SET_COOKIE, cookie)], Redirect::to(to)).into_response()
}

/// GET /
pub async fn index(user: Option<CurrentUser>) -> Json<Value> {
    let user = user.map(|CurrentUser(user)| UserDto::from(&user));
    page("index", json!({ "user": user }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    pub error: Option<String>,
    pub logout: Option<String>,
}

/// GET /user/login?error&logout
pub async fn login_page(Query(params): Query<LoginParams>) -> Json<Value> {
    let mut model = json!({});
    if params.error.is_some() {
        model["error"] = Value::from(message(messages::LOGIN_FAILURE));
    }
    if params.logout.is_some() {
        model["message"] = Value::from(message(messages::LOGOUT_SUBTITLE));
    }
    page(LOGIN_VIEW, model)
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /user/login
pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    match state.users.authenticate(&form.email, &form.password).await {
        Ok(user) => {
            let token = state.users.open_session(&user, state.session_ttl).await?;
            info!("User {} logged in", user.identity());
            Ok(redirect_with_cookie("/", session_cookie(&token, state.session_ttl)))
        }
        Err(Error::BadCredentials) => Ok(Redirect::to("/user/login?error").into_response()),
        Err(e) => Err(e.into()),
    }
}

/// GET /user/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    if let Some(token) = session_token(&headers) {
        state.users.close_session(&token).await?;
    }
    Ok(redirect_with_cookie("/user/login?logout", cleared_cookie()))
}

/// GET /user/signup
pub async fn signup_page() -> Json<Value> {
    page(SIGNUP_VIEW, json!({ "user": UserDto::default() }))
}

/// POST /user/signup
///
/// Creates an enabled account and logs it in. A failed login after a
/// successful signup is only logged; the account exists either way.
pub async fn signup_submit(
    State(state): State<AppState>,
    Form(mut dto): Form<UserDto>,
) -> Result<Response, WebError> {
    if let Err(errors) = dto.validate(Validation::Signup) {
        return Ok(invalid_form(SIGNUP_VIEW, &dto, errors));
    }

    dto.id = None;
    dto.enabled = true;
    state.users.create_user(&dto).await?;

    let login = match state.users.authenticate(&dto.email, &dto.password).await {
        Ok(user) => state.users.open_session(&user, state.session_ttl).await,
        Err(e) => Err(e),
    };
    match login {
        Ok(token) => Ok(redirect_with_cookie("/", session_cookie(&token, state.session_ttl))),
        Err(e) => {
            warn!("Failed to authenticate new user {}: {}", dto.email, e);
            Ok(Redirect::to("/").into_response())
        }
    }
}

/// GET /user/403
pub async fn access_denied() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        page(ERROR_VIEW, json!({ "message": message(messages::ACCESS_DENIED) })),
    )
}

/// GET /user/profile
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<Value> {
    page(PROFILE_VIEW, json!({ "user": UserDto::from(&user) }))
}

/// GET /user/profile/edit
pub async fn profile_edit_page(CurrentUser(user): CurrentUser) -> Json<Value> {
    page(EDIT_VIEW, json!({ "user": UserDto::from(&user) }))
}

/// POST /user/profile/edit
///
/// Only the logged-in user's own account can be edited. Authorities and the
/// enabled flag are never taken from the form.
pub async fn profile_edit_submit(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Form(mut dto): Form<UserDto>,
) -> Result<Response, WebError> {
    if dto.id != current.identity().key() {
        warn!(
            "User {} tried to edit profile {:?}",
            current.identity(),
            dto.id
        );
        return Ok(Redirect::to(ACCESS_DENIED_PATH).into_response());
    }

    if let Err(errors) = dto.validate(Validation::ProfileEdit) {
        return Ok(invalid_form(EDIT_VIEW, &dto, errors));
    }

    copy_stored_fields(&mut dto, &current);
    state.users.update_user(&dto).await?;

    Ok(Redirect::to(PROFILE_PATH).into_response())
}

fn copy_stored_fields(dto: &mut UserDto, stored: &User) {
    dto.user_authorities = stored.authorities().iter().map(|a| a.authority).collect();
    dto.enabled = stored.enabled;
}
