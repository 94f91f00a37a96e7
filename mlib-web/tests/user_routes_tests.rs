//! Router tests for the `/user/*` pages against an in-memory database

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

use mlib_common::db::init_in_memory;
use mlib_common::dto::UserDto;
use mlib_common::{Authority, Entity};
use mlib_web::{build_router, AppState};

async fn setup() -> (Router, AppState) {
    let pool = init_in_memory().await.unwrap();
    let state = AppState::new(pool, Duration::minutes(30));
    (build_router(state.clone()), state)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// `NAME=value` part of the response's Set-Cookie header
fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn create_user(state: &AppState, email: &str, password: &str) -> mlib_common::User {
    let dto = UserDto {
        email: email.to_string(),
        password: password.to_string(),
        enabled: true,
        ..Default::default()
    };
    state.users.create_user(&dto).await.unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let form = format!("email={}&password={}", email, password);
    let response = app
        .clone()
        .oneshot(post_form("/user/login", &form, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    session_cookie(&response)
}

// =============================================================================
// Health and login
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup().await;

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mlib-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_login_page_messages() {
    let (app, _) = setup().await;

    let body = body_json(app.clone().oneshot(get("/user/login", None)).await.unwrap()).await;
    assert_eq!(body["view"], "user/login");
    assert!(body.get("error").is_none());
    assert!(body.get("message").is_none());

    let body = body_json(app.clone().oneshot(get("/user/login?error", None)).await.unwrap()).await;
    assert_eq!(body["error"], "Invalid email or password.");

    let body = body_json(app.oneshot(get("/user/login?logout", None)).await.unwrap()).await;
    assert_eq!(body["message"], "You have been logged out.");
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let (app, state) = setup().await;
    create_user(&state, "milan@example.com", "secret123").await;

    let response = app
        .oneshot(post_form(
            "/user/login",
            "email=milan%40example.com&password=secret123",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("MLIB_SESSION="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_login_failure_redirects_with_error() {
    let (app, state) = setup().await;
    create_user(&state, "milan@example.com", "secret123").await;

    let response = app
        .oneshot(post_form(
            "/user/login",
            "email=milan%40example.com&password=wrong-one",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/login?error");
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, state) = setup().await;
    create_user(&state, "milan@example.com", "secret123").await;
    let cookie = login(&app, "milan%40example.com", "secret123").await;

    let response = app
        .clone()
        .oneshot(get("/user/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/user/login?logout");
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // The old token no longer opens the profile
    let response = app.oneshot(get("/user/profile", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/login");
}

// =============================================================================
// Signup
// =============================================================================

#[tokio::test]
async fn test_signup_page_has_empty_user() {
    let (app, _) = setup().await;

    let body = body_json(app.oneshot(get("/user/signup", None)).await.unwrap()).await;
    assert_eq!(body["view"], "user/signup");
    assert_eq!(body["user"]["email"], "");
    assert!(body["user"]["id"].is_null());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_signup_creates_enabled_user_and_logs_in() {
    let (app, state) = setup().await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/user/signup",
            "id=&email=new%40example.com&firstName=Milan&lastName=&password=secret123&userAuthorities=ROLE_ADMIN",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = session_cookie(&response);

    let user = state.users.find_user_by_email("new@example.com").await.unwrap();
    assert!(user.enabled);
    assert_eq!(user.first_name.as_deref(), Some("Milan"));
    assert!(user.has_authority(Authority::User));
    assert!(!user.has_authority(Authority::Admin));

    let body = body_json(app.oneshot(get("/", Some(&cookie))).await.unwrap()).await;
    assert_eq!(body["view"], "index");
    assert_eq!(body["user"]["email"], "new@example.com");
}

#[tokio::test]
async fn test_signup_validation_errors_redisplay_form() {
    let (app, state) = setup().await;

    let response = app
        .oneshot(post_form(
            "/user/signup",
            "email=not-an-email&password=abc",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["view"], "user/signup");
    assert_eq!(body["user"]["email"], "not-an-email");
    assert!(body["errors"]["email"].is_string());
    assert!(body["errors"]["password"].is_string());

    assert!(state.users.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let (app, state) = setup().await;
    create_user(&state, "taken@example.com", "secret123").await;

    let response = app
        .oneshot(post_form(
            "/user/signup",
            "email=TAKEN%40example.com&password=secret123",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("TAKEN@example.com"));
}

// =============================================================================
// Access denied and profile
// =============================================================================

#[tokio::test]
async fn test_access_denied_page() {
    let (app, _) = setup().await;

    let response = app.oneshot(get("/user/403", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["view"], "error-pages/default");
    assert_eq!(
        body["message"],
        "You do not have permission to access this page."
    );
}

#[tokio::test]
async fn test_profile_requires_session() {
    let (app, _) = setup().await;

    for uri in ["/user/profile", "/user/profile/edit"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/user/login");
    }

    let response = app
        .oneshot(get("/user/profile", Some("MLIB_SESSION=forged")))
        .await
        .unwrap();
    assert_eq!(location(&response), "/user/login");
}

#[tokio::test]
async fn test_profile_shows_current_user() {
    let (app, state) = setup().await;
    let user = create_user(&state, "milan@example.com", "secret123").await;
    let cookie = login(&app, "milan%40example.com", "secret123").await;

    let body = body_json(app.clone().oneshot(get("/user/profile", Some(&cookie))).await.unwrap()).await;
    assert_eq!(body["view"], "user/profile");
    assert_eq!(body["user"]["id"], user.identity().key().unwrap());
    assert_eq!(body["user"]["email"], "milan@example.com");
    assert_eq!(body["user"]["userAuthorities"][0], "ROLE_USER");
    assert!(body["user"].get("password").is_none());

    let body = body_json(app.oneshot(get("/user/profile/edit", Some(&cookie))).await.unwrap()).await;
    assert_eq!(body["view"], "user/edit");
}

#[tokio::test]
async fn test_profile_edit_updates_own_account() {
    let (app, state) = setup().await;
    let user = create_user(&state, "milan@example.com", "secret123").await;
    let key = user.identity().key().unwrap();
    let cookie = login(&app, "milan%40example.com", "secret123").await;

    let form = format!(
        "id={}&email=milan%40example.com&firstName=Milan&lastName=Novak&password=",
        key
    );
    let response = app
        .oneshot(post_form("/user/profile/edit", &form, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/profile");

    let stored = state.users.find_user(key).await.unwrap();
    assert_eq!(stored.last_name.as_deref(), Some("Novak"));
    assert!(stored.enabled);
    assert!(stored.verify_password("secret123"));
    assert!(stored.has_authority(Authority::User));
}

#[tokio::test]
async fn test_profile_edit_of_other_user_is_denied() {
    let (app, state) = setup().await;
    create_user(&state, "milan@example.com", "secret123").await;
    let other = create_user(&state, "other@example.com", "secret123").await;
    let other_key = other.identity().key().unwrap();
    let cookie = login(&app, "milan%40example.com", "secret123").await;

    let form = format!("id={}&email=hijacked%40example.com&password=", other_key);
    let response = app
        .oneshot(post_form("/user/profile/edit", &form, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/403");

    let stored = state.users.find_user(other_key).await.unwrap();
    assert_eq!(stored.email, "other@example.com");
}

#[tokio::test]
async fn test_profile_edit_validation_errors() {
    let (app, state) = setup().await;
    let user = create_user(&state, "milan@example.com", "secret123").await;
    let cookie = login(&app, "milan%40example.com", "secret123").await;

    let form = format!(
        "id={}&email=milan%40example.com&password=abc",
        user.identity().key().unwrap()
    );
    let response = app
        .oneshot(post_form("/user/profile/edit", &form, Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["view"], "user/edit");
    assert!(body["errors"]["password"].is_string());
}
