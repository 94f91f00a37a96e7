//! mlib-web library - user account pages for the music library
//!
//! Handlers answer with JSON page models (a view name plus its attributes)
//! or redirects; sessions ride on an HttpOnly cookie.

use axum::Router;
use chrono::Duration;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use mlib_common::services::UserService;

pub mod api;
pub mod messages;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    /// Lifetime of a login session
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(db: SqlitePool, session_ttl: Duration) -> Self {
        Self {
            users: UserService::new(db),
            session_ttl,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let user_routes = Router::new()
        .route("/login", get(api::login_page).post(api::login_submit))
        .route("/logout", get(api::logout))
        .route("/signup", get(api::signup_page).post(api::signup_submit))
        .route("/403", get(api::access_denied))
        .route("/profile", get(api::profile))
        .route(
            "/profile/edit",
            get(api::profile_edit_page).post(api::profile_edit_submit),
        );

    Router::new()
        .route("/", get(api::index))
        .nest("/user", user_routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
