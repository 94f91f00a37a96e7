//! HTTP handlers for mlib-web

pub mod error;
pub mod health;
pub mod session;
pub mod users;

pub use error::WebError;
pub use health::health_routes;
pub use session::CurrentUser;
pub use users::{
    access_denied, index, login_page, login_submit, logout, profile, profile_edit_page,
    profile_edit_submit, signup_page, signup_submit,
};
