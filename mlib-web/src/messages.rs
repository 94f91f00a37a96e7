//! User-facing message texts, looked up by key

pub const LOGIN_FAILURE: &str = "user.login.failure";
pub const LOGOUT_SUBTITLE: &str = "user.logout.subtitle";
pub const ACCESS_DENIED: &str = "error.msg.403";

/// Text for a message key; unknown keys render as the key itself
pub fn message(key: &str) -> &str {
    match key {
        LOGIN_FAILURE => "Invalid email or password.",
        LOGOUT_SUBTITLE => "You have been logged out.",
        ACCESS_DENIED => "You do not have permission to access this page.",
        other => other,
    }
}
