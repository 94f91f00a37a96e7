//! Mapping service failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use mlib_common::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Service(#[from] Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Service(err) => match err {
                Error::UserNotFound(_) => StatusCode::NOT_FOUND,
                Error::DuplicateEmail(_) => StatusCode::CONFLICT,
                Error::BadCredentials => StatusCode::UNAUTHORIZED,
                Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Details stay in the log
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
