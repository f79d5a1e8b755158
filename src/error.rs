use crate::domain::credentials::BASIC_CHALLENGE;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed")]
    AuthError,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Content-Type not supported")]
    UnsupportedMediaType,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                let body = Json(json!({ "error": "Unauthorized" }));
                let challenge = [(header::WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE))];
                return (StatusCode::UNAUTHORIZED, challenge, body).into_response();
            }
            Self::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string()),
            Self::UnsupportedMediaType => {
                tracing::debug!("Unsupported content type");
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Content-Type not supported".to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
