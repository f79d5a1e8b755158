use crate::api::AppState;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Marker extractor: its presence in a handler's arguments means the request
/// carried the configured Basic credentials.
#[derive(Debug)]
pub struct BasicAuth;

impl FromRequestParts<AppState> for BasicAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(header::AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                tracing::debug!("Authorization header is not visible ASCII");
                AppError::AuthError
            })?),
            None => None,
        };

        state.auth_service.authenticate(header)?;
        Ok(Self)
    }
}

/// Rejects requests whose `Content-Type` is not JSON. Runs as a parts
/// extractor so the check happens before any body bytes are read.
#[derive(Debug)]
pub struct JsonContentType;

impl<S: Send + Sync> FromRequestParts<S> for JsonContentType {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let content_type = parts.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
        if content_type.starts_with(JSON_CONTENT_TYPE) {
            Ok(Self)
        } else {
            Err(AppError::UnsupportedMediaType)
        }
    }
}
