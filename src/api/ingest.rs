use crate::api::AppState;
use crate::api::middleware::{BasicAuth, JsonContentType};
use crate::api::schemas::ingest::AddSmsResponse;
use crate::domain::event::RawItem;
use crate::error::{AppError, Result};
use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use serde::Deserialize;

/// Accepts a JSON array of device items and relays it to the queue.
///
/// # Errors
/// Returns `AppError::UnsupportedMediaType` for non-JSON content types,
/// `AppError::BadRequest` for malformed bodies or trailing data, and
/// `AppError::Internal` if the batch cannot be published.
pub async fn add_sms(
    _auth: BasicAuth,
    _json: JsonContentType,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let items = decode_items(&body)?;
    let added = state.ingest_service.ingest(items).await?;

    Ok(Json(AddSmsResponse::ok(added)))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Decodes exactly one JSON array; anything but whitespace after it is an error.
fn decode_items(body: &[u8]) -> Result<Vec<RawItem>> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let items = Vec::<RawItem>::deserialize(&mut deserializer)
        .map_err(|e| AppError::BadRequest(format!("Bad json: {e}")))?;
    deserializer.end().map_err(|_| AppError::BadRequest("Extra data after JSON".to_string()))?;
    Ok(items)
}
