//! Error handler for converting AppError to HTTP responses.
//!
//! Implements `IntoResponse` for `AppError` and an envelope middleware that
//! gives every error response the same JSON shape and the request ID.

use axum::{
    Json,
    body::Bytes,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Largest error body the envelope middleware will buffer.
const MAX_ERROR_BODY: usize = 64 * 1024;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// Server-side variants are logged with their source and answered with
    /// a generic message; nothing from the source reaches the client.
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        let error_response = match &self {
            AppError::NotFound { entity, field, value } => {
                ErrorResponse::new(code, &self.to_string()).with_details(json!({
                    "entity": entity,
                    "field": field,
                    "value": value,
                }))
            }
            AppError::Duplicate { entity, field, value } => {
                ErrorResponse::new(code, &self.to_string()).with_details(json!({
                    "entity": entity,
                    "field": field,
                    "value": value,
                }))
            }
            AppError::Validation { field, reason } => {
                ErrorResponse::new(code, "Validation failed").with_details(json!([{
                    "field": field,
                    "message": reason,
                }]))
            }
            AppError::ValidationErrors { errors } => {
                ErrorResponse::new(code, "Validation failed").with_details(json!(errors))
            }
            AppError::BadRequest { message }
            | AppError::Unauthorized { message }
            | AppError::Forbidden { message } => ErrorResponse::new(code, message),
            AppError::Storage { operation, source } => {
                tracing::error!(operation = %operation, error = ?source, "Storage failure");
                ErrorResponse::new(code, "A storage error occurred")
            }
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = ?source, "Configuration failure");
                ErrorResponse::new(code, "A configuration error occurred")
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal failure");
                ErrorResponse::new(code, "An internal error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::ValidationErrors { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } => "VALIDATION_ERROR",
        AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::Storage { .. } => "STORAGE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

/// Code used for error responses that did not come from an `AppError`
/// (unknown route, wrong method, timeout).
fn fallback_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        s if s.is_server_error() => "INTERNAL_ERROR",
        _ => "BAD_REQUEST",
    }
}

/// Rewrites every 4xx/5xx response into the `ErrorResponse` shape and
/// stamps it with the request ID.
///
/// JSON object bodies (from `AppError` or the health report) are kept and
/// only gain `requestId`. Anything else (framework 404/405, timeouts) is
/// replaced with a generic body; the original text is not echoed.
pub async fn error_envelope_middleware(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let (mut parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .unwrap_or_else(|_| Bytes::new());

    let existing = is_json
        .then(|| serde_json::from_slice::<Value>(&bytes).ok())
        .flatten()
        .filter(Value::is_object);

    let mut envelope = match existing {
        Some(value) => value,
        None => {
            let message = status.canonical_reason().unwrap_or("Request failed");
            serde_json::to_value(ErrorResponse::new(fallback_code(status), message))
                .unwrap_or_else(|_| json!({ "code": fallback_code(status), "message": message }))
        }
    };

    if let (Some(id), Some(object)) = (request_id, envelope.as_object_mut()) {
        object.entry("requestId").or_insert_with(|| Value::String(id));
    }

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    let mut rebuilt = (status, Json(envelope)).into_response();
    // Repeated headers such as set-cookie keep every value
    for (name, value) in parts.headers.iter() {
        rebuilt.headers_mut().append(name.clone(), value.clone());
    }
    rebuilt
}
