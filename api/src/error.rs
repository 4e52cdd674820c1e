use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as JsonResponse, Response},
};
use domain::DomainError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize, Debug)]
pub struct MessageBody {
    pub message: String,
}

pub fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        JsonResponse(MessageBody {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Helper function to map ApplicationError enum to HTTP status codes and response body.
/// Store failures are logged and answered without internal detail.
pub fn map_application_error_to_response(err: ApplicationError) -> Response {
    let (status, body) = match err {
        ApplicationError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        ApplicationError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            format!("Business '{}' not found", id),
        ),
        ApplicationError::StoreUnavailable(msg) => {
            error!("Underlying store error: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
        }
        ApplicationError::DomainError(domain_err) => {
            // Map domain validation errors to Bad Request
            warn!("Domain validation failed: {}", domain_err);
            let msg = match domain_err {
                DomainError::InvalidContact(problems) => problems.join("; "),
                other => other.to_string(),
            };
            (StatusCode::BAD_REQUEST, msg)
        }
    };
    message_response(status, body)
}
