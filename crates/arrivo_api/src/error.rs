use arrivo_domain::DomainError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON body returned by every failing route.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Route-level error: client faults map to 400, durability faults to 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request was structurally invalid.
    #[error("{reason}")]
    BadRequest { field: String, reason: String },
    /// The arrival could not be recorded.
    #[error("{message}")]
    Internal { message: String, details: String },
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError { field, reason } => Self::BadRequest { field, reason },
            DomainError::StorageError(source) => Self::Internal {
                message: "Failed to record arrival".to_string(),
                details: source.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest { field, reason } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    success: false,
                    error: format!("{field} {reason}"),
                    field: Some(field),
                    details: None,
                },
            ),
            Self::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    success: false,
                    error: message,
                    field: None,
                    details: Some(details),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let api_error: ApiError = DomainError::invalid_field("latitude", "is required").into();

        match api_error {
            ApiError::BadRequest { field, reason } => {
                assert_eq!(field, "latitude");
                assert_eq!(reason, "is required");
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_error_maps_to_internal() {
        let api_error: ApiError =
            DomainError::StorageError(anyhow::anyhow!("connection lost")).into();

        match api_error {
            ApiError::Internal { details, .. } => assert_eq!(details, "connection lost"),
            other => panic!("expected Internal, got {:?}", other),
        }
    }
}
