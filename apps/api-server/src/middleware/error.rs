//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use quill_core::DomainError;
use quill_shared::{ErrorResponse, FieldErrorBody};

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation errors: {0:?}")]
    Validation(Vec<FieldErrorBody>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
            AppError::Unauthorized => {
                ErrorResponse::unauthorized().with_detail("Invalid email or password")
            }
            AppError::Forbidden(detail) => ErrorResponse::forbidden(detail),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::Internal(detail) => {
                // Detail stays in the logs only.
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Validation(errors) => AppError::Validation(
                errors
                    .into_inner()
                    .into_iter()
                    .map(|e| FieldErrorBody {
                        field: e.field,
                        message: e.message,
                    })
                    .collect(),
            ),
            DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg.to_string()),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use quill_core::validation::ValidationErrors;

    use super::*;

    async fn body_json(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_validation_lists_fields() {
        let err: AppError =
            DomainError::Validation(ValidationErrors::single("title", "too short")).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = body_json(err).await;
        assert_eq!(body["errors"][0]["field"], "title");
    }

    #[actix_web::test]
    async fn test_duplicate_is_bad_request_with_message() {
        let err: AppError = DomainError::Duplicate("Category already exists".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(err).await["detail"], "Category already exists");
    }

    #[actix_web::test]
    async fn test_internal_detail_is_not_exposed() {
        let err: AppError = DomainError::Internal("connection reset by peer".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(err).await;
        assert_eq!(body["detail"], "Something went wrong!");
    }

    #[test]
    fn test_status_mapping() {
        let forbidden: AppError = DomainError::Forbidden("Access denied").into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let missing: AppError = DomainError::not_found("Post", "x").into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let clash: AppError = DomainError::Conflict("Email already registered".into()).into();
        assert_eq!(clash.status_code(), StatusCode::CONFLICT);
    }
}
