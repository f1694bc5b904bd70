use crate::auth::AuthError;
use crate::compare::ComparisonError;
use crate::files::FileError;
use crate::forms::FieldErrors;
use crate::ingestion::MappingError;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Data store request failed: {0}")]
    StoreError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Invalid form: {0}")]
    FieldError(FieldErrors),

    #[error("{0} not found")]
    NotFoundError(String),

    #[error("Authentication failed: {0}")]
    AuthError(AuthError),

    #[error("Authentication required")]
    UnauthorizedError,

    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("File storage failed: {0}")]
    StorageError(String),

    #[error("Stored record is malformed: {0}")]
    MappingError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;
        let (status, message) = match &self {
            AppError::StoreError(e) => {
                tracing::error!(error = %e, "Data store error");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::FieldError(errors) => {
                tracing::warn!(fields = %errors, "Form validation failed");
                metrics::counter!("form_rejections_total").increment(1);
                fields = Some(errors.clone());
                (StatusCode::BAD_REQUEST, "Please correct the highlighted fields".to_string())
            }
            AppError::NotFoundError(_) => {
                tracing::debug!(error = %self, "Not found");
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::AuthError(e) => {
                tracing::warn!(error = %e, "Authentication error");
                let status = match e {
                    AuthError::AlreadyRegistered => StatusCode::CONFLICT,
                    AuthError::OAuthUnavailable => StatusCode::NOT_IMPLEMENTED,
                    AuthError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    AuthError::InvalidConfirmation => StatusCode::BAD_REQUEST,
                    _ => StatusCode::UNAUTHORIZED,
                };
                (status, e.to_string())
            }
            AppError::UnauthorizedError => {
                tracing::debug!("Request without a valid session");
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::ForbiddenError(msg) => {
                tracing::warn!(error = %msg, "Forbidden");
                (StatusCode::FORBIDDEN, msg.clone())
            }
            AppError::ConflictError(msg) => {
                tracing::warn!(error = %msg, "Conflict");
                (StatusCode::CONFLICT, msg.clone())
            }
            AppError::StorageError(e) => {
                tracing::error!(error = %e, "File storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::MappingError(e) => {
                tracing::error!(error = %e, "Row mapping error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
            fields,
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, id } => {
                AppError::NotFoundError(format!("{} '{}'", table, id))
            }
            other => AppError::StoreError(other.to_string()),
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::FieldError(errors)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidSession => AppError::UnauthorizedError,
            other => AppError::AuthError(other),
        }
    }
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::TooLarge { .. } | FileError::InvalidPath(_) => {
                AppError::ValidationError(err.to_string())
            }
            other => AppError::StorageError(other.to_string()),
        }
    }
}

impl From<MappingError> for AppError {
    fn from(err: MappingError) -> Self {
        AppError::MappingError(err.to_string())
    }
}

impl From<ComparisonError> for AppError {
    fn from(err: ComparisonError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
