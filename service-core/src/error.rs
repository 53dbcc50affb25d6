use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    /// Wraps the first violated constraint from a `validator` run, prefixed
    /// with the input location (`body`, `params`, `querystring`).
    pub fn validation(location: &str, errors: &ValidationErrors) -> Self {
        AppError::Validation(first_violation(location, errors))
    }
}

/// Walks a `ValidationErrors` tree and renders the first violation as
/// `location/field: message`. Fields are visited in name order so the
/// reported violation is deterministic.
fn first_violation(path: &str, errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let child = format!("{}/{}", path, field);
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let detail = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    return format!("{}: {}", child, detail);
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                return first_violation(&child, inner);
            }
            ValidationErrorsKind::List(map) => {
                if let Some((index, inner)) = map.iter().next() {
                    return first_violation(&format!("{}/{}", child, index), inner);
                }
            }
        }
    }

    format!("{}: invalid input", path)
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
        }

        #[derive(Serialize)]
        struct ValidationBody {
            #[serde(rename = "statusCode")]
            status_code: u16,
            code: String,
            error: String,
            message: String,
        }

        match self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationBody {
                    status_code: StatusCode::BAD_REQUEST.as_u16(),
                    code: "VALIDATION".to_string(),
                    error: "Bad Request".to_string(),
                    message,
                }),
            )
                .into_response(),
            AppError::NotFound(err) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
                .into_response(),
            AppError::Conflict(err) => (
                StatusCode::CONFLICT,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
                .into_response(),
            AppError::DatabaseError(err) => {
                tracing::error!(error = %err, "Storage operation failed");
                internal_error_response()
            }
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "Unhandled internal error");
                internal_error_response()
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                internal_error_response()
            }
        }
    }
}

// Storage and internal failures share one opaque body; detail stays in logs.
fn internal_error_response() -> Response {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}
