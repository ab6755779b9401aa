//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management and maps each error class to
//! the HTTP status code and JSON envelope the API promises:
//!
//! ```json
//! {"success": false, "error": {"code": 422, "message": "...", "details": [...]}}
//! ```
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can
//! simply return `Result<_, AppError>` and rely on `?`. `From` implementations
//! are provided for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError`.
//!
//! Internal detail (database messages, hashing failures) is logged server-side
//! and never included in a 500 response body.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed, expired or revoked credentials (HTTP 401).
    Unauthorized(String),
    /// Valid identity but insufficient ownership of the resource (HTTP 403).
    Forbidden(String),
    /// Malformed request body or parameters (HTTP 400).
    BadRequest(String),
    /// A referenced resource does not exist (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint was violated, e.g. duplicate email (HTTP 422).
    Conflict(String),
    /// Input failed field-level validation (HTTP 422).
    /// Carries per-field detail strings for the error envelope.
    Validation { message: String, details: Vec<String> },
    /// Unexpected server-side failure (HTTP 500). The message is logged but
    /// replaced by a generic one in the response.
    Internal(String),
    /// Storage/transaction failure (HTTP 500). Same disclosure rules as
    /// `Internal`.
    Database(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to send to the client.
    fn public_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Validation { message, .. } => message.clone(),
            AppError::Internal(_) | AppError::Database(_) => {
                "An internal server error occurred".to_string()
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation { message, .. } => write!(f, "Validation Error: {}", message),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects carrying the
/// standard error envelope.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();

        // Full detail stays in the server log; the client only ever sees a
        // generic message for 5xx responses.
        if status.is_server_error() {
            log::error!("{}", self);
        }

        let mut error_body = json!({
            "code": status.as_u16(),
            "message": self.public_message(),
        });
        if let AppError::Validation { details, .. } = self {
            if !details.is_empty() {
                error_body["details"] = json!(details);
            }
        }

        HttpResponse::build(status).json(json!({
            "success": false,
            "error": error_body,
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`, a unique-constraint violation (Postgres
/// error code 23505) maps to `Conflict`, and everything else becomes a
/// `Database` error.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                AppError::Conflict("Duplicate record".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`,
/// flattening per-field messages into the `details` list.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect();
        details.sort();

        AppError::Validation {
            message: "Validation failed".into(),
            details,
        }
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}
