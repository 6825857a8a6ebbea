//! # Catalog Errors
//!
//! The closed set of failures a catalog operation can report. Every
//! variant renders as a structured JSON body with its kind and HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Machine-readable error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidInput,
    InvalidIdentifier,
    InvalidParameter,
    NotFound,
    Conflict,
    PersistenceError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::InvalidIdentifier => "INVALID_IDENTIFIER",
            ErrorKind::InvalidParameter => "INVALID_PARAMETER",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::PersistenceError => "PERSISTENCE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    // ==================
    // Rejected before any store call
    // ==================
    /// Missing or malformed required field in a request body
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identifier is not in the store's native format
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Malformed filter argument
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // ==================
    // Store reached
    // ==================
    /// No record matched
    #[error("Not found: {0}")]
    NotFound(String),

    /// The change would violate a uniqueness rule
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store failed; never retried
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl CatalogError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidInput(_) => ErrorKind::InvalidInput,
            CatalogError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            CatalogError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::Conflict(_) => ErrorKind::Conflict,
            CatalogError::Persistence(_) => ErrorKind::PersistenceError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput | ErrorKind::InvalidIdentifier | ErrorKind::InvalidParameter => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::PersistenceError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    pub code: u16,
}

impl From<&CatalogError> for ErrorResponse {
    fn from(err: &CatalogError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
            code: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
