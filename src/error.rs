//! Error types
//!
//! `StoreError` and `AllocationError` describe failures of the persistence
//! and allocation layers. `AppError` is what handlers return; it decides the
//! status code and body the client sees.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::password::PasswordError;

/// Errors raised by the redb-backed stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("short code already exists: {0}")]
    CodeConflict(String),

    #[error("username already exists: {0}")]
    UsernameTaken(String),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),
}

// redb reports each phase of a transaction with its own error type; all of
// them fold into `redb::Error`.
macro_rules! storage_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for StoreError {
                fn from(err: $source) -> Self {
                    StoreError::Storage(redb::Error::from(err))
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Errors raised while minting a short code
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("no free short code found after {0} attempts")]
    Exhausted(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced at the HTTP boundary
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("URL not found")]
    NotFound,

    #[error("{0}")]
    Authentication(String),

    #[error(transparent)]
    Allocation(AllocationError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken(_) => {
                AppError::Conflict("This username already exists".to_string())
            }
            other => AppError::Store(other),
        }
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Store(store) => store.into(),
            exhausted => AppError::Allocation(exhausted),
        }
    }
}

impl AppError {
    /// Machine readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::NotFound => "not_found",
            Self::Authentication(_) => "authentication_error",
            Self::Allocation(_) => "allocation_exhausted",
            Self::Password(_) | Self::Store(_) | Self::Session(_) | Self::Task(_) => {
                "internal_error"
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Allocation(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Password(_) | Self::Store(_) | Self::Session(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            // The redirect path answers in plain text
            Self::NotFound => return (status, "URL not found").into_response(),
            Self::Allocation(_)
            | Self::Password(_)
            | Self::Store(_)
            | Self::Session(_)
            | Self::Task(_) => {
                tracing::error!(error = %self, "request failed");
                return (
                    status,
                    Json(json!({
                        "error": "Internal server error",
                        "code": self.code()
                    })),
                )
                    .into_response();
            }
            _ => {}
        }

        (
            status,
            Json(json!({
                "error": self.to_string(),
                "code": self.code()
            })),
        )
            .into_response()
    }
}
