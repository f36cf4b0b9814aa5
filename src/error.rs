use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Failures surfaced by a `UserStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("row mapping failed: {0}")]
    Mapping(String),

    #[error("query did not finish within {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Query(_) | Self::Timeout(_) => ErrorKind::Query,
            Self::Mapping(_) => ErrorKind::Mapping,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => Self::Mapping(e.to_string()),
            other => Self::Query(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Query,
    Mapping,
    Validation,
}

impl ErrorKind {
    /// The only place an error kind is turned into an HTTP status.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Query | ErrorKind::Mapping => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Handler-level failure. The message goes to the client, the cause only to the log.
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: &'static str,
    pub cause: Option<String>,
}

impl ApiError {
    pub fn validation(message: &'static str) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl ToString) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Wraps a store failure; `message` is used for anything that is not a 404.
    pub fn from_store(e: StoreError, message: &'static str) -> Self {
        let kind = e.kind();
        let message = match kind {
            ErrorKind::NotFound => "User not found",
            _ => message,
        };
        Self {
            kind,
            message,
            cause: Some(e.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let cause = self.cause.as_deref().unwrap_or("-");
        if status.is_server_error() {
            error!(%status, kind = ?self.kind, error = %cause, "{}", self.message);
        } else {
            warn!(%status, kind = ?self.kind, error = %cause, "{}", self.message);
        }
        (status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Query.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorKind::Mapping.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sqlx_errors_are_classified() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::ColumnNotFound("status".into())),
            StoreError::Mapping(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Query(_)
        ));
    }

    #[test]
    fn store_failure_hides_cause_from_client() {
        let err = ApiError::from_store(
            StoreError::from(sqlx::Error::PoolTimedOut),
            "Failed to fetch users",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to fetch users");
        assert!(err.cause.unwrap().contains("timed out"));
    }

    #[test]
    fn timeout_is_a_server_error() {
        let err = ApiError::from_store(
            StoreError::Timeout(Duration::from_secs(1)),
            "Failed to fetch users",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.cause.unwrap().contains("1s"));
    }

    #[test]
    fn not_found_uses_fixed_message() {
        let err = ApiError::from_store(StoreError::NotFound, "Failed to fetch user");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "User not found");
    }
}
