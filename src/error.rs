use crate::codec::json_response;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// The `Display` text carries full detail for the server log. Clients only
/// ever see [`ServerError::client_message`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Incorrect body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Book not found")]
    BookNotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ServerError::BookNotFound | ServerError::RouteNotFound => StatusCode::NOT_FOUND,
            ServerError::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
            ServerError::Store(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message rendered into the response body. Never includes backend detail.
    pub fn client_message(&self) -> &'static str {
        match self {
            ServerError::InvalidBody(_) => "Incorrect body",
            ServerError::BookNotFound => "Book not found",
            ServerError::RouteNotFound => "Not found",
            ServerError::Store(StoreError::Duplicate(_)) => "Book already exists",
            ServerError::Store(_) => "Database error",
            ServerError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Store failures are logged by the handler with the operation name
        if status.is_server_error() && !matches!(self, ServerError::Store(_)) {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({ "message": self.client_message() }).to_string();
        json_response(status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_hide_detail_from_clients() {
        let err = ServerError::from(StoreError::backend("connection refused on 10.0.0.1"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Database error");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn duplicate_key_maps_to_conflict() {
        let err = ServerError::from(StoreError::Duplicate("123".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.client_message(), "Book already exists");
    }

    #[test]
    fn invalid_body_is_a_client_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ServerError::InvalidBody(json_err);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Incorrect body");
    }
}
