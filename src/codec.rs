//! JSON encoding and decoding at the HTTP boundary.

use crate::error::{ServerError, ServerResult};
use crate::model::Book;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Content type sent on every response that carries a body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Decode a request body into a [`Book`].
///
/// Unknown keys are ignored and missing keys become empty values; anything
/// that is not a JSON object of the right shape is a client error.
pub fn decode_book(body: &[u8]) -> ServerResult<Book> {
    serde_json::from_slice(body).map_err(ServerError::InvalidBody)
}

/// Encode `value` as indented JSON with the given status.
///
/// Encoding failures surface as a per-request 500.
pub fn pretty_json<T: Serialize>(status: StatusCode, value: &T) -> ServerResult<Response> {
    let body = serde_json::to_vec_pretty(value)
        .map_err(|err| ServerError::Internal(format!("failed to encode response: {err}")))?;
    Ok(json_response(status, body))
}

/// Build a response from an already-encoded JSON body.
pub fn json_response(status: StatusCode, body: impl Into<axum::body::Body>) -> Response {
    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body.into(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_tolerates_partial_bodies() {
        let book = decode_book(br#"{"isbn":"123"}"#).unwrap();
        assert_eq!(book, Book::new("123"));
    }

    #[test]
    fn decode_rejects_malformed_json() {
        assert!(matches!(
            decode_book(b"{isbn: 123"),
            Err(ServerError::InvalidBody(_))
        ));
        assert!(matches!(
            decode_book(br#"["not", "an", "object"]"#),
            Err(ServerError::InvalidBody(_))
        ));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("value cannot be encoded"))
        }
    }

    #[tokio::test]
    async fn encode_failure_is_a_per_request_server_error() {
        use http_body_util::BodyExt;

        let err = pretty_json(StatusCode::OK, &Unencodable).unwrap_err();
        assert!(matches!(err, ServerError::Internal(ref msg) if msg.contains("cannot be encoded")));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"message": "Internal server error"})
        );
    }

    #[test]
    fn pretty_json_sets_status_and_content_type() {
        let response = pretty_json(StatusCode::OK, &vec![Book::new("1")]).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
    }
}
