//! `/books` resource handlers.

use crate::codec::{decode_book, pretty_json};
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use crate::store::{BookFilter, StoreError};
use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::sync::Arc;

/// Characters escaped when an ISBN is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// `Location` value for a newly created book.
///
/// The ISBN is percent-encoded, so the value is always visible ASCII.
fn book_location(collection_path: &str, isbn: &str) -> ServerResult<HeaderValue> {
    let location = format!(
        "{}/{}",
        collection_path,
        utf8_percent_encode(isbn, PATH_SEGMENT)
    );
    HeaderValue::from_str(&location)
        .map_err(|err| ServerError::Internal(format!("invalid location header: {err}")))
}

/// Log a store failure with the operation that hit it, then wrap it.
fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> ServerError {
    move |err| {
        match err {
            StoreError::Duplicate(ref isbn) => {
                tracing::warn!(isbn = %isbn, operation, "Duplicate isbn rejected");
            }
            ref err => tracing::error!(error = %err, operation, "Store operation failed"),
        }
        ServerError::Store(err)
    }
}

/// List every book
///
/// `GET /books` - 200 with a JSON array, empty when the collection is empty.
pub async fn list_books(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let books = state
        .store
        .find(&BookFilter::All)
        .await
        .map_err(store_failure("list books"))?;

    pretty_json(StatusCode::OK, &books)
}

/// Create a book
///
/// `POST /books` - 201 with `Location: <path>/<isbn>` (ISBN percent-encoded)
/// and no body. The insert is unconditional; a second book with the same ISBN
/// is accepted unless the store enforces uniqueness.
pub async fn create_book(
    State(state): State<Arc<ServerState>>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> ServerResult<Response> {
    let book = decode_book(&body)?;
    let isbn = book.isbn.clone();

    state
        .store
        .insert_one(book)
        .await
        .map_err(store_failure("insert book"))?;

    let location = book_location(uri.path(), &isbn)?;
    Ok((StatusCode::CREATED, [(LOCATION, location)]).into_response())
}

/// Fetch one book by ISBN
///
/// `GET /books/{isbn}` - 200 with the book, 404 when nothing matches or the
/// stored document has no ISBN.
pub async fn get_book(
    State(state): State<Arc<ServerState>>,
    Path(isbn): Path<String>,
) -> ServerResult<Response> {
    let book = state
        .store
        .find_one(&BookFilter::isbn(isbn))
        .await
        .map_err(store_failure("find book"))?;

    match book {
        Some(book) if !book.isbn.is_empty() => pretty_json(StatusCode::OK, &book),
        _ => Err(ServerError::BookNotFound),
    }
}

/// Update a book by ISBN
///
/// `PUT /books/{isbn}` - sets the non-empty fields of the body on the matching
/// book and answers 200 with no body. A miss is silent unless
/// `strict_not_found` is configured.
pub async fn update_book(
    State(state): State<Arc<ServerState>>,
    Path(isbn): Path<String>,
    body: Bytes,
) -> ServerResult<Response> {
    let book = decode_book(&body)?;

    let outcome = state
        .store
        .update_one(&BookFilter::isbn(isbn.as_str()), book)
        .await
        .map_err(store_failure("update book"))?;

    if outcome.matched == 0 {
        tracing::debug!(isbn = %isbn, "Update matched no book");
        if state.config.strict_not_found {
            return Err(ServerError::BookNotFound);
        }
    }

    Ok(StatusCode::OK.into_response())
}

/// Delete a book by ISBN
///
/// `DELETE /books/{isbn}` - 204 whether or not a book was removed, unless
/// `strict_not_found` is configured.
pub async fn delete_book(
    State(state): State<Arc<ServerState>>,
    Path(isbn): Path<String>,
) -> ServerResult<Response> {
    let outcome = state
        .store
        .delete_one(&BookFilter::isbn(isbn.as_str()))
        .await
        .map_err(store_failure("delete book"))?;

    if outcome.deleted == 0 {
        tracing::debug!(isbn = %isbn, "Delete matched no book");
        if state.config.strict_not_found {
            return Err(ServerError::BookNotFound);
        }
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_keeps_plain_isbn() {
        let location = book_location("/books", "978-0-13-110362-7").unwrap();
        assert_eq!(location, "/books/978-0-13-110362-7");
    }

    #[test]
    fn location_escapes_unsafe_isbn_characters() {
        assert_eq!(book_location("/books", "12\n3").unwrap(), "/books/12%0A3");
        assert_eq!(book_location("/books", "a/b c").unwrap(), "/books/a%2Fb%20c");
        assert_eq!(book_location("/books", "é").unwrap(), "/books/%C3%A9");
    }
}
