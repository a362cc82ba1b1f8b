//! HTTP handlers for the books endpoints.
//!
//! Every store failure, including a missing row, is reported as 400 with a
//! fixed message; the underlying error is only logged.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::json;
use shelf_http::{ApiResponse, AppError};

use super::models::{Book, BookId, NewBook};
use super::store::BookStore;

/// Store handle shared by all handlers.
pub type SharedStore = Arc<dyn BookStore>;

const MISSING_ID: &str = "id should not be empty";

#[derive(Debug, Serialize)]
pub struct DeletedBook {
    pub id: BookId,
}

/// `POST /create_books`
pub async fn create_book(
    State(store): State<SharedStore>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(book) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "create book payload rejected");
        AppError::validation("Request fail")
    })?;

    let id = store.create(book).await.map_err(|err| {
        tracing::warn!(error = %err, "could not create book");
        AppError::bad_request("could not create a book")
    })?;

    tracing::info!(book_id = id, "book created");
    Ok(ApiResponse::message("book has been added"))
}

/// `GET /get_books`
pub async fn list_books(
    State(store): State<SharedStore>,
) -> Result<ApiResponse<Vec<Book>>, AppError> {
    match store.find_all().await {
        Ok(books) => Ok(ApiResponse::with_data("book fetch successfully", books)),
        Err(err) => {
            tracing::warn!(error = %err, "could not list books");
            Err(AppError::bad_request_with_data("could not get books", json!([])))
        }
    }
}

/// `GET /get_books/{id}`
pub async fn get_book(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<Book>, AppError> {
    const FAILURE: &str = "could not get the book";

    let id = parse_id(&raw_id, FAILURE)?;
    let book = store.find_by_id(id).await.map_err(|err| {
        tracing::warn!(book_id = id, error = %err, "could not get book");
        AppError::bad_request(FAILURE)
    })?;

    Ok(ApiResponse::with_data("book id fetch successfully", book))
}

/// `DELETE /delete_books/{id}`
pub async fn delete_book(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<DeletedBook>, AppError> {
    const FAILURE: &str = "could not delete book";

    let id = parse_id(&raw_id, FAILURE)?;
    store.delete_by_id(id).await.map_err(|err| {
        tracing::warn!(book_id = id, error = %err, "could not delete book");
        AppError::bad_request(FAILURE)
    })?;

    tracing::info!(book_id = id, "book deleted");
    Ok(ApiResponse::with_data("book has been deleted", DeletedBook { id }))
}

/// Blank ids are a missing identifier; anything that is not an integer is
/// rejected with the operation's failure message, as the database would.
fn parse_id(raw: &str, failure: &'static str) -> Result<BookId, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(MISSING_ID));
    }

    trimmed.parse::<BookId>().map_err(|err| {
        tracing::warn!(raw_id = %raw, error = %err, "book id is not an integer");
        AppError::bad_request(failure)
    })
}
