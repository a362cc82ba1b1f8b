use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use shelf_app::books::models::{Book, BookId, NewBook};
use shelf_app::books::store::{BookStore, MemoryBookStore, StoreError};
use shelf_app::bootstrap::registry_with_store;
use shelf_kernel::settings::Settings;

/// Store whose every operation fails, to exercise the error paths.
struct BrokenStore;

#[async_trait]
impl BookStore for BrokenStore {
    async fn create(&self, _book: NewBook) -> Result<BookId, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_id(&self, _id: BookId) -> Result<Book, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn delete_by_id(&self, _id: BookId) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

fn app_with(store: Arc<dyn BookStore>) -> Router {
    let registry = registry_with_store(store);
    shelf_http::build_router(&registry, &Settings::default())
}

fn memory_app() -> (Router, Arc<MemoryBookStore>) {
    let store = Arc::new(MemoryBookStore::new());
    (app_with(store.clone()), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

const SAMPLE: &str = r#"{"author":"A. Author","title":"T","publisher":"P"}"#;

#[tokio::test]
async fn create_then_list_returns_the_new_book() {
    let (app, _) = memory_app();

    let (status, body) = send(&app, post_json("/api/create_books", SAMPLE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "book has been added"}));

    let (status, body) = send(&app, get("/api/get_books")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "book fetch successfully");
    assert_eq!(
        body["data"],
        json!([{"id": 1, "author": "A. Author", "title": "T", "publisher": "P"}])
    );
}

#[tokio::test]
async fn create_then_get_by_id_returns_matching_fields() {
    let (app, _) = memory_app();
    send(&app, post_json("/api/create_books", SAMPLE)).await;

    let (status, body) = send(&app, get("/api/get_books/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "book id fetch successfully",
            "data": {"id": 1, "author": "A. Author", "title": "T", "publisher": "P"}
        })
    );
}

#[tokio::test]
async fn create_accepts_missing_and_empty_fields() {
    let (app, store) = memory_app();

    let (status, _) = send(&app, post_json("/api/create_books", r#"{"author":""}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let book = store.find_by_id(1).await.unwrap();
    assert_eq!(book.author, "");
    assert_eq!(book.title, "");
}

#[tokio::test]
async fn malformed_body_is_unprocessable_and_not_persisted() {
    let (app, store) = memory_app();

    for body in ["not json", r#"{"author": 5}"#, ""] {
        let (status, response) = send(&app, post_json("/api/create_books", body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body {body:?}");
        assert_eq!(response, json!({"message": "Request fail"}));
    }

    assert!(store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_content_type_is_unprocessable() {
    let (app, _) = memory_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/create_books")
        .body(Body::from(SAMPLE))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"message": "Request fail"}));
}

#[tokio::test]
async fn unknown_id_is_a_failed_lookup() {
    let (app, _) = memory_app();

    let (status, body) = send(&app, get("/api/get_books/404")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not get the book"}));
}

#[tokio::test]
async fn non_integer_id_is_a_failed_lookup() {
    let (app, _) = memory_app();

    let (status, body) = send(&app, get("/api/get_books/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not get the book"}));

    let (status, body) = send(&app, delete("/api/delete_books/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not delete book"}));
}

#[tokio::test]
async fn blank_id_is_reported_as_missing_without_touching_the_store() {
    // BrokenStore would turn any store call into "could not ..." instead
    let app = app_with(Arc::new(BrokenStore));

    let (status, body) = send(&app, get("/api/get_books/%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "id should not be empty"}));

    let (status, body) = send(&app, delete("/api/delete_books/%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "id should not be empty"}));
}

#[tokio::test]
async fn delete_removes_the_book() {
    let (app, _) = memory_app();
    send(&app, post_json("/api/create_books", SAMPLE)).await;

    let (status, body) = send(&app, delete("/api/delete_books/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "book has been deleted", "data": {"id": 1}})
    );

    let (status, body) = send(&app, get("/api/get_books/1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not get the book"}));
}

#[tokio::test]
async fn store_failures_map_to_bad_request() {
    let app = app_with(Arc::new(BrokenStore));

    let (status, body) = send(&app, post_json("/api/create_books", SAMPLE)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not create a book"}));

    let (status, body) = send(&app, get("/api/get_books")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not get books", "data": []}));

    let (status, body) = send(&app, get("/api/get_books/1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not get the book"}));

    let (status, body) = send(&app, delete("/api/delete_books/1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "could not delete book"}));
}

#[tokio::test]
async fn wrong_method_and_unknown_paths_use_framework_defaults() {
    let (app, _) = memory_app();

    let (status, _) = send(&app, get("/api/create_books")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(&app, get("/api/books")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete("/api/delete_books")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_lists_book_routes() {
    let (app, _) = memory_app();

    let (status, body) = send(&app, get("/docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/create_books"]["post"].is_object());
    assert!(body["paths"]["/api/get_books/{id}"]["get"].is_object());
}

#[tokio::test]
async fn swagger_document_carries_book_routes() {
    let (app, _) = memory_app();

    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    for path in [
        "/api/create_books",
        "/api/get_books",
        "/api/get_books/{id}",
        "/api/delete_books/{id}",
    ] {
        assert!(body["paths"][path].is_object(), "missing {path}");
    }
    assert!(body["components"]["schemas"]["Book"].is_object());
}
