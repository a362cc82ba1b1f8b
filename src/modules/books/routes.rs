use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{self, SharedStore};

/// Book routes relative to the `/api` prefix.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/create_books", post(handlers::create_book))
        .route("/get_books", get(handlers::list_books))
        .route("/get_books/{id}", get(handlers::get_book))
        .route("/delete_books/{id}", delete(handlers::delete_book))
        .with_state(store)
}
