//! Persistence seam for the books module.

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;

use async_trait::async_trait;

use super::models::{Book, BookId, NewBook};

mod memory;
mod postgres;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD operations the HTTP handlers need from a backing store.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Inserts the book and returns the id the store assigned to it
    async fn create(&self, book: NewBook) -> Result<BookId, StoreError>;
    /// All books ordered by id
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;
    /// Fails with [`StoreError::NotFound`] when no book has this id
    async fn find_by_id(&self, id: BookId) -> Result<Book, StoreError>;
    /// Removes the book; deleting an absent id is not an error
    async fn delete_by_id(&self, id: BookId) -> Result<(), StoreError>;
}
