use async_trait::async_trait;
use sqlx::PgPool;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookId, NewBook};

/// [`BookStore`] over the `books` table.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, book: NewBook) -> Result<BookId, StoreError> {
        let id: BookId = sqlx::query_scalar(
            "INSERT INTO books (author, title, publisher) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&book.author)
        .bind(&book.title)
        .bind(&book.publisher)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, author, title, publisher FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>("SELECT id, author, title, publisher FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete_by_id(&self, id: BookId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(book_id = id, "delete matched no rows");
        }
        Ok(())
    }
}
