use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookId, NewBook};

/// In-process [`BookStore`] for tests and database-less development runs.
///
/// Ids start at 1 and are never reused, even after deletion.
#[derive(Default)]
pub struct MemoryBookStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: BookId,
    books: BTreeMap<BookId, Book>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, book: NewBook) -> Result<BookId, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.books.insert(id, book.into_book(id));
        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.inner.read().await.books.values().cloned().collect())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Book, StoreError> {
        self.inner
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete_by_id(&self, id: BookId) -> Result<(), StoreError> {
        self.inner.write().await.books.remove(&id);
        Ok(())
    }
}
