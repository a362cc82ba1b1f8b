use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key of a book.
pub type BookId = i64;

/// A persisted book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Assigned by the store on creation, never changes afterwards
    pub id: BookId,
    pub author: String,
    pub title: String,
    pub publisher: String,
}

/// Request model for creating a new book.
///
/// Absent fields deserialize to empty strings; no further validation applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub publisher: String,
}

impl NewBook {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            author: self.author,
            title: self.title,
            publisher: self.publisher,
        }
    }
}
