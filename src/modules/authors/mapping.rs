//! Projections between stored books and their wire representations.

use uuid::Uuid;

use super::models::{Book, BookDto, BookForCreation, BookForUpdate};

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            author_id: book.author_id,
            title: book.title.clone(),
            description: book.description.clone(),
            links: Vec::new(),
        }
    }
}

impl From<&Book> for BookForUpdate {
    fn from(book: &Book) -> Self {
        Self {
            title: Some(book.title.clone()),
            description: Some(book.description.clone()),
        }
    }
}

impl BookForCreation {
    /// New entity without id or author; the repository fills both in.
    pub fn into_book(self) -> Book {
        Book {
            id: Uuid::nil(),
            author_id: Uuid::nil(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

impl BookForUpdate {
    /// New entity carrying the client-supplied id.
    pub fn into_book(self, id: Uuid) -> Book {
        Book {
            id,
            author_id: Uuid::nil(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }

    /// Overwrite the mutable fields of `book`; id and author are untouched.
    pub fn apply_to(self, book: &mut Book) {
        book.title = self.title.unwrap_or_default();
        book.description = self.description.unwrap_or_default();
    }
}
