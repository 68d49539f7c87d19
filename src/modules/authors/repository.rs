//! Storage contract the book controller depends on.

use async_trait::async_trait;
use uuid::Uuid;

use super::models::Book;

/// One unit of work against the library store.
///
/// Mutations are staged and only become visible to other units of work when
/// `save` returns `true`.
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn author_exists(&self, author_id: Uuid) -> bool;

    /// Books owned by the author, ordered by title then id
    async fn get_books_for_author(&self, author_id: Uuid) -> Vec<Book>;

    async fn get_book_for_author(&self, author_id: Uuid, book_id: Uuid) -> Option<Book>;

    /// Stage an insert. A nil id is replaced by a storage-generated one; the
    /// returned book is what will be stored.
    fn add_book_for_author(&mut self, author_id: Uuid, book: Book) -> Book;

    fn update_book_for_author(&mut self, book: &Book);

    fn delete_book(&mut self, book: &Book);

    /// Commit staged changes; `false` means nothing was committed.
    async fn save(&mut self) -> bool;
}

/// Hands out a fresh unit of work per request.
pub trait LibraryStore: Send + Sync {
    fn unit_of_work(&self) -> Box<dyn LibraryRepository>;
}
