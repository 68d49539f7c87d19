//! In-memory library store.
//!
//! Each unit of work stages its mutations locally and applies them in one
//! step on `save`. There is no version check, so concurrent writers to the
//! same book resolve as last commit wins.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
#[cfg(test)]
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::Book;
use super::repository::{LibraryRepository, LibraryStore};

/// A change staged by a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add(Book),
    Update(Book),
    Delete(Uuid),
}

#[derive(Debug, Default)]
struct LibraryState {
    authors: HashSet<Uuid>,
    books: Vec<Book>,
}

#[derive(Clone, Default)]
pub struct InMemoryLibrary {
    state: Arc<RwLock<LibraryState>>,
    #[cfg(test)]
    journal: Arc<Mutex<Vec<Mutation>>>,
    fail_commits: Arc<AtomicBool>,
}

impl InMemoryLibrary {
    pub fn with_authors(authors: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            state: Arc::new(RwLock::new(LibraryState {
                authors: authors.into_iter().collect(),
                books: Vec::new(),
            })),
            ..Self::default()
        }
    }

    pub async fn add_author(&self, author_id: Uuid) {
        self.state.write().await.authors.insert(author_id);
    }

    pub async fn author_count(&self) -> usize {
        self.state.read().await.authors.len()
    }

    /// Make every subsequent `save` fail until switched back.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Every mutation staged through any unit of work, in staging order.
    #[cfg(test)]
    pub fn journal(&self) -> Vec<Mutation> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(test)]
    fn record(&self, mutation: &Mutation) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mutation.clone());
    }
}

impl LibraryStore for InMemoryLibrary {
    fn unit_of_work(&self) -> Box<dyn LibraryRepository> {
        Box::new(InMemoryUnitOfWork {
            store: self.clone(),
            staged: Vec::new(),
        })
    }
}

struct InMemoryUnitOfWork {
    store: InMemoryLibrary,
    staged: Vec<Mutation>,
}

impl InMemoryUnitOfWork {
    fn stage(&mut self, mutation: Mutation) {
        #[cfg(test)]
        self.store.record(&mutation);
        self.staged.push(mutation);
    }
}

/// Apply `staged` to a copy of `books`; `None` if any change does not fit.
fn apply_staged(state: &LibraryState, staged: Vec<Mutation>) -> Option<Vec<Book>> {
    let mut books = state.books.clone();
    for mutation in staged {
        match mutation {
            Mutation::Add(book) => {
                if !state.authors.contains(&book.author_id) || books.iter().any(|b| b.id == book.id)
                {
                    return None;
                }
                books.push(book);
            }
            Mutation::Update(book) => {
                let existing = books
                    .iter_mut()
                    .find(|b| b.id == book.id && b.author_id == book.author_id)?;
                *existing = book;
            }
            Mutation::Delete(book_id) => {
                let position = books.iter().position(|b| b.id == book_id)?;
                books.remove(position);
            }
        }
    }
    Some(books)
}

#[async_trait]
impl LibraryRepository for InMemoryUnitOfWork {
    async fn author_exists(&self, author_id: Uuid) -> bool {
        self.store.state.read().await.authors.contains(&author_id)
    }

    async fn get_books_for_author(&self, author_id: Uuid) -> Vec<Book> {
        let state = self.store.state.read().await;
        let mut books: Vec<Book> = state
            .books
            .iter()
            .filter(|b| b.author_id == author_id)
            .cloned()
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        books
    }

    async fn get_book_for_author(&self, author_id: Uuid, book_id: Uuid) -> Option<Book> {
        self.store
            .state
            .read()
            .await
            .books
            .iter()
            .find(|b| b.author_id == author_id && b.id == book_id)
            .cloned()
    }

    fn add_book_for_author(&mut self, author_id: Uuid, mut book: Book) -> Book {
        if book.id.is_nil() {
            book.id = Uuid::now_v7();
        }
        book.author_id = author_id;
        self.stage(Mutation::Add(book.clone()));
        book
    }

    fn update_book_for_author(&mut self, book: &Book) {
        self.stage(Mutation::Update(book.clone()));
    }

    fn delete_book(&mut self, book: &Book) {
        self.stage(Mutation::Delete(book.id));
    }

    async fn save(&mut self) -> bool {
        let staged = std::mem::take(&mut self.staged);
        if self.store.fail_commits.load(Ordering::SeqCst) {
            tracing::warn!(staged = staged.len(), "commit rejected by store");
            return false;
        }

        let mut state = self.store.state.write().await;
        match apply_staged(&state, staged) {
            Some(books) => {
                state.books = books;
                true
            }
            None => false,
        }
    }
}
