//! Book sub-resource operations: list, get, create, replace, patch, delete.

use std::sync::Arc;

use anyhow::anyhow;
use library_http::error::AppError;
use library_http::links::{RouteError, UrlBuilder};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::links::LinkBuilder;
use super::models::{Book, BookDto, BookForCreation, BookForUpdate, LinkedCollection};
use super::patch::{patch_candidate, DocumentPatcher, JsonPatcher, PatchRejection};
use super::repository::{LibraryRepository, LibraryStore};
use super::validation::{BookFields, FieldError, Validator};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("author {0} not found")]
    AuthorNotFound(Uuid),

    #[error("book {book_id} not found for author {author_id}")]
    BookNotFound { author_id: Uuid, book_id: Uuid },

    #[error("{0}")]
    BadRequest(String),

    #[error("book failed validation")]
    Validation(Vec<FieldError>),

    /// Commit or link resolution failure; never handled locally.
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl From<PatchRejection> for BookError {
    fn from(rejection: PatchRejection) -> Self {
        BookError::BadRequest(rejection.to_string())
    }
}

impl From<RouteError> for BookError {
    fn from(e: RouteError) -> Self {
        BookError::Fatal(anyhow!(e))
    }
}

impl From<BookError> for AppError {
    fn from(e: BookError) -> Self {
        match e {
            BookError::AuthorNotFound(_) | BookError::BookNotFound { .. } => {
                AppError::not_found(e.to_string())
            }
            BookError::BadRequest(message) => AppError::bad_request(message),
            BookError::Validation(errors) => AppError::validation(
                errors
                    .iter()
                    .filter_map(|error| serde_json::to_value(error).ok())
                    .collect(),
                "book failed validation",
            ),
            BookError::Fatal(e) => AppError::Internal(e),
        }
    }
}

/// Result of a mutation that either created the book or changed it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Created { location: String, book: BookDto },
    NoContent,
}

/// Whether the addressed book is already stored.
enum Target {
    Absent,
    Present(Book),
}

pub struct BookController {
    store: Arc<dyn LibraryStore>,
    validator: Validator,
    patcher: Arc<dyn DocumentPatcher>,
    links: LinkBuilder,
}

impl BookController {
    pub fn new(store: Arc<dyn LibraryStore>, urls: Arc<dyn UrlBuilder>) -> Self {
        Self {
            store,
            validator: Validator::book_rules(),
            patcher: Arc::new(JsonPatcher),
            links: LinkBuilder::new(urls),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_patcher(mut self, patcher: Arc<dyn DocumentPatcher>) -> Self {
        self.patcher = patcher;
        self
    }

    pub async fn list_for_author(
        &self,
        author_id: Uuid,
    ) -> Result<LinkedCollection<BookDto>, BookError> {
        let repo = self.store.unit_of_work();
        require_author(repo.as_ref(), author_id).await?;

        let books = repo
            .get_books_for_author(author_id)
            .await
            .iter()
            .map(BookDto::from)
            .collect();

        Ok(self.links.for_books(author_id, books)?)
    }

    pub async fn get_one(&self, author_id: Uuid, book_id: Uuid) -> Result<BookDto, BookError> {
        let repo = self.store.unit_of_work();
        require_author(repo.as_ref(), author_id).await?;

        match locate(repo.as_ref(), author_id, book_id).await {
            Target::Present(book) => Ok(self.links.for_book(BookDto::from(&book))?),
            Target::Absent => Err(BookError::BookNotFound { author_id, book_id }),
        }
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        payload: Option<BookForCreation>,
    ) -> Result<Saved, BookError> {
        let mut repo = self.store.unit_of_work();
        require_author(repo.as_ref(), author_id).await?;

        let payload = payload.ok_or_else(|| missing_payload("BookForCreation"))?;
        self.validate_candidate(&payload)?;

        let book = repo.add_book_for_author(author_id, payload.into_book());
        commit(repo.as_mut(), || {
            format!("Creating a book for author {author_id} failed on save.")
        })
        .await?;

        tracing::info!(%author_id, book_id = %book.id, "book created");
        self.created(&book)
    }

    /// Full replace; creates the book under `book_id` when it does not exist.
    pub async fn replace(
        &self,
        author_id: Uuid,
        book_id: Uuid,
        payload: Option<BookForUpdate>,
    ) -> Result<Saved, BookError> {
        let mut repo = self.store.unit_of_work();
        require_author(repo.as_ref(), author_id).await?;

        let payload = payload.ok_or_else(|| missing_payload("BookForUpdate"))?;
        self.validate_candidate(&payload)?;

        match locate(repo.as_ref(), author_id, book_id).await {
            Target::Absent => {
                let book = repo.add_book_for_author(author_id, payload.into_book(book_id));
                commit(repo.as_mut(), || {
                    format!("Upserting book {book_id} for author {author_id} failed on save.")
                })
                .await?;

                tracing::info!(%author_id, %book_id, "book created by replace");
                self.created(&book)
            }
            Target::Present(mut book) => {
                payload.apply_to(&mut book);
                repo.update_book_for_author(&book);
                commit(repo.as_mut(), || {
                    format!("Updating book {book_id} for author {author_id} failed on save.")
                })
                .await?;

                tracing::info!(%author_id, %book_id, "book replaced");
                Ok(Saved::NoContent)
            }
        }
    }

    /// Apply patch operations; an absent book is patched from an empty
    /// candidate and created under `book_id`.
    pub async fn partially_update(
        &self,
        author_id: Uuid,
        book_id: Uuid,
        operations: Option<Value>,
    ) -> Result<Saved, BookError> {
        let mut repo = self.store.unit_of_work();
        require_author(repo.as_ref(), author_id).await?;

        let operations = operations.ok_or_else(|| missing_payload("patch document"))?;

        match locate(repo.as_ref(), author_id, book_id).await {
            Target::Absent => {
                let candidate = self.patched(&BookForUpdate::default(), &operations)?;
                self.validate_candidate(&candidate)?;

                let book = repo.add_book_for_author(author_id, candidate.into_book(book_id));
                commit(repo.as_mut(), || {
                    format!("Upserting book {book_id} for author {author_id} failed on save.")
                })
                .await?;

                tracing::info!(%author_id, %book_id, "book created by patch");
                self.created(&book)
            }
            Target::Present(mut book) => {
                let candidate = self.patched(&BookForUpdate::from(&book), &operations)?;
                self.validate_candidate(&candidate)?;

                candidate.apply_to(&mut book);
                repo.update_book_for_author(&book);
                commit(repo.as_mut(), || {
                    format!("Patching book {book_id} for author {author_id} failed on save.")
                })
                .await?;

                tracing::info!(%author_id, %book_id, "book patched");
                Ok(Saved::NoContent)
            }
        }
    }

    pub async fn delete(&self, author_id: Uuid, book_id: Uuid) -> Result<(), BookError> {
        let mut repo = self.store.unit_of_work();
        require_author(repo.as_ref(), author_id).await?;

        let Target::Present(book) = locate(repo.as_ref(), author_id, book_id).await else {
            tracing::debug!(%author_id, %book_id, "book to delete not found");
            return Err(BookError::BookNotFound { author_id, book_id });
        };

        repo.delete_book(&book);
        commit(repo.as_mut(), || format!("Deleting book {book_id} failed on save."))
            .await?;

        tracing::info!(%author_id, %book_id, "book deleted");
        Ok(())
    }

    fn validate_candidate(&self, candidate: &dyn BookFields) -> Result<(), BookError> {
        self.validator.validate(candidate).map_err(|errors| {
            tracing::info!(
                payload = candidate.payload_name(),
                errors = errors.len(),
                "book rejected by validation"
            );
            BookError::Validation(errors)
        })
    }

    fn patched(
        &self,
        candidate: &BookForUpdate,
        operations: &Value,
    ) -> Result<BookForUpdate, BookError> {
        patch_candidate(self.patcher.as_ref(), candidate, operations).map_err(|rejection| {
            tracing::info!(error = %rejection, "patch document rejected");
            BookError::from(rejection)
        })
    }

    fn created(&self, book: &Book) -> Result<Saved, BookError> {
        let location = self.links.book_location(book.author_id, book.id)?;
        let book = self.links.for_book(BookDto::from(book))?;
        Ok(Saved::Created { location, book })
    }
}

async fn require_author(repo: &dyn LibraryRepository, author_id: Uuid) -> Result<(), BookError> {
    if repo.author_exists(author_id).await {
        Ok(())
    } else {
        tracing::debug!(%author_id, "author not found");
        Err(BookError::AuthorNotFound(author_id))
    }
}

async fn locate(repo: &dyn LibraryRepository, author_id: Uuid, book_id: Uuid) -> Target {
    match repo.get_book_for_author(author_id, book_id).await {
        Some(book) => Target::Present(book),
        None => Target::Absent,
    }
}

fn missing_payload(what: &str) -> BookError {
    BookError::BadRequest(format!("request body must be a valid {what}"))
}

/// Commit staged changes; a refused commit is fatal and never retried.
async fn commit(
    repo: &mut dyn LibraryRepository,
    failure: impl FnOnce() -> String,
) -> Result<(), BookError> {
    if repo.save().await {
        return Ok(());
    }
    let message = failure();
    tracing::error!(%message, "commit failed");
    Err(BookError::Fatal(anyhow!(message)))
}
