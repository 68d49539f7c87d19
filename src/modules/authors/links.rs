//! Named book routes and the hypermedia links derived from them.

use std::sync::Arc;

use axum::http::Method;
use library_http::links::{Link, RouteError, RouteTable, UrlBuilder};
use uuid::Uuid;

use super::models::{BookDto, LinkedCollection};

pub const BOOKS_PATH: &str = "/{author_id}/books";
pub const BOOK_PATH: &str = "/{author_id}/books/{book_id}";

pub const GET_BOOKS_FOR_AUTHOR: &str = "get_books_for_author";
pub const CREATE_BOOK_FOR_AUTHOR: &str = "create_book_for_author";
pub const GET_BOOK_FOR_AUTHOR: &str = "get_book_for_author";
pub const UPDATE_BOOK_FOR_AUTHOR: &str = "update_book_for_author";
pub const PARTIALLY_UPDATE_BOOK_FOR_AUTHOR: &str = "partially_update_book_for_author";
pub const DELETE_BOOK_FOR_AUTHOR: &str = "delete_book_for_author";

/// Route table for every book route under `mount_path`.
pub fn route_table(public_url: &str, mount_path: &str) -> RouteTable {
    RouteTable::new(public_url, mount_path)
        .with_route(GET_BOOKS_FOR_AUTHOR, BOOKS_PATH)
        .with_route(CREATE_BOOK_FOR_AUTHOR, BOOKS_PATH)
        .with_route(GET_BOOK_FOR_AUTHOR, BOOK_PATH)
        .with_route(UPDATE_BOOK_FOR_AUTHOR, BOOK_PATH)
        .with_route(PARTIALLY_UPDATE_BOOK_FOR_AUTHOR, BOOK_PATH)
        .with_route(DELETE_BOOK_FOR_AUTHOR, BOOK_PATH)
}

pub struct LinkBuilder {
    urls: Arc<dyn UrlBuilder>,
}

impl LinkBuilder {
    pub fn new(urls: Arc<dyn UrlBuilder>) -> Self {
        Self { urls }
    }

    /// URL of the single-book resource
    pub fn book_location(&self, author_id: Uuid, book_id: Uuid) -> Result<String, RouteError> {
        self.urls
            .link(GET_BOOK_FOR_AUTHOR, &book_params(author_id, book_id))
    }

    /// Replace the book's links with self, delete, update and partial update.
    pub fn for_book(&self, mut book: BookDto) -> Result<BookDto, RouteError> {
        let params = book_params(book.author_id, book.id);
        book.links = vec![
            Link::new(
                self.urls.link(GET_BOOK_FOR_AUTHOR, &params)?,
                "self",
                &Method::GET,
            ),
            Link::new(
                self.urls.link(DELETE_BOOK_FOR_AUTHOR, &params)?,
                "delete_book",
                &Method::DELETE,
            ),
            Link::new(
                self.urls.link(UPDATE_BOOK_FOR_AUTHOR, &params)?,
                "update_book",
                &Method::PUT,
            ),
            Link::new(
                self.urls.link(PARTIALLY_UPDATE_BOOK_FOR_AUTHOR, &params)?,
                "partially_update_book",
                &Method::PATCH,
            ),
        ];
        Ok(book)
    }

    /// Decorate every book and wrap them with the collection's self link.
    pub fn for_books(
        &self,
        author_id: Uuid,
        books: Vec<BookDto>,
    ) -> Result<LinkedCollection<BookDto>, RouteError> {
        let value = books
            .into_iter()
            .map(|book| self.for_book(book))
            .collect::<Result<Vec<_>, _>>()?;
        let self_link = self
            .urls
            .link(GET_BOOKS_FOR_AUTHOR, &[("author_id", author_id.to_string())])?;

        Ok(LinkedCollection {
            value,
            links: vec![Link::new(self_link, "self", &Method::GET)],
        })
    }
}

fn book_params(author_id: Uuid, book_id: Uuid) -> [(&'static str, String); 2] {
    [
        ("author_id", author_id.to_string()),
        ("book_id", book_id.to_string()),
    ]
}
