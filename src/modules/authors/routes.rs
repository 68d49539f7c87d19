//! HTTP handlers for the book sub-resource.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use library_http::{error::AppError, extract::Path};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::controller::{BookController, Saved};
use super::links::{BOOKS_PATH, BOOK_PATH};
use super::models::{BookDto, BookForCreation, BookForUpdate, LinkedCollection};

pub fn router(controller: Arc<BookController>) -> Router {
    Router::new()
        .route(BOOKS_PATH, get(list_books).post(create_book))
        .route(
            BOOK_PATH,
            get(get_book)
                .put(update_book)
                .patch(partially_update_book)
                .delete(delete_book),
        )
        .with_state(controller)
}

impl IntoResponse for Saved {
    fn into_response(self) -> Response {
        match self {
            Saved::Created { location, book } => {
                (StatusCode::CREATED, [(header::LOCATION, location)], Json(book)).into_response()
            }
            Saved::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Empty, `null`, and unparseable bodies all count as an absent payload.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Option<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Option<T>>(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "request body rejected");
            None
        }
    }
}

async fn list_books(
    State(controller): State<Arc<BookController>>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<LinkedCollection<BookDto>>, AppError> {
    Ok(Json(controller.list_for_author(author_id).await?))
}

async fn get_book(
    State(controller): State<Arc<BookController>>,
    Path((author_id, book_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BookDto>, AppError> {
    Ok(Json(controller.get_one(author_id, book_id).await?))
}

async fn create_book(
    State(controller): State<Arc<BookController>>,
    Path(author_id): Path<Uuid>,
    body: Bytes,
) -> Result<Saved, AppError> {
    let payload = parse_body::<BookForCreation>(&body);
    Ok(controller.create(author_id, payload).await?)
}

async fn update_book(
    State(controller): State<Arc<BookController>>,
    Path((author_id, book_id)): Path<(Uuid, Uuid)>,
    body: Bytes,
) -> Result<Saved, AppError> {
    let payload = parse_body::<BookForUpdate>(&body);
    Ok(controller.replace(author_id, book_id, payload).await?)
}

async fn partially_update_book(
    State(controller): State<Arc<BookController>>,
    Path((author_id, book_id)): Path<(Uuid, Uuid)>,
    body: Bytes,
) -> Result<Saved, AppError> {
    let operations = parse_body::<serde_json::Value>(&body);
    Ok(controller
        .partially_update(author_id, book_id, operations)
        .await?)
}

async fn delete_book(
    State(controller): State<Arc<BookController>>,
    Path((author_id, book_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    controller.delete(author_id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_null_bodies_are_absent() {
        assert_eq!(parse_body::<BookForUpdate>(&Bytes::from_static(b"")), None);
        assert_eq!(parse_body::<BookForUpdate>(&Bytes::from_static(b"  \n")), None);
        assert_eq!(parse_body::<BookForUpdate>(&Bytes::from_static(b"null")), None);
    }

    #[test]
    fn unparseable_bodies_are_absent() {
        assert_eq!(parse_body::<BookForUpdate>(&Bytes::from_static(b"{oops")), None);
        assert_eq!(
            parse_body::<BookForUpdate>(&Bytes::from_static(br#"{"isbn": "1"}"#)),
            None
        );
    }

    #[test]
    fn camel_case_payload_is_parsed() {
        let parsed = parse_body::<BookForCreation>(&Bytes::from_static(
            br#"{"title": "Emma", "description": "Matchmaking"}"#,
        ));
        assert_eq!(
            parsed,
            Some(BookForCreation {
                title: Some("Emma".to_string()),
                description: Some("Matchmaking".to_string()),
            })
        );
    }
}
