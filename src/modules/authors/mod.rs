//! Authors module: the book sub-resource owned by each author.

pub mod controller;
pub mod links;
pub mod mapping;
pub mod memory;
pub mod models;
pub mod patch;
pub mod repository;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use library_kernel::{mount_path, settings::Settings, InitCtx, Module};
use serde_json::json;

use controller::BookController;
use memory::InMemoryLibrary;

const MODULE_NAME: &str = "authors";

pub struct AuthorsModule {
    store: InMemoryLibrary,
    controller: Arc<BookController>,
}

impl AuthorsModule {
    /// Assemble the controller and its collaborators from `settings`.
    pub fn new(settings: &Settings) -> Self {
        let store = InMemoryLibrary::with_authors(settings.library.authors.iter().copied());
        let urls = links::route_table(&settings.server.public_url, &mount_path(MODULE_NAME));
        let controller = BookController::new(Arc::new(store.clone()), Arc::new(urls));

        Self {
            store,
            controller: Arc::new(controller),
        }
    }

    pub fn store(&self) -> &InMemoryLibrary {
        &self.store
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let authors = self.store.author_count().await;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            authors,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.controller.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let author_id = json!({
        "name": "authorId", "in": "path", "required": true,
        "schema": { "type": "string", "format": "uuid" }
    });
    let book_id = json!({
        "name": "bookId", "in": "path", "required": true,
        "schema": { "type": "string", "format": "uuid" }
    });
    let json_body = |schema: &str| {
        json!({
            "required": true,
            "content": {
                "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } }
            }
        })
    };

    json!({
        "paths": {
            "/{authorId}/books": {
                "get": {
                    "summary": "List books for an author",
                    "operationId": links::GET_BOOKS_FOR_AUTHOR,
                    "tags": ["Books"],
                    "parameters": [author_id],
                    "responses": {
                        "200": {
                            "description": "Books with collection links",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookCollection" }
                                }
                            }
                        },
                        "404": error_response("Author not found")
                    }
                },
                "post": {
                    "summary": "Create a book for an author",
                    "operationId": links::CREATE_BOOK_FOR_AUTHOR,
                    "tags": ["Books"],
                    "parameters": [author_id],
                    "requestBody": json_body("BookForCreation"),
                    "responses": {
                        "201": book_response("Book created"),
                        "400": error_response("Missing or unreadable body"),
                        "404": error_response("Author not found"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/{authorId}/books/{bookId}": {
                "get": {
                    "summary": "Get one book",
                    "operationId": links::GET_BOOK_FOR_AUTHOR,
                    "tags": ["Books"],
                    "parameters": [author_id, book_id],
                    "responses": {
                        "200": book_response("Book with links"),
                        "404": error_response("Author or book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book, creating it under the given id if absent",
                    "operationId": links::UPDATE_BOOK_FOR_AUTHOR,
                    "tags": ["Books"],
                    "parameters": [author_id, book_id],
                    "requestBody": json_body("BookForUpdate"),
                    "responses": {
                        "201": book_response("Book created with the supplied id"),
                        "204": { "description": "Book replaced" },
                        "400": error_response("Missing or unreadable body"),
                        "404": error_response("Author not found"),
                        "422": error_response("Validation error")
                    }
                },
                "patch": {
                    "summary": "Apply a JSON Patch, creating the book under the given id if absent",
                    "operationId": links::PARTIALLY_UPDATE_BOOK_FOR_AUTHOR,
                    "tags": ["Books"],
                    "parameters": [author_id, book_id],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json-patch+json": {
                                "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/PatchOperation" }
                                }
                            }
                        }
                    },
                    "responses": {
                        "201": book_response("Book created with the supplied id"),
                        "204": { "description": "Book patched" },
                        "400": error_response("Missing or malformed patch document"),
                        "404": error_response("Author not found"),
                        "422": error_response("Validation error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "operationId": links::DELETE_BOOK_FOR_AUTHOR,
                    "tags": ["Books"],
                    "parameters": [author_id, book_id],
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "404": error_response("Author or book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Link": {
                    "type": "object",
                    "properties": {
                        "href": { "type": "string", "format": "uri" },
                        "rel": { "type": "string" },
                        "method": { "type": "string" }
                    },
                    "required": ["href", "rel", "method"]
                },
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "authorId": { "type": "string", "format": "uuid" },
                        "title": { "type": "string", "maxLength": 100 },
                        "description": { "type": "string", "maxLength": 500 },
                        "links": { "type": "array", "items": { "$ref": "#/components/schemas/Link" } }
                    },
                    "required": ["id", "authorId", "title", "description", "links"]
                },
                "BookCollection": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } },
                        "links": { "type": "array", "items": { "$ref": "#/components/schemas/Link" } }
                    },
                    "required": ["value", "links"]
                },
                "BookForCreation": {
                    "type": "object",
                    "description": "Description must differ from title",
                    "properties": {
                        "title": { "type": "string", "maxLength": 100 },
                        "description": { "type": "string", "maxLength": 500 }
                    },
                    "required": ["title"],
                    "additionalProperties": false
                },
                "BookForUpdate": {
                    "type": "object",
                    "description": "Description must differ from title",
                    "properties": {
                        "title": { "type": "string", "maxLength": 100 },
                        "description": { "type": "string", "maxLength": 500 }
                    },
                    "required": ["title"],
                    "additionalProperties": false
                },
                "PatchOperation": {
                    "type": "object",
                    "properties": {
                        "op": {
                            "type": "string",
                            "enum": ["add", "remove", "replace", "move", "copy", "test"]
                        },
                        "path": { "type": "string" },
                        "from": { "type": "string" },
                        "value": {}
                    },
                    "required": ["op", "path"]
                }
            }
        }
    })
}

/// Create a new instance of the authors module
pub fn create_module(settings: &Settings) -> Arc<AuthorsModule> {
    Arc::new(AuthorsModule::new(settings))
}
