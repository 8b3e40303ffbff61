pub mod models;
pub mod routes;
pub mod service;
pub mod store;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{Database, InitCtx, Migration, Module};
use serde_json::json;

use service::CatalogService;

/// Books module: the catalog service and its `/api/books` routes
pub struct BooksModule {
    service: CatalogService,
}

impl BooksModule {
    pub fn new(service: CatalogService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ctx.db.backend(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let envelope = |data: serde_json::Value| {
            json!({
                "description": "Success envelope",
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "success": { "type": "boolean" },
                                "data": data
                            },
                            "required": ["success", "data"]
                        }
                    }
                }
            })
        };
        let failure = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let input_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);

        let text_prop = |description: &str| json!({ "type": "string", "description": description });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books, newest first",
                        "tags": ["Books"],
                        "responses": {
                            "200": envelope(json!({ "type": "array", "items": book_ref })),
                            "500": failure("Store error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": input_body,
                        "responses": {
                            "201": envelope(book_ref.clone()),
                            "400": failure("Validation error or duplicate ISBN")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": envelope(book_ref.clone()),
                            "404": failure("Book not found"),
                            "500": failure("Store error")
                        }
                    },
                    "put": {
                        "summary": "Update some fields of a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": input_body,
                        "responses": {
                            "200": envelope(book_ref.clone()),
                            "400": failure("Validation error or duplicate ISBN"),
                            "404": failure("Book not found"),
                            "500": failure("Store error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": envelope(book_ref.clone()),
                            "404": failure("Book not found"),
                            "500": failure("Store error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": text_prop("Store-assigned identifier"),
                            "title": text_prop("Title, 2-200 characters"),
                            "author": text_prop("Author, 2-100 characters"),
                            "description": text_prop("Up to 2000 characters"),
                            "genre": text_prop("Free-form genre"),
                            "price": { "type": "number", "minimum": 0 },
                            "isbn": text_prop("Unique when present"),
                            "stock": { "type": "integer", "minimum": 0 },
                            "coverImage": { "type": "string", "format": "uri" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "author", "price", "stock", "createdAt", "updatedAt"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "description": { "type": "string" },
                            "genre": { "type": "string" },
                            "price": { "type": "number" },
                            "isbn": { "type": "string" },
                            "stock": { "type": "integer" },
                            "coverImage": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: store::MIGRATION_001_INIT,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module backed by the store matching `db`
pub fn create_module(db: &Database) -> Arc<dyn Module> {
    let service = CatalogService::new(store::for_database(db));
    Arc::new(BooksModule::new(service))
}
