pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::{InitCtx, Migration, Module};

use handlers::SharedStore;

/// Books module: CRUD endpoints over a single `books` table
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
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
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let message = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/MessageResponse" }
                    }
                }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);

        Some(json!({
            "paths": {
                "/create_books": {
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": message("Book has been added"),
                            "400": message("Store rejected the book"),
                            "422": message("Body is not a book")
                        }
                    }
                },
                "/get_books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookList" }
                                    }
                                }
                            },
                            "400": message("Books could not be fetched")
                        }
                    }
                },
                "/get_books/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookEnvelope" }
                                    }
                                }
                            },
                            "400": message("Missing id, unknown id or store failure")
                        }
                    }
                },
                "/delete_books/{id}": {
                    "delete": {
                        "summary": "Delete a book by id",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": message("Book has been deleted"),
                            "400": message("Missing id or store failure")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "author": { "type": "string" },
                            "title": { "type": "string" },
                            "publisher": { "type": "string" }
                        },
                        "required": ["id", "author", "title", "publisher"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "author": { "type": "string" },
                            "title": { "type": "string" },
                            "publisher": { "type": "string" }
                        }
                    },
                    "BookEnvelope": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "data": { "$ref": "#/components/schemas/Book" }
                        },
                        "required": ["message", "data"]
                    },
                    "BookList": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "data": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            }
                        },
                        "required": ["message", "data"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id        BIGSERIAL PRIMARY KEY,
                    author    TEXT NOT NULL DEFAULT '',
                    title     TEXT NOT NULL DEFAULT '',
                    publisher TEXT NOT NULL DEFAULT ''
                );
                "#,
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

/// Create a new instance of the books module backed by `store`
pub fn create_module(store: SharedStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
