//! Catalog service: the five book operations over an injected store.

use std::sync::Arc;

use bookstore_http::AppError;
use thiserror::Error;

use super::models::{Book, BookId, BookInput};
use super::store::{BookStore, StoreError};
use super::validation::{self, ValidationError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A book with ISBN {isbn} already exists")]
    Conflict { isbn: String },

    #[error("Book not found")]
    NotFound,

    /// `context` is the caller-facing message for the failed operation.
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CatalogError {
    fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| CatalogError::Store { context, source }
    }

    /// Like [`Self::store`], but constraint and uniqueness failures keep
    /// their own meaning.
    fn write(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::Invalid(err) => CatalogError::Validation(err),
            StoreError::Duplicate { value, .. } => CatalogError::Conflict { isbn: value },
            other => CatalogError::Store {
                context,
                source: other,
            },
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(err) => AppError::validation(Some(err.field), err.message),
            CatalogError::Conflict { .. } => AppError::conflict(err.to_string()),
            CatalogError::NotFound => AppError::not_found(err.to_string()),
            CatalogError::Store { context, source } => AppError::internal(context, source),
        }
    }
}

/// Handles are cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Every book, newest first.
    pub async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        self.store
            .list()
            .await
            .map_err(CatalogError::store("Server error while fetching books"))
    }

    /// A malformed id is reported exactly like a missing one.
    pub async fn get(&self, id: &str) -> Result<Book, CatalogError> {
        let id = BookId::parse(id).ok_or(CatalogError::NotFound)?;
        self.store
            .get(&id)
            .await
            .map_err(CatalogError::store("Server error while fetching book"))?
            .ok_or(CatalogError::NotFound)
    }

    pub async fn create(&self, input: BookInput) -> Result<Book, CatalogError> {
        let fields = validation::validate(input)?;

        let book = self
            .store
            .insert(fields)
            .await
            .map_err(CatalogError::write("Server error while creating book"))?;

        tracing::info!(target: "bookstore::catalog", id = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    /// Merge the supplied fields into the stored book. The store merges,
    /// validates and writes the document as one atomic step.
    pub async fn update(&self, id: &str, changes: BookInput) -> Result<Book, CatalogError> {
        let id = BookId::parse(id).ok_or(CatalogError::NotFound)?;
        let book = self
            .store
            .update(&id, changes)
            .await
            .map_err(CatalogError::write("Server error while updating book"))?
            .ok_or(CatalogError::NotFound)?;

        tracing::info!(target: "bookstore::catalog", id = %book.id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> Result<Book, CatalogError> {
        let id = BookId::parse(id).ok_or(CatalogError::NotFound)?;
        let book = self
            .store
            .delete(&id)
            .await
            .map_err(CatalogError::store("Server error while deleting book"))?
            .ok_or(CatalogError::NotFound)?;

        tracing::info!(target: "bookstore::catalog", id = %book.id, "book deleted");
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::MemoryBookStore;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryBookStore::new()))
    }

    fn dune() -> BookInput {
        BookInput {
            title: Some("Dune".to_string()),
            author: Some("Herbert".to_string()),
            price: Some(9.99),
            ..BookInput::default()
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_submitted_fields() {
        let service = service();
        let input = BookInput {
            description: Some("Spice".to_string()),
            genre: Some("Science Fiction".to_string()),
            isbn: Some("978-0441013593".to_string()),
            stock: Some(4),
            cover_image: Some("https://example.com/dune.jpg".to_string()),
            ..dune()
        };

        let created = service.create(input.clone()).await.unwrap();
        let fetched = service.get(&created.id.to_string()).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.to_input(), input);
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let service = service();
        let cases = [
            BookInput { title: Some("D".to_string()), ..dune() },
            BookInput { author: Some("H".to_string()), ..dune() },
            BookInput { price: Some(-0.01), ..dune() },
        ];

        for input in cases {
            let err = service.create(input).await.unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)), "{err:?}");
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_isbn_is_a_conflict() {
        let service = service();
        let input = BookInput {
            isbn: Some("978-0441013593".to_string()),
            ..dune()
        };

        service.create(input.clone()).await.unwrap();
        let err = service.create(input).await.unwrap_err();

        assert_eq!(err.to_string(), "A book with ISBN 978-0441013593 already exists");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_stock_changes_only_stock_and_updated_at() {
        let service = service();
        let created = service
            .create(BookInput {
                genre: Some("Science Fiction".to_string()),
                ..dune()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id.to_string(),
                BookInput {
                    stock: Some(5),
                    ..BookInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.stock, 5);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(
            Book {
                stock: created.stock,
                updated_at: created.updated_at,
                ..updated.clone()
            },
            created
        );
    }

    #[tokio::test]
    async fn update_validates_supplied_fields() {
        let service = service();
        let created = service.create(dune()).await.unwrap();

        let err = service
            .update(
                &created.id.to_string(),
                BookInput {
                    title: Some("D".to_string()),
                    ..BookInput::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Title must be at least 2 characters");
        assert_eq!(service.get(&created.id.to_string()).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_with_blank_optional_field_clears_it() {
        let service = service();
        let created = service
            .create(BookInput {
                genre: Some("Science Fiction".to_string()),
                ..dune()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id.to_string(),
                BookInput {
                    genre: Some(String::new()),
                    ..BookInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.genre, None);
    }

    #[tokio::test]
    async fn update_to_taken_isbn_is_a_conflict() {
        let service = service();
        let first = service
            .create(BookInput {
                isbn: Some("978-0441013593".to_string()),
                ..dune()
            })
            .await
            .unwrap();
        let second = service
            .create(BookInput {
                title: Some("Dune Messiah".to_string()),
                ..dune()
            })
            .await
            .unwrap();

        let err = service
            .update(
                &second.id.to_string(),
                BookInput {
                    isbn: Some("978-0441013593".to_string()),
                    ..BookInput::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "A book with ISBN 978-0441013593 already exists");
        assert_eq!(service.get(&second.id.to_string()).await.unwrap(), second);

        let kept = service
            .update(
                &first.id.to_string(),
                BookInput {
                    isbn: Some("978-0441013593".to_string()),
                    stock: Some(2),
                    ..BookInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.isbn.as_deref(), Some("978-0441013593"));
        assert_eq!(kept.stock, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_partial_updates_keep_both_changes() {
        let service = service();
        let created = service.create(dune()).await.unwrap();
        let id = created.id.to_string();

        let (stocked, priced) = tokio::join!(
            service.update(
                &id,
                BookInput {
                    stock: Some(5),
                    ..BookInput::default()
                }
            ),
            service.update(
                &id,
                BookInput {
                    price: Some(3.0),
                    ..BookInput::default()
                }
            ),
        );
        stocked.unwrap();
        priced.unwrap();

        let stored = service.get(&id).await.unwrap();
        assert_eq!(stored.stock, 5);
        assert_eq!(stored.price, 3.0);
    }

    #[tokio::test]
    async fn missing_and_malformed_ids_are_not_found() {
        let service = service();
        let created = service.create(dune()).await.unwrap();
        let id = created.id.to_string();

        service.delete(&id).await.unwrap();
        assert!(matches!(service.delete(&id).await, Err(CatalogError::NotFound)));
        assert!(matches!(service.get(&id).await, Err(CatalogError::NotFound)));
        assert!(matches!(
            service.update(&id, dune()).await,
            Err(CatalogError::NotFound)
        ));

        for malformed in ["", "not-an-id", "64b7f0c2e4b0a1a2b3c4d5e6"] {
            assert!(matches!(service.get(malformed).await, Err(CatalogError::NotFound)));
            assert!(matches!(service.delete(malformed).await, Err(CatalogError::NotFound)));
        }
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let service = service();
        let mut last = None;
        for n in 0..5 {
            let book = service
                .create(BookInput {
                    title: Some(format!("Volume {n}")),
                    ..dune()
                })
                .await
                .unwrap();
            last = Some(book.id);
        }

        let books = service.list().await.unwrap();
        assert_eq!(books.len(), 5);
        assert_eq!(Some(books[0].id), last);
        assert!(books.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn errors_map_to_envelope_statuses() {
        use axum::http::StatusCode;

        let validation = AppError::from(CatalogError::Validation(ValidationError {
            field: "price",
            message: "Price is required",
        }));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(CatalogError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(CatalogError::Conflict { isbn: "X".to_string() }).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
