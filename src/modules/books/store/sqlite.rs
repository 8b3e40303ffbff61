use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookFields, BookId, BookInput};
use crate::modules::books::validation;

/// Books are kept as JSON documents; `isbn` and `created_seq` are lifted
/// into columns for the unique index and the listing order. SQLite never
/// considers two NULLs equal, so books without an isbn never collide.
pub const MIGRATION_001_INIT: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id          TEXT PRIMARY KEY NOT NULL,
        isbn        TEXT UNIQUE,
        created_seq INTEGER NOT NULL,
        document    TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS books_created_seq ON books (created_seq DESC);
"#;

pub struct SqliteBookStore {
    pool: SqlitePool,
}

impl SqliteBookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn created_seq(book: &Book) -> i64 {
    book.created_at.unix_timestamp_nanos() as i64
}

fn decode(document: &str) -> Result<Book, StoreError> {
    Ok(serde_json::from_str(document)?)
}

fn unique_violation(isbn: Option<String>) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate {
            field: "isbn",
            value: isbn.unwrap_or_default(),
        },
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT document FROM books ORDER BY created_seq DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(|(document,)| decode(document)).collect()
    }

    async fn get(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT document FROM books WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(document,)| decode(&document)).transpose()
    }

    async fn insert(&self, fields: BookFields) -> Result<Book, StoreError> {
        let book = Book::new(fields);

        sqlx::query("INSERT INTO books (id, isbn, created_seq, document) VALUES (?, ?, ?, ?)")
            .bind(book.id.to_string())
            .bind(book.isbn.clone())
            .bind(created_seq(&book))
            .bind(serde_json::to_string(&book)?)
            .execute(&self.pool)
            .await
            .map_err(unique_violation(book.isbn.clone()))?;

        tracing::debug!(target: "bookstore::store", id = %book.id, "inserted book");
        Ok(book)
    }

    async fn update(&self, id: &BookId, changes: BookInput) -> Result<Option<Book>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Writing first takes the database write lock, so no other writer
        // can commit between the read below and our update.
        let touched = sqlx::query("UPDATE books SET id = id WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        let row: Option<(String,)> = sqlx::query_as("SELECT document FROM books WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some((document,)) = row else {
            return Ok(None);
        };

        let mut book = decode(&document)?;
        let fields = validation::validate_changes(&book, changes)?;
        book.apply(fields);

        sqlx::query("UPDATE books SET isbn = ?, document = ? WHERE id = ?")
            .bind(book.isbn.clone())
            .bind(serde_json::to_string(&book)?)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(unique_violation(book.isbn.clone()))?;
        tx.commit().await?;

        tracing::debug!(target: "bookstore::store", id = %book.id, "updated book");
        Ok(Some(book))
    }

    async fn delete(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("DELETE FROM books WHERE id = ? RETURNING document")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(document,)| decode(&document)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_db::{Database, Migration};

    async fn store() -> SqliteBookStore {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        db.migrate(&[(
            "books".to_string(),
            Migration {
                id: "001_init",
                up: MIGRATION_001_INIT,
            },
        )])
        .await
        .unwrap();

        match db {
            Database::Sqlite(pool) => SqliteBookStore::new(pool),
            Database::Memory => unreachable!("sqlite url yields a sqlite pool"),
        }
    }

    fn fields(title: &str, isbn: Option<&str>) -> BookFields {
        BookFields {
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            description: Some("An anarchist utopia".to_string()),
            genre: Some("Science Fiction".to_string()),
            price: 12.5,
            isbn: isbn.map(str::to_string),
            stock: 3,
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn round_trips_documents() {
        let store = store().await;
        let book = store.insert(fields("The Dispossessed", None)).await.unwrap();

        assert_eq!(store.get(&book.id).await.unwrap(), Some(book.clone()));
        assert_eq!(store.list().await.unwrap(), vec![book]);
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = store().await;
        let first = store.insert(fields("A Wizard of Earthsea", None)).await.unwrap();
        let second = store.insert(fields("The Tombs of Atuan", None)).await.unwrap();

        let ids: Vec<BookId> = store.list().await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_reported_and_not_stored() {
        let store = store().await;
        store.insert(fields("The Lathe of Heaven", Some("X1"))).await.unwrap();
        store.insert(fields("No isbn", None)).await.unwrap();
        store.insert(fields("No isbn either", None)).await.unwrap();

        let err = store.insert(fields("Copy", Some("X1"))).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "isbn", .. }));
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_and_delete_missing_books() {
        let store = store().await;
        let missing = BookId::generate();

        let changes = BookInput {
            title: Some("Ghost".to_string()),
            ..BookInput::default()
        };
        assert!(store.update(&missing, changes).await.unwrap().is_none());
        assert!(store.delete(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_fields_and_keeps_creation_time() {
        let store = store().await;
        let book = store.insert(fields("Always Coming Home", None)).await.unwrap();

        let updated = store
            .update(&book.id, BookInput { stock: Some(5), ..BookInput::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.stock, 5);
        assert_eq!(updated.title, book.title);
        assert_eq!(updated.description, book.description);
        assert_eq!(updated.created_at, book.created_at);

        let deleted = store.delete(&book.id).await.unwrap();
        assert_eq!(deleted, Some(updated));
    }

    #[tokio::test]
    async fn update_may_keep_own_isbn_but_not_take_another() {
        let store = store().await;
        let lathe = store.insert(fields("The Lathe of Heaven", Some("X1"))).await.unwrap();
        let tehanu = store.insert(fields("Tehanu", None)).await.unwrap();

        let kept = store
            .update(
                &lathe.id,
                BookInput {
                    isbn: Some("X1".to_string()),
                    stock: Some(7),
                    ..BookInput::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.isbn.as_deref(), Some("X1"));
        assert_eq!(kept.stock, 7);

        let err = store
            .update(
                &tehanu.id,
                BookInput {
                    isbn: Some("X1".to_string()),
                    ..BookInput::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "isbn", ref value } if value == "X1"));
        assert_eq!(store.get(&tehanu.id).await.unwrap(), Some(tehanu));
    }

    #[tokio::test]
    async fn invalid_update_leaves_document_untouched() {
        let store = store().await;
        let book = store.insert(fields("Tehanu", None)).await.unwrap();

        let err = store
            .update(&book.id, BookInput { price: Some(-1.0), ..BookInput::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(store.get(&book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn concurrent_partial_updates_all_land() {
        let store = store().await;
        let book = store.insert(fields("Tehanu", None)).await.unwrap();

        let (stocked, priced) = tokio::join!(
            store.update(&book.id, BookInput { stock: Some(9), ..BookInput::default() }),
            store.update(&book.id, BookInput { price: Some(3.0), ..BookInput::default() }),
        );
        stocked.unwrap().unwrap();
        priced.unwrap().unwrap();

        let stored = store.get(&book.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 9);
        assert_eq!(stored.price, 3.0);
    }
}
