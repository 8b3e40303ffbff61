use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookFields, BookId, BookInput};
use crate::modules::books::validation;

#[derive(Default)]
struct Collection {
    books: HashMap<BookId, (u64, Book)>,
    next_seq: u64,
}

impl Collection {
    /// Fails when another book already holds `isbn`.
    fn claim_isbn(&self, isbn: Option<&str>, except: Option<&BookId>) -> Result<(), StoreError> {
        let Some(isbn) = isbn else {
            return Ok(());
        };
        let taken = self
            .books
            .iter()
            .any(|(id, (_, book))| Some(id) != except && book.isbn.as_deref() == Some(isbn));
        if taken {
            return Err(StoreError::Duplicate {
                field: "isbn",
                value: isbn.to_string(),
            });
        }
        Ok(())
    }
}

/// Process-local store. The write lock makes each write atomic, including
/// the merge of a partial update and the isbn uniqueness check.
#[derive(Default)]
pub struct MemoryBookStore {
    inner: RwLock<Collection>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&(u64, Book)> = inner.books.values().collect();
        entries.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });
        Ok(entries.into_iter().map(|(_, book)| book.clone()).collect())
    }

    async fn get(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.books.get(id).map(|(_, book)| book.clone()))
    }

    async fn insert(&self, fields: BookFields) -> Result<Book, StoreError> {
        let mut inner = self.inner.write().await;
        inner.claim_isbn(fields.isbn.as_deref(), None)?;

        let book = Book::new(fields);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.books.insert(book.id, (seq, book.clone()));
        Ok(book)
    }

    async fn update(&self, id: &BookId, changes: BookInput) -> Result<Option<Book>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some((_, existing)) = inner.books.get(id) else {
            return Ok(None);
        };

        let fields = validation::validate_changes(existing, changes)?;
        inner.claim_isbn(fields.isbn.as_deref(), Some(id))?;

        Ok(inner.books.get_mut(id).map(|(_, book)| {
            book.apply(fields);
            book.clone()
        }))
    }

    async fn delete(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.books.remove(id).map(|(_, book)| book))
    }
}
