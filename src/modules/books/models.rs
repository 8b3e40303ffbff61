use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Store-assigned identifier of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    /// Fresh time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse an id from a path segment; anything malformed is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A stored catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// New record with a generated id and both timestamps set to now.
    pub fn new(fields: BookFields) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: BookId::generate(),
            title: fields.title,
            author: fields.author,
            description: fields.description,
            genre: fields.genre,
            price: fields.price,
            isbn: fields.isbn,
            stock: fields.stock,
            cover_image: fields.cover_image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field and refresh `updated_at`.
    pub fn apply(&mut self, fields: BookFields) {
        self.title = fields.title;
        self.author = fields.author;
        self.description = fields.description;
        self.genre = fields.genre;
        self.price = fields.price;
        self.isbn = fields.isbn;
        self.stock = fields.stock;
        self.cover_image = fields.cover_image;
        self.updated_at = OffsetDateTime::now_utc();
    }

    /// `"{title} by {author}"`
    pub fn full_title(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }

    /// The editable fields as a complete input, the base for partial updates.
    pub fn to_input(&self) -> BookInput {
        BookInput {
            title: Some(self.title.clone()),
            author: Some(self.author.clone()),
            description: self.description.clone(),
            genre: self.genre.clone(),
            price: Some(self.price),
            isbn: self.isbn.clone(),
            stock: Some(self.stock),
            cover_image: self.cover_image.clone(),
        }
    }
}

/// Editable fields that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub price: f64,
    pub isbn: Option<String>,
    pub stock: i64,
    pub cover_image: Option<String>,
}

/// Request body for create and update. Every field is optional on the wire;
/// the constraint table decides what is actually required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl BookInput {
    /// Overlay the supplied fields of `changes` onto `self`.
    pub fn merge(mut self, changes: BookInput) -> Self {
        fn take<T>(slot: &mut Option<T>, change: Option<T>) {
            if change.is_some() {
                *slot = change;
            }
        }

        take(&mut self.title, changes.title);
        take(&mut self.author, changes.author);
        take(&mut self.description, changes.description);
        take(&mut self.genre, changes.genre);
        take(&mut self.price, changes.price);
        take(&mut self.isbn, changes.isbn);
        take(&mut self.stock, changes.stock);
        take(&mut self.cover_image, changes.cover_image);
        self
    }

    /// Trim every text field; blank text becomes absent.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        }

        Self {
            title: clean(self.title),
            author: clean(self.author),
            description: clean(self.description),
            genre: clean(self.genre),
            price: self.price,
            isbn: clean(self.isbn),
            stock: self.stock,
            cover_image: clean(self.cover_image),
        }
    }
}
