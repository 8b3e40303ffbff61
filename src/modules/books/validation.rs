//! Field constraints for books, checked before any write reaches the store.

use thiserror::Error;

use super::models::{Book, BookFields, BookInput};

/// First constraint a candidate book failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Description,
    Price,
    Stock,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Description => "description",
            Field::Price => "price",
            Field::Stock => "stock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Required,
    MinChars(usize),
    MaxChars(usize),
    AtLeast(f64),
}

#[derive(Debug, Clone, Copy)]
pub struct Constraint {
    pub field: Field,
    pub rule: Rule,
    pub message: &'static str,
}

const fn constraint(field: Field, rule: Rule, message: &'static str) -> Constraint {
    Constraint {
        field,
        rule,
        message,
    }
}

/// Checked in order; the first failure is reported.
pub const BOOK_CONSTRAINTS: &[Constraint] = &[
    constraint(Field::Title, Rule::Required, "Book title is required"),
    constraint(Field::Title, Rule::MinChars(2), "Title must be at least 2 characters"),
    constraint(Field::Title, Rule::MaxChars(200), "Title must be less than 200 characters"),
    constraint(Field::Author, Rule::Required, "Author name is required"),
    constraint(Field::Author, Rule::MinChars(2), "Author name must be at least 2 characters"),
    constraint(Field::Author, Rule::MaxChars(100), "Author name must be less than 100 characters"),
    constraint(
        Field::Description,
        Rule::MaxChars(2000),
        "Description must be less than 2000 characters",
    ),
    constraint(Field::Price, Rule::Required, "Price is required"),
    constraint(
        Field::Price,
        Rule::AtLeast(0.0),
        "Price must be greater than or equal to 0",
    ),
    constraint(Field::Stock, Rule::AtLeast(0.0), "Stock cannot be negative"),
];

enum Value<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
}

fn value_of(input: &BookInput, field: Field) -> Value<'_> {
    match field {
        Field::Title => Value::Text(input.title.as_deref()),
        Field::Author => Value::Text(input.author.as_deref()),
        Field::Description => Value::Text(input.description.as_deref()),
        Field::Price => Value::Number(input.price),
        Field::Stock => Value::Number(input.stock.map(|stock| stock as f64)),
    }
}

impl Constraint {
    /// Rules other than `Required` hold vacuously for absent values.
    pub fn holds(&self, input: &BookInput) -> bool {
        match (self.rule, value_of(input, self.field)) {
            (Rule::Required, Value::Text(text)) => text.is_some(),
            (Rule::Required, Value::Number(number)) => number.is_some(),
            (Rule::MinChars(min), Value::Text(Some(text))) => text.chars().count() >= min,
            (Rule::MaxChars(max), Value::Text(Some(text))) => text.chars().count() <= max,
            (Rule::AtLeast(min), Value::Number(Some(number))) => number.is_finite() && number >= min,
            _ => true,
        }
    }
}

/// Normalize a candidate and check it against [`BOOK_CONSTRAINTS`].
pub fn validate(candidate: BookInput) -> Result<BookFields, ValidationError> {
    let candidate = candidate.normalized();

    if let Some(failed) = BOOK_CONSTRAINTS.iter().find(|c| !c.holds(&candidate)) {
        return Err(ValidationError {
            field: failed.field.name(),
            message: failed.message,
        });
    }

    let BookInput {
        title: Some(title),
        author: Some(author),
        price: Some(price),
        description,
        genre,
        isbn,
        stock,
        cover_image,
    } = candidate
    else {
        return Err(ValidationError {
            field: "title",
            message: "Title, author, and price are required",
        });
    };

    Ok(BookFields {
        title,
        author,
        description,
        genre,
        price,
        isbn,
        stock: stock.unwrap_or(0),
        cover_image,
    })
}

/// Merge `changes` into `existing` and check the merged document.
pub fn validate_changes(existing: &Book, changes: BookInput) -> Result<BookFields, ValidationError> {
    validate(existing.to_input().merge(changes))
}
