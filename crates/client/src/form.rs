//! Add/edit form state.

use bookstore_app::{Book, BookId, BookInput};
use tracing::debug;

use crate::api::CatalogApi;
use crate::error::{ClientError, Result};

/// Editable fields of a [`Draft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Author,
    Description,
    Genre,
    Price,
    Isbn,
    Stock,
    CoverImage,
}

impl DraftField {
    pub const ALL: [DraftField; 8] = [
        DraftField::Title,
        DraftField::Author,
        DraftField::Description,
        DraftField::Genre,
        DraftField::Price,
        DraftField::Isbn,
        DraftField::Stock,
        DraftField::CoverImage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Title => "Title *",
            DraftField::Author => "Author *",
            DraftField::Description => "Description",
            DraftField::Genre => "Genre",
            DraftField::Price => "Price *",
            DraftField::Isbn => "ISBN",
            DraftField::Stock => "Stock",
            DraftField::CoverImage => "Cover Image URL",
        }
    }
}

/// The form's text copy of a book, unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub price: String,
    pub isbn: String,
    pub stock: String,
    pub cover_image: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            description: String::new(),
            genre: String::new(),
            price: String::new(),
            isbn: String::new(),
            stock: "0".to_string(),
            cover_image: String::new(),
        }
    }
}

impl From<&Book> for Draft {
    fn from(book: &Book) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: text(&book.description),
            genre: text(&book.genre),
            price: book.price.to_string(),
            isbn: text(&book.isbn),
            stock: book.stock.to_string(),
            cover_image: text(&book.cover_image),
        }
    }
}

impl Draft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Author => &self.author,
            DraftField::Description => &self.description,
            DraftField::Genre => &self.genre,
            DraftField::Price => &self.price,
            DraftField::Isbn => &self.isbn,
            DraftField::Stock => &self.stock,
            DraftField::CoverImage => &self.cover_image,
        }
    }

    fn slot(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Title => &mut self.title,
            DraftField::Author => &mut self.author,
            DraftField::Description => &mut self.description,
            DraftField::Genre => &mut self.genre,
            DraftField::Price => &mut self.price,
            DraftField::Isbn => &mut self.isbn,
            DraftField::Stock => &mut self.stock,
            DraftField::CoverImage => &mut self.cover_image,
        }
    }

    /// Client-side check and conversion to a request body.
    ///
    /// Optional text is always sent, so a blank field clears the stored
    /// value on update. Blank or unparsable stock becomes 0.
    pub fn to_input(&self) -> Result<BookInput> {
        if self.title.trim().is_empty() || self.author.trim().is_empty() || self.price.trim().is_empty()
        {
            return Err(ClientError::Invalid(
                "Title, author, and price are required".to_string(),
            ));
        }

        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| ClientError::Invalid("Price must be a number".to_string()))?;
        let stock = self.stock.trim().parse::<i64>().unwrap_or(0);

        Ok(BookInput {
            title: Some(self.title.trim().to_string()),
            author: Some(self.author.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            genre: Some(self.genre.trim().to_string()),
            price: Some(price),
            isbn: Some(self.isbn.trim().to_string()),
            stock: Some(stock),
            cover_image: Some(self.cover_image.trim().to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(BookId),
}

/// A request the form is waiting on.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(BookInput),
    Update(BookId, BookInput),
}

impl Submission {
    pub async fn send(self, api: &dyn CatalogApi) -> Result<Book> {
        match self {
            Submission::Create(input) => api.create_book(&input).await,
            Submission::Update(id, changes) => api.update_book(&id.to_string(), &changes).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormView {
    mode: FormMode,
    draft: Draft,
    error: Option<String>,
    success: bool,
    in_flight: bool,
}

impl FormView {
    /// Empty form for a new book.
    pub fn create() -> Self {
        Self::with(FormMode::Create, Draft::default())
    }

    /// Form pre-filled from `book`.
    pub fn edit(book: &Book) -> Self {
        Self::with(FormMode::Edit(book.id), Draft::from(book))
    }

    fn with(mode: FormMode, draft: Draft) -> Self {
        Self {
            mode,
            draft,
            error: None,
            success: false,
            in_flight: false,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn success_message(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Book added successfully!",
            FormMode::Edit(_) => "Book updated successfully!",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.mode, self.in_flight) {
            (_, true) => "Saving...",
            (FormMode::Create, false) => "Add Book",
            (FormMode::Edit(_), false) => "Update Book",
        }
    }

    /// Edit one field; clears any previous outcome.
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        *self.draft.slot(field) = value.into();
        self.error = None;
        self.success = false;
    }

    /// Start a submit. `None` while a request is already in flight or when
    /// the draft fails the client-side check (the error is recorded).
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.in_flight {
            debug!("submit ignored, request in flight");
            return None;
        }
        self.error = None;
        self.success = false;

        match self.draft.to_input() {
            Ok(input) => {
                self.in_flight = true;
                Some(match self.mode {
                    FormMode::Create => Submission::Create(input),
                    FormMode::Edit(id) => Submission::Update(id, input),
                })
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Record the outcome of the request started by [`Self::begin_submit`].
    pub fn finish_submit(&mut self, outcome: Result<Book>) -> Option<Book> {
        self.in_flight = false;
        match outcome {
            Ok(book) => {
                self.success = true;
                match self.mode {
                    FormMode::Create => self.draft = Draft::default(),
                    FormMode::Edit(_) => self.draft = Draft::from(&book),
                }
                Some(book)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Validate, send and record the outcome. Returns the saved book.
    pub async fn submit(&mut self, api: &dyn CatalogApi) -> Option<Book> {
        let submission = self.begin_submit()?;
        let outcome = submission.send(api).await;
        self.finish_submit(outcome)
    }
}
