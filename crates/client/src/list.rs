//! Catalog list screen: loading state, overlays and the refresh cycle.

use bookstore_app::{Book, BookId};
use tracing::{debug, info};

use crate::api::CatalogApi;
use crate::form::FormView;
use crate::modal::{ConfirmModal, Key, Modal, ModalAction};
use crate::toast::Toasts;

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Loaded(Vec<Book>),
    Errored(String),
}

/// What is shown on top of the list.
#[derive(Debug, Clone)]
pub enum Overlay {
    Closed,
    Form { modal: Modal, form: FormView },
    ConfirmDelete { book: Book, confirm: ConfirmModal },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    Mounted,
    /// Result of the fetch issued under `token`.
    Loaded { token: u64, books: Vec<Book> },
    LoadFailed { token: u64, message: String },
    AddRequested,
    EditRequested(BookId),
    DeleteRequested(BookId),
    DeleteConfirmed,
    Deleted(Book),
    DeleteFailed(String),
    FormCompleted(Book),
    OverlayClosed,
    KeyPressed(Key),
    OverlayClicked,
    ConfirmClicked,
    CancelClicked,
}

/// Work the view asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    /// Fetch the list; the result must be reported with the same token.
    FetchBooks { token: u64 },
    DeleteBook(BookId),
}

/// One rendered book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCard {
    pub id: BookId,
    pub title: String,
    pub byline: String,
    pub genre: String,
    pub price: String,
    pub stock: String,
    pub cover: String,
}

impl From<&Book> for BookCard {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            byline: format!("by {}", book.author),
            genre: book.genre.clone().unwrap_or_else(|| "Uncategorized".to_string()),
            price: format!("${:.2}", book.price),
            stock: format!("Stock: {}", book.stock),
            cover: book.cover_image.clone().unwrap_or_else(|| "No cover".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScreen {
    Progress(&'static str),
    Error(String),
    Empty(&'static str),
    Cards(Vec<BookCard>),
}

pub struct ListView {
    state: ListState,
    overlay: Overlay,
    refresh_token: u64,
    toasts: Toasts,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ListView {
    pub fn new() -> Self {
        Self {
            state: ListState::Loading,
            overlay: Overlay::Closed,
            refresh_token: 0,
            toasts: Toasts::default(),
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    pub fn refresh_token(&self) -> u64 {
        self.refresh_token
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    fn find(&self, id: BookId) -> Option<&Book> {
        match &self.state {
            ListState::Loaded(books) => books.iter().find(|book| book.id == id),
            _ => None,
        }
    }

    fn fetch(&mut self) -> Option<ListCommand> {
        self.state = ListState::Loading;
        Some(ListCommand::FetchBooks {
            token: self.refresh_token,
        })
    }

    /// Bump the refresh token and go back to loading.
    fn refresh(&mut self) -> Option<ListCommand> {
        self.refresh_token += 1;
        self.fetch()
    }

    /// A fetch result is applied only if no refresh happened since it was issued.
    fn is_current(&self, token: u64) -> bool {
        if token != self.refresh_token {
            debug!(token, current = self.refresh_token, "dropping stale fetch result");
            return false;
        }
        true
    }

    fn close_overlay(&mut self) {
        self.overlay = Overlay::Closed;
    }

    fn overlay_action(&self, input: impl Fn(&Modal) -> ModalAction) -> ModalAction {
        match &self.overlay {
            Overlay::Closed => ModalAction::None,
            Overlay::Form { modal, .. } => input(modal),
            Overlay::ConfirmDelete { confirm, .. } => input(confirm.modal()),
        }
    }

    /// Apply one event; returns the follow-up work, if any.
    pub fn handle(&mut self, event: ListEvent) -> Option<ListCommand> {
        debug!(?event, token = self.refresh_token, "list event");
        match event {
            ListEvent::Mounted => self.fetch(),
            ListEvent::Loaded { token, books } => {
                if self.is_current(token) {
                    self.state = ListState::Loaded(books);
                }
                None
            }
            ListEvent::LoadFailed { token, message } => {
                if self.is_current(token) {
                    self.state = ListState::Errored(message);
                }
                None
            }
            ListEvent::AddRequested => {
                let mut modal = Modal::new("Add New Book");
                modal.open();
                self.overlay = Overlay::Form {
                    modal,
                    form: FormView::create(),
                };
                None
            }
            ListEvent::EditRequested(id) => {
                match self.find(id).cloned() {
                    Some(book) => {
                        let mut modal = Modal::new("Edit Book");
                        modal.open();
                        self.overlay = Overlay::Form {
                            modal,
                            form: FormView::edit(&book),
                        };
                    }
                    None => {
                        self.toasts.error("Book not found");
                    }
                }
                None
            }
            ListEvent::DeleteRequested(id) => {
                match self.find(id).cloned() {
                    Some(book) => {
                        let mut confirm = ConfirmModal::new(
                            "Delete Book",
                            format!(
                                "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                                book.title
                            ),
                        )
                        .confirm_text("Delete");
                        confirm.open();
                        self.overlay = Overlay::ConfirmDelete { book, confirm };
                    }
                    None => {
                        self.toasts.error("Book not found");
                    }
                }
                None
            }
            ListEvent::DeleteConfirmed => {
                match std::mem::replace(&mut self.overlay, Overlay::Closed) {
                    Overlay::ConfirmDelete { book, .. } => Some(ListCommand::DeleteBook(book.id)),
                    other => {
                        self.overlay = other;
                        None
                    }
                }
            }
            ListEvent::Deleted(book) => {
                info!(id = %book.id, "book deleted");
                self.toasts.success("Book deleted successfully!");
                self.refresh()
            }
            ListEvent::DeleteFailed(message) => {
                self.toasts.error(message);
                None
            }
            ListEvent::FormCompleted(book) => {
                let message = match &self.overlay {
                    Overlay::Form { form, .. } => form.success_message(),
                    _ => "Book saved successfully!",
                };
                info!(id = %book.id, "book saved");
                self.toasts.success(message);
                self.close_overlay();
                self.refresh()
            }
            ListEvent::OverlayClosed => {
                self.close_overlay();
                None
            }
            ListEvent::KeyPressed(key) => self.on_overlay_action(self.overlay_action(|m| m.on_key(key))),
            ListEvent::OverlayClicked => self.on_overlay_action(self.overlay_action(Modal::on_overlay_click)),
            ListEvent::ConfirmClicked => self.on_overlay_action(self.button_action(true)),
            ListEvent::CancelClicked => self.on_overlay_action(self.button_action(false)),
        }
    }

    /// Confirm/cancel buttons. The form modal only has a cancel button.
    fn button_action(&self, confirm: bool) -> ModalAction {
        match &self.overlay {
            Overlay::ConfirmDelete { confirm: modal, .. } if confirm => modal.on_confirm_click(),
            Overlay::ConfirmDelete { confirm: modal, .. } => modal.on_cancel_click(),
            Overlay::Form { modal, .. } if !confirm && modal.is_open() => ModalAction::RequestClose,
            _ => ModalAction::None,
        }
    }

    fn on_overlay_action(&mut self, action: ModalAction) -> Option<ListCommand> {
        match action {
            ModalAction::RequestClose => self.handle(ListEvent::OverlayClosed),
            ModalAction::Confirm => self.handle(ListEvent::DeleteConfirmed),
            ModalAction::None => None,
        }
    }

    /// Apply `event` and run every command it triggers against `api` until
    /// the view settles.
    pub async fn dispatch(&mut self, api: &dyn CatalogApi, event: ListEvent) {
        let mut next = self.handle(event);
        while let Some(command) = next {
            let event = match command {
                ListCommand::FetchBooks { token } => match api.list_books().await {
                    Ok(books) => ListEvent::Loaded { token, books },
                    Err(err) => ListEvent::LoadFailed {
                        token,
                        message: err.to_string(),
                    },
                },
                ListCommand::DeleteBook(id) => match api.delete_book(&id.to_string()).await {
                    Ok(book) => ListEvent::Deleted(book),
                    Err(err) => ListEvent::DeleteFailed(err.to_string()),
                },
            };
            next = self.handle(event);
        }
    }

    /// Submit the open form. A failure stays inline in the form; success
    /// closes the overlay and refreshes the list.
    pub async fn submit_form(&mut self, api: &dyn CatalogApi) -> Option<Book> {
        let saved = match &mut self.overlay {
            Overlay::Form { form, .. } => form.submit(api).await,
            _ => None,
        }?;
        self.dispatch(api, ListEvent::FormCompleted(saved.clone())).await;
        Some(saved)
    }

    pub fn render(&self) -> ListScreen {
        match &self.state {
            ListState::Loading => ListScreen::Progress("Loading books..."),
            ListState::Errored(message) => ListScreen::Error(format!("Error: {message}")),
            ListState::Loaded(books) if books.is_empty() => {
                ListScreen::Empty("No books found. Add some!")
            }
            ListState::Loaded(books) => ListScreen::Cards(books.iter().map(BookCard::from).collect()),
        }
    }
}
