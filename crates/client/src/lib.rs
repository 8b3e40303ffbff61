//! Client side of the bookstore catalog.
//!
//! [`api`] wraps the REST surface; [`list`], [`form`], [`modal`] and
//! [`toast`] are framework-independent state machines a front end renders.

pub mod api;
pub mod error;
pub mod form;
pub mod list;
pub mod modal;
pub mod toast;

pub use api::{CatalogApi, HttpCatalogClient, DEFAULT_API_URL};
pub use bookstore_app::{Book, BookId, BookInput};
pub use error::{ClientError, Result};
pub use form::{Draft, DraftField, FormMode, FormView, Submission};
pub use list::{BookCard, ListCommand, ListEvent, ListScreen, ListState, ListView, Overlay};
pub use modal::{ConfirmModal, Key, Modal, ModalAction, Tone};
pub use toast::{Toast, ToastKind, Toasts};
