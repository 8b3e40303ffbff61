//! Bookstore application library
//!
//! The catalog modules mounted by the `bookstore-server` binary, and the
//! book model shared with the client.

pub mod modules;

pub use modules::books::models::{Book, BookId, BookInput};
