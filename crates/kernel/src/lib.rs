pub mod module;
pub mod registry;
pub mod settings;

pub use bookstore_db::{Database, Migration};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
