//! Database access for press-admin

pub mod content;

pub use content::SqliteContentStore;
