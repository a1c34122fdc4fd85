//! Storage backends for quotelab
//!
//! The engine talks to persistence only through the `ArticleStore` trait.
//! `SqliteStore` is the persistent implementation; `MemoryStore` keeps
//! everything in process.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ArticleStore, OpenStore, StorageError, StorageResult};
