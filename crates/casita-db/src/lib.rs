//! Casita DB Library
//!
//! Item persistence for the listing backend: the `ItemRepository` trait plus
//! the JSON-array-file backend and the Postgres backend. Repositories return
//! records in the lenient `StoredItem` shape; callers normalize on read.

pub mod json_file;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;

pub use json_file::JsonFileRepository;
#[cfg(feature = "postgres")]
pub use postgres::{run_migrations, PgItemRepository};
pub use traits::ItemRepository;
