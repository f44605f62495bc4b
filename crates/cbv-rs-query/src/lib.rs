//! # cbv-rs-query
//!
//! The narrow query interface list views depend on.
//!
//! A [`QueryObject`] is a not-yet-executed, composable query owned by a
//! storage backend. Views only order it, paginate it, inspect its columns,
//! and fetch its rows; everything else stays inside the backend. A [`Model`]
//! is a collection source whose [`Model::query`] yields the default query.
//!
//! ## Backends
//!
//! - [`backends::memory`]: rows of JSON objects held in memory
//! - [`backends::sqlite`]: a table on a shared `rusqlite` connection
//!   (feature `sqlite`, enabled by default)

pub mod backends;
pub mod pagination;
pub mod query;

pub use backends::memory::{InMemoryModel, InMemoryQuery};
#[cfg(feature = "sqlite")]
pub use backends::sqlite::{SqliteModel, SqliteQuery};
pub use pagination::Pagination;
pub use query::{ColumnDescription, Model, OrderBy, QueryObject};
