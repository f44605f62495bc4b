//! Storage backends implementing [`QueryObject`](crate::QueryObject).

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
