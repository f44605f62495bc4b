//! The demo catalogue: an in-memory SQLite database of books.

use std::sync::Arc;

use cbv_rs::query::SqliteModel;
use tokio::sync::Mutex;

/// Genres that get their own listing page.
pub const GENRES: &[&str] = &["novel", "poetry", "science"];

const BOOKS: &[(&str, &str, i64, Option<f64>)] = &[
    ("Emma", "novel", 1815, Some(4.1)),
    ("Middlemarch", "novel", 1871, Some(4.3)),
    ("Dune", "novel", 1965, Some(4.5)),
    ("Beloved", "novel", 1987, None),
    ("The Remains of the Day", "novel", 1989, Some(4.2)),
    ("Wolf Hall", "novel", 2009, Some(4.0)),
    ("Leaves of Grass", "poetry", 1855, Some(4.4)),
    ("Ariel", "poetry", 1965, Some(4.2)),
    ("North", "poetry", 1975, None),
    ("On the Origin of Species", "science", 1859, Some(4.0)),
    ("Silent Spring", "science", 1962, Some(4.3)),
    ("A Brief History of Time", "science", 1988, Some(4.2)),
    ("The Selfish Gene", "science", 1976, Some(4.1)),
];

/// Creates the `books` table, fills it, and returns it as a model.
pub async fn open() -> anyhow::Result<SqliteModel> {
    let conn = rusqlite::Connection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE books (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            genre TEXT NOT NULL,
            year INTEGER NOT NULL,
            rating REAL
        )",
    )?;
    for (title, genre, year, rating) in BOOKS {
        conn.execute(
            "INSERT INTO books (title, genre, year, rating) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![title, genre, year, rating],
        )?;
    }
    tracing::info!(count = BOOKS.len(), "seeded catalogue");

    let model = SqliteModel::open(Arc::new(Mutex::new(conn)), "books")
        .await?
        .with_entity_name("Book");
    Ok(model)
}
