//! SQLite backend using `rusqlite`.
//!
//! A [`SqliteModel`] exposes one table of a shared connection. Columns are
//! discovered with `PRAGMA table_info` when the model is opened, and ordering
//! or filtering is only accepted on those columns. Identifiers are always
//! quoted and values are always bound as parameters.
//!
//! The connection sits behind a `tokio::sync::Mutex` and every statement runs
//! in `tokio::task::spawn_blocking`.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use cbv_rs_core::{CbvError, CbvResult};

use crate::pagination::{check_page_items, page_offset, resolve_page, Pagination};
use crate::query::{ColumnDescription, Model, OrderBy, QueryObject};

/// A shared SQLite connection.
pub type SharedConnection = Arc<Mutex<rusqlite::Connection>>;

/// A table exposed as a collection source.
#[derive(Debug, Clone)]
pub struct SqliteModel {
    table: String,
    entity: String,
    conn: SharedConnection,
    columns: Arc<Vec<ColumnDescription>>,
}

impl SqliteModel {
    /// Opens `table` on `conn`, discovering its columns.
    ///
    /// The entity name defaults to the table name; see
    /// [`with_entity_name`](Self::with_entity_name).
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::DatabaseError`] if the table does not exist.
    pub async fn open(conn: SharedConnection, table: &str) -> CbvResult<Self> {
        let table = table.to_string();
        let pragma = format!("PRAGMA table_info({})", quote_ident(&table));
        let shared = Arc::clone(&conn);

        let raw_columns = tokio::task::spawn_blocking(move || {
            let conn = shared.blocking_lock();
            let mut stmt = conn.prepare(&pragma).map_err(db_error)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
                })
                .map_err(db_error)?;
            let columns: Vec<(String, String)> =
                rows.collect::<Result<_, _>>().map_err(db_error)?;
            Ok::<_, CbvError>(columns)
        })
        .await
        .map_err(join_error)??;

        if raw_columns.is_empty() {
            return Err(CbvError::DatabaseError(format!("no such table: {table}")));
        }

        let columns = raw_columns
            .into_iter()
            .map(|(name, column_type)| {
                let column = ColumnDescription::new(name, table.as_str());
                if column_type.is_empty() {
                    column
                } else {
                    column.with_type(column_type)
                }
            })
            .collect();

        tracing::debug!(table = %table, "opened sqlite model");
        Ok(Self {
            entity: table.clone(),
            table,
            conn,
            columns: Arc::new(columns),
        })
    }

    /// Sets the entity name reported by queries (for example `Book` for a
    /// `books` table).
    #[must_use]
    pub fn with_entity_name(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        let columns = self
            .columns
            .iter()
            .cloned()
            .map(|mut column| {
                column.entity = Some(self.entity.clone());
                column
            })
            .collect();
        self.columns = Arc::new(columns);
        self
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the concrete query type, for backend-specific refinements
    /// such as [`SqliteQuery::filter_eq`].
    pub fn objects(&self) -> SqliteQuery {
        SqliteQuery {
            table: self.table.clone(),
            entity: self.entity.clone(),
            conn: Arc::clone(&self.conn),
            columns: Arc::clone(&self.columns),
            filters: Vec::new(),
            ordering: Vec::new(),
        }
    }
}

impl Model for SqliteModel {
    fn model_name(&self) -> &str {
        &self.entity
    }

    fn query(&self) -> Arc<dyn QueryObject> {
        Arc::new(self.objects())
    }
}

/// A lazy `SELECT` over a [`SqliteModel`] table.
#[derive(Debug, Clone)]
pub struct SqliteQuery {
    table: String,
    entity: String,
    conn: SharedConnection,
    columns: Arc<Vec<ColumnDescription>>,
    filters: Vec<(String, Value)>,
    ordering: Vec<OrderBy>,
}

impl SqliteQuery {
    /// Keeps only rows whose `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::DatabaseError`] if `field` is not a column.
    pub fn filter_eq(&self, field: &str, value: Value) -> CbvResult<Self> {
        self.ensure_column(field)?;
        let mut query = self.clone();
        query.filters.push((field.to_string(), value));
        Ok(query)
    }

    fn ensure_column(&self, field: &str) -> CbvResult<()> {
        if self.has_field(field) {
            Ok(())
        } else {
            Err(CbvError::DatabaseError(format!(
                "no such column: {field} (table {})",
                self.table
            )))
        }
    }

    fn where_clause(&self) -> String {
        if self.filters.is_empty() {
            return String::new();
        }
        let conditions: Vec<String> = self
            .filters
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{} = ?{}", quote_ident(field), i + 1))
            .collect();
        format!(" WHERE {}", conditions.join(" AND "))
    }

    fn order_clause(&self) -> String {
        if self.ordering.is_empty() {
            return String::new();
        }
        let terms: Vec<String> = self
            .ordering
            .iter()
            .map(|order| {
                let direction = if order.descending { "DESC" } else { "ASC" };
                format!("{} {direction}", quote_ident(&order.field))
            })
            .collect();
        format!(" ORDER BY {}", terms.join(", "))
    }

    fn params(&self) -> Vec<SqlValue> {
        self.filters.iter().map(|(_, value)| to_sql_value(value)).collect()
    }

    /// Builds the `SELECT`, optionally windowed.
    pub fn to_sql(&self, window: Option<(usize, usize)>) -> String {
        let mut sql = format!(
            "SELECT * FROM {}{}{}",
            quote_ident(&self.table),
            self.where_clause(),
            self.order_clause()
        );
        if let Some((limit, offset)) = window {
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }
        sql
    }

    async fn fetch(&self, window: Option<(usize, usize)>) -> CbvResult<Vec<Value>> {
        let sql = self.to_sql(window);
        let params = self.params();
        let conn = Arc::clone(&self.conn);
        tracing::trace!(sql = %sql, "sqlite query");

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(&sql).map_err(db_error)?;
            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt
                .query(rusqlite::params_from_iter(params.iter()))
                .map_err(db_error)?;

            let mut result = Vec::new();
            while let Some(row) = rows.next().map_err(db_error)? {
                let mut object = Map::new();
                for (i, name) in names.iter().enumerate() {
                    let value = row.get_ref(i).map_err(db_error)?;
                    object.insert(name.clone(), from_sql_value(value));
                }
                result.push(Value::Object(object));
            }
            Ok(result)
        })
        .await
        .map_err(join_error)?
    }
}

#[async_trait]
impl QueryObject for SqliteQuery {
    fn column_descriptions(&self) -> Vec<ColumnDescription> {
        self.columns.as_ref().clone()
    }

    fn entity_name(&self) -> Option<String> {
        Some(self.entity.clone())
    }

    fn order_by(&self, order: OrderBy) -> CbvResult<Arc<dyn QueryObject>> {
        self.ensure_column(&order.field)?;
        let mut query = self.clone();
        query.ordering.push(order);
        Ok(Arc::new(query))
    }

    async fn paginate(
        &self,
        page: i64,
        per_page: usize,
        error_out: bool,
    ) -> CbvResult<Pagination> {
        let page = resolve_page(page, error_out)?;
        let items = match page_offset(page, per_page) {
            Some(offset) => self.fetch(Some((per_page, offset))).await?,
            None => Vec::new(),
        };
        check_page_items(page, &items, error_out)?;
        let total = self.count().await?;
        Ok(Pagination::new(page, per_page, total, items))
    }

    async fn all(&self) -> CbvResult<Vec<Value>> {
        self.fetch(None).await
    }

    async fn count(&self) -> CbvResult<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(&self.table),
            self.where_clause()
        );
        let params = self.params();
        let conn = Arc::clone(&self.conn);

        let count = tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| {
                row.get::<_, i64>(0)
            })
            .map_err(db_error)
        })
        .await
        .map_err(join_error)??;

        usize::try_from(count)
            .map_err(|e| CbvError::DatabaseError(format!("invalid row count {count}: {e}")))
    }
}

/// Quotes an SQL identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => n.as_i64().map_or_else(
            || SqlValue::Real(n.as_f64().unwrap_or_default()),
            SqlValue::Integer,
        ),
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::from(v),
        ValueRef::Real(v) => serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn db_error(e: rusqlite::Error) -> CbvError {
    CbvError::DatabaseError(e.to_string())
}

#[allow(clippy::needless_pass_by_value)]
fn join_error(e: tokio::task::JoinError) -> CbvError {
    CbvError::DatabaseError(format!("Task join error: {e}"))
}
