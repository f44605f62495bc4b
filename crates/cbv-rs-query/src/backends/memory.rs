//! In-memory backend.
//!
//! Rows are JSON objects held behind an `Arc`, so queries are cheap to clone
//! and share. Sorting is stable and compares JSON values with
//! `null < bool < number < string < array < object`; a missing field sorts as
//! `null`.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use cbv_rs_core::{CbvError, CbvResult};

use crate::pagination::{check_page_items, page_offset, resolve_page, Pagination};
use crate::query::{ColumnDescription, Model, OrderBy, QueryObject};

/// A named collection of JSON rows with a declared field list.
///
/// # Examples
///
/// ```
/// use cbv_rs_query::{InMemoryModel, Model};
/// use serde_json::json;
///
/// let model = InMemoryModel::new("Book", &["title", "year"])
///     .with_rows(vec![json!({"title": "Emma", "year": 1815})]);
/// assert_eq!(model.model_name(), "Book");
/// assert!(model.query().has_field("year"));
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryModel {
    name: String,
    fields: Arc<Vec<String>>,
    rows: Arc<Vec<Value>>,
}

impl InMemoryModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: Arc::new(fields.iter().map(ToString::to_string).collect()),
            rows: Arc::new(Vec::new()),
        }
    }

    /// Replaces the rows.
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = Arc::new(rows);
        self
    }

    /// Returns the declared fields.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the concrete query type, for backend-specific refinements
    /// such as [`InMemoryQuery::filter_eq`].
    pub fn objects(&self) -> InMemoryQuery {
        InMemoryQuery {
            entity: self.name.clone(),
            fields: Arc::clone(&self.fields),
            rows: Arc::clone(&self.rows),
            filters: Vec::new(),
            ordering: Vec::new(),
        }
    }
}

impl Model for InMemoryModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn query(&self) -> Arc<dyn QueryObject> {
        Arc::new(self.objects())
    }
}

/// A lazy query over an [`InMemoryModel`].
#[derive(Debug, Clone)]
pub struct InMemoryQuery {
    entity: String,
    fields: Arc<Vec<String>>,
    rows: Arc<Vec<Value>>,
    filters: Vec<(String, Value)>,
    ordering: Vec<OrderBy>,
}

impl InMemoryQuery {
    /// Keeps only rows whose `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::DatabaseError`] if `field` is not declared.
    pub fn filter_eq(&self, field: &str, value: Value) -> CbvResult<Self> {
        self.ensure_field(field)?;
        let mut query = self.clone();
        query.filters.push((field.to_string(), value));
        Ok(query)
    }

    /// Returns the ordering applied so far.
    pub fn ordering(&self) -> &[OrderBy] {
        &self.ordering
    }

    fn ensure_field(&self, field: &str) -> CbvResult<()> {
        if self.fields.iter().any(|f| f == field) {
            Ok(())
        } else {
            Err(CbvError::DatabaseError(format!(
                "Entity '{}' has no field '{field}'",
                self.entity
            )))
        }
    }

    /// Applies filters and ordering, returning the matching rows.
    fn evaluate(&self) -> Vec<Value> {
        let mut rows: Vec<Value> = self
            .rows
            .iter()
            .filter(|row| {
                self.filters
                    .iter()
                    .all(|(field, value)| row.get(field).unwrap_or(&Value::Null) == value)
            })
            .cloned()
            .collect();

        if !self.ordering.is_empty() {
            rows.sort_by(|a, b| {
                self.ordering
                    .iter()
                    .map(|order| {
                        let ordering = compare_values(
                            a.get(&order.field).unwrap_or(&Value::Null),
                            b.get(&order.field).unwrap_or(&Value::Null),
                        );
                        if order.descending {
                            ordering.reverse()
                        } else {
                            ordering
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        rows
    }
}

#[async_trait]
impl QueryObject for InMemoryQuery {
    fn column_descriptions(&self) -> Vec<ColumnDescription> {
        self.fields
            .iter()
            .map(|field| ColumnDescription::new(field.as_str(), self.entity.as_str()))
            .collect()
    }

    fn entity_name(&self) -> Option<String> {
        Some(self.entity.clone())
    }

    fn order_by(&self, order: OrderBy) -> CbvResult<Arc<dyn QueryObject>> {
        self.ensure_field(&order.field)?;
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
        let rows = self.evaluate();
        let total = rows.len();
        let items: Vec<Value> = rows
            .into_iter()
            .skip(page_offset(page, per_page).unwrap_or(total))
            .take(per_page)
            .collect();
        check_page_items(page, &items, error_out)?;

        tracing::trace!(entity = %self.entity, page, per_page, total, "paginated in-memory query");
        Ok(Pagination::new(page, per_page, total, items))
    }

    async fn all(&self) -> CbvResult<Vec<Value>> {
        Ok(self.evaluate())
    }

    async fn count(&self) -> CbvResult<usize> {
        Ok(self.evaluate().len())
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values used for sorting rows.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
