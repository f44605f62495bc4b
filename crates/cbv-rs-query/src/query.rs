//! Query-object and model traits.
//!
//! These traits are the whole surface a list view needs from a storage
//! backend. They are object-safe so views can hold `Arc<dyn QueryObject>` and
//! `Arc<dyn Model>` without knowing the backend.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use cbv_rs_core::CbvResult;

use crate::pagination::Pagination;

/// Describes one column a query returns.
///
/// The first description of a query names its entity, which list views use to
/// derive a context name (`BlogPost` becomes `blog_post_list`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescription {
    /// The column name.
    pub name: String,
    /// The entity (model or table) the column belongs to.
    pub entity: Option<String>,
    /// The declared column type, when the backend knows it.
    pub column_type: Option<String>,
}

impl ColumnDescription {
    /// Creates a description for a column of the given entity.
    pub fn new(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: Some(entity.into()),
            column_type: None,
        }
    }

    /// Sets the declared column type.
    #[must_use]
    pub fn with_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }
}

/// A single ordering criterion.
///
/// # Examples
///
/// ```
/// use cbv_rs_query::OrderBy;
///
/// let order = OrderBy::parse("-name").unwrap();
/// assert_eq!(order.field, "name");
/// assert!(order.descending);
///
/// assert_eq!(OrderBy::parse("age"), Some(OrderBy::asc("age")));
/// assert_eq!(OrderBy::parse(""), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The field to order by.
    pub field: String,
    /// Whether the ordering is descending.
    pub descending: bool,
}

impl OrderBy {
    /// Ascending order on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending order on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parses a sort key; a leading `-` means descending.
    ///
    /// Returns `None` when no field name remains.
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        let (field, descending) = key
            .strip_prefix('-')
            .map_or((key, false), |rest| (rest, true));
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            descending,
        })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

/// A composable, lazily executed query over a collection.
///
/// Builder-style methods return a new query and leave `self` untouched, so a
/// configured query object can be shared between requests.
#[async_trait]
pub trait QueryObject: Send + Sync + fmt::Debug {
    /// Describes the columns this query returns.
    fn column_descriptions(&self) -> Vec<ColumnDescription>;

    /// The entity the query is over, taken from the first column description.
    fn entity_name(&self) -> Option<String> {
        self.column_descriptions()
            .into_iter()
            .next()
            .and_then(|column| column.entity)
    }

    /// Returns `true` if `name` is a column of this query.
    fn has_field(&self, name: &str) -> bool {
        self.column_descriptions()
            .iter()
            .any(|column| column.name == name)
    }

    /// Returns a new query with `order` appended to its ordering.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::DatabaseError`](cbv_rs_core::CbvError::DatabaseError)
    /// if the field is not a column of the query.
    fn order_by(&self, order: OrderBy) -> CbvResult<Arc<dyn QueryObject>>;

    /// Executes the query for one page.
    ///
    /// With `error_out`, a page below 1 or an empty page other than the first
    /// is [`CbvError::NotFound`](cbv_rs_core::CbvError::NotFound). Without it,
    /// pages below 1 are treated as page 1.
    async fn paginate(&self, page: i64, per_page: usize, error_out: bool)
        -> CbvResult<Pagination>;

    /// Executes the query and returns every row.
    async fn all(&self) -> CbvResult<Vec<Value>>;

    /// Counts the rows the query would return.
    async fn count(&self) -> CbvResult<usize>;
}

/// A collection source.
pub trait Model: Send + Sync + fmt::Debug {
    /// The model's name.
    fn model_name(&self) -> &str;

    /// The default query over every row of the model.
    fn query(&self) -> Arc<dyn QueryObject>;
}
