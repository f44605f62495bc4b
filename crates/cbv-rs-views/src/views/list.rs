//! List views: fetch a collection, optionally sort and paginate it, and
//! render it.
//!
//! [`MultipleObjectMixin`] holds the collection logic, [`BaseListView`]
//! combines it with template rendering, and [`ListView`] is the ready-made
//! view driven by a [`ViewConfig`].
//!
//! The context a list view renders with contains:
//!
//! | key | value |
//! |---|---|
//! | `object_list` | the rows of the current page, or every row |
//! | `paginator` | the serialized [`Pagination`], or `null` |
//! | `is_paginated` | whether there is more than one page |
//! | `<entity>_list` | alias of `object_list` (or the configured name) |

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use cbv_rs_core::settings::SETTINGS;
use cbv_rs_core::utils::text::camelcase_to_underscore;
use cbv_rs_core::{CbvError, CbvResult};
use cbv_rs_http::{HttpRequest, HttpResponse};
use cbv_rs_query::{Model, OrderBy, Pagination, QueryObject};
use cbv_rs_template::{Context, Engine};

use super::base::View;
use super::config::ViewConfig;
use super::template::{default_engine, TemplateResponseMixin};

fn default_page_kwarg() -> String {
    if SETTINGS.is_configured() {
        SETTINGS.get().page_kwarg.clone()
    } else {
        "page".to_string()
    }
}

fn default_sort_kwarg() -> String {
    if SETTINGS.is_configured() {
        SETTINGS.get().sort_kwarg.clone()
    } else {
        "sort_by".to_string()
    }
}

/// Collection handling for views that display several objects.
#[async_trait]
pub trait MultipleObjectMixin: Send + Sync {
    /// An explicit query; takes precedence over [`model`](Self::model).
    fn query_object(&self) -> Option<Arc<dyn QueryObject>> {
        None
    }

    /// The collection source.
    fn model(&self) -> Option<Arc<dyn Model>> {
        None
    }

    /// A fixed context name for the collection.
    fn context_object_name(&self) -> Option<&str> {
        None
    }

    /// Resolves the query to display.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::ImproperlyConfigured`] when neither a query object
    /// nor a model is defined.
    fn get_query_object(&self) -> CbvResult<Arc<dyn QueryObject>> {
        if let Some(query_object) = self.query_object() {
            return Ok(query_object);
        }
        if let Some(model) = self.model() {
            return Ok(model.query());
        }
        Err(CbvError::ImproperlyConfigured(
            "Either a model or query_object must be defined.".to_string(),
        ))
    }

    /// The page size, or `None` to show every row. A size of zero also
    /// disables pagination.
    fn get_paginate_by(&self) -> Option<usize> {
        None
    }

    /// The query-string key holding the page number.
    fn page_kwarg(&self) -> String {
        default_page_kwarg()
    }

    /// The default sort key (`-` prefixed for descending).
    fn get_sort_by(&self) -> Option<String> {
        None
    }

    /// The query-string key holding the sort key.
    fn sort_kwarg(&self) -> String {
        default_sort_kwarg()
    }

    /// Fields a request may sort by; `None` allows every column.
    fn get_sortable_fields(&self) -> Option<Vec<String>> {
        None
    }

    /// Fetches the requested page.
    ///
    /// Returns the pagination, the page's rows, and whether more than one
    /// page exists.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::NotFound`] if the page parameter is not an integer
    /// or names a page outside the collection.
    async fn paginate_query_object(
        &self,
        request: &HttpRequest,
        query_object: &Arc<dyn QueryObject>,
        page_size: usize,
    ) -> CbvResult<(Pagination, Vec<Value>, bool)> {
        let page_kwarg = self.page_kwarg();
        let raw = request.get().get(&page_kwarg).unwrap_or("1");
        let page: i64 = raw.trim().parse().map_err(|_| {
            CbvError::NotFound(format!("Page '{raw}' is not an integer"))
        })?;

        let pagination = query_object.paginate(page, page_size, true).await?;
        let is_paginated = pagination.has_prev() || pagination.has_next();
        let items = pagination.items.clone();
        Ok((pagination, items, is_paginated))
    }

    /// Applies the requested or default ordering.
    ///
    /// Views without a [`get_sort_by`](Self::get_sort_by) key are never
    /// sorted; otherwise the request's sort key wins over that default.
    /// Keys naming an unknown column, or a column outside
    /// [`get_sortable_fields`](Self::get_sortable_fields), leave the query
    /// unchanged.
    fn sort_query_object(
        &self,
        request: &HttpRequest,
        query_object: Arc<dyn QueryObject>,
    ) -> Arc<dyn QueryObject> {
        let Some(default_key) = self.get_sort_by() else {
            return query_object;
        };
        let requested = request
            .get()
            .get(&self.sort_kwarg())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(ToString::to_string);
        let from_request = requested.is_some();

        let key = requested.unwrap_or(default_key);
        let Some(order) = OrderBy::parse(&key) else {
            tracing::debug!(sort_key = %key, "ignoring empty sort key");
            return query_object;
        };

        if from_request {
            if let Some(allowed) = self.get_sortable_fields() {
                if !allowed.iter().any(|field| *field == order.field) {
                    tracing::debug!(field = %order.field, "sort field is not in the allow-list");
                    return query_object;
                }
            }
        }
        if !query_object.has_field(&order.field) {
            tracing::debug!(field = %order.field, "ignoring unknown sort field");
            return query_object;
        }

        match query_object.order_by(order) {
            Ok(sorted) => sorted,
            Err(err) => {
                tracing::debug!(error = %err, "ordering failed; leaving query unsorted");
                query_object
            }
        }
    }

    /// The context key aliasing the collection.
    ///
    /// The configured name wins; otherwise `<entity>_list` with the entity
    /// name converted to snake case, when the query describes its columns.
    fn get_context_object_name(&self, object_list: &dyn QueryObject) -> Option<String> {
        if let Some(name) = self.context_object_name() {
            return Some(name.to_string());
        }
        if object_list.column_descriptions().is_empty() {
            return None;
        }
        object_list
            .entity_name()
            .map(|entity| format!("{}_list", camelcase_to_underscore(&entity)))
    }

    /// Builds the template context for `object_list`.
    ///
    /// `extra` is merged over the generated keys; the alias key is set last.
    async fn get_context_data(
        &self,
        request: &HttpRequest,
        object_list: Arc<dyn QueryObject>,
        extra: Context,
    ) -> CbvResult<Context> {
        let context_object_name = self.get_context_object_name(object_list.as_ref());
        let query_object = self.sort_query_object(request, object_list);

        let page_size = self.get_paginate_by().filter(|size| *size > 0);
        let (rows, paginator, is_paginated) = match page_size {
            Some(page_size) => {
                let (pagination, items, is_paginated) = self
                    .paginate_query_object(request, &query_object, page_size)
                    .await?;
                (items, serde_json::to_value(&pagination)?, is_paginated)
            }
            None => (query_object.all().await?, Value::Null, false),
        };
        let rows = Value::Array(rows);

        let mut context = Context::new();
        context.insert("object_list".to_string(), rows.clone());
        context.insert("paginator".to_string(), paginator);
        context.insert("is_paginated".to_string(), Value::Bool(is_paginated));
        context.extend(extra);
        if let Some(name) = context_object_name {
            context.insert(name, rows);
        }
        Ok(context)
    }
}

/// Resolves the collection, builds the context and renders it.
#[async_trait]
pub trait BaseListView: MultipleObjectMixin + TemplateResponseMixin {
    /// Extra context merged into every render.
    fn extra_context(&self) -> Context {
        Context::new()
    }

    /// Handles a GET request.
    async fn list(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        let object_list = self.get_query_object()?;
        let context = self
            .get_context_data(&request, object_list, self.extra_context())
            .await?;
        self.render_to_response(context)
    }
}

/// A list view configured through [`ViewConfig`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cbv_rs_query::InMemoryModel;
/// use cbv_rs_views::{ListView, View, ViewConfig};
///
/// let books = InMemoryModel::new("Book", &["title", "year"]);
/// let view = ListView::new(ViewConfig::new().template_name("books/list.html"))
///     .model(Arc::new(books))
///     .paginate_by(20)
///     .sort_by("-year");
/// let handler = view.as_view();
/// ```
#[derive(Debug, Clone)]
pub struct ListView {
    config: ViewConfig,
    extra_context: Context,
}

impl ListView {
    /// Creates a list view from `config`.
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            extra_context: Context::new(),
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.config.template_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: Arc<dyn Model>) -> Self {
        self.config.model = Some(model);
        self
    }

    #[must_use]
    pub fn query_object(mut self, query_object: Arc<dyn QueryObject>) -> Self {
        self.config.query_object = Some(query_object);
        self
    }

    #[must_use]
    pub const fn paginate_by(mut self, page_size: usize) -> Self {
        self.config.paginate_by = Some(page_size);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.config.sort_by = Some(key.into());
        self
    }

    #[must_use]
    pub fn context_object_name(mut self, name: impl Into<String>) -> Self {
        self.config.context_object_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sortable_fields(mut self, fields: &[&str]) -> Self {
        self.config.sortable_fields = Some(fields.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Arc<Engine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    /// Adds a fixed context value to every render.
    #[must_use]
    pub fn with_context(mut self, key: &str, value: Value) -> Self {
        self.extra_context.insert(key.to_string(), value);
        self
    }
}

impl MultipleObjectMixin for ListView {
    fn query_object(&self) -> Option<Arc<dyn QueryObject>> {
        self.config.query_object.clone()
    }

    fn model(&self) -> Option<Arc<dyn Model>> {
        self.config.model.clone()
    }

    fn context_object_name(&self) -> Option<&str> {
        self.config.context_object_name.as_deref()
    }

    fn get_paginate_by(&self) -> Option<usize> {
        self.config.paginate_by
    }

    fn page_kwarg(&self) -> String {
        self.config
            .page_kwarg
            .clone()
            .unwrap_or_else(default_page_kwarg)
    }

    fn get_sort_by(&self) -> Option<String> {
        self.config.sort_by.clone()
    }

    fn sort_kwarg(&self) -> String {
        self.config
            .sort_kwarg
            .clone()
            .unwrap_or_else(default_sort_kwarg)
    }

    fn get_sortable_fields(&self) -> Option<Vec<String>> {
        self.config.sortable_fields.clone()
    }
}

impl TemplateResponseMixin for ListView {
    fn template_name(&self) -> Option<&str> {
        self.config.template_name.as_deref()
    }

    fn engine(&self) -> Arc<Engine> {
        self.config.engine.clone().unwrap_or_else(default_engine)
    }
}

impl BaseListView for ListView {
    fn extra_context(&self) -> Context {
        self.extra_context.clone()
    }
}

#[async_trait]
impl View for ListView {
    async fn get(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        self.list(request).await
    }
}
