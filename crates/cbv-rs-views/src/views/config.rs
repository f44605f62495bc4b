//! Declarative view configuration.
//!
//! [`ViewConfig`] collects the attributes a generic view is parametrized by.
//! The ready-made views read it; custom views can implement the mixin
//! methods directly instead.

use std::sync::Arc;

use cbv_rs_core::{CbvError, CbvResult};
use cbv_rs_query::{Model, QueryObject};
use cbv_rs_template::Engine;

/// Configuration shared by [`TemplateView`](super::TemplateView),
/// [`RedirectView`](super::RedirectView) and [`ListView`](super::ListView).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cbv_rs_query::InMemoryModel;
/// use cbv_rs_views::ViewConfig;
///
/// let config = ViewConfig::new()
///     .template_name("books/list.html")
///     .model(Arc::new(InMemoryModel::new("Book", &["title"])))
///     .paginate_by(10)
///     .sort_by("-title");
/// assert!(config.validate_list().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Template rendered by template and list views.
    pub template_name: Option<String>,
    /// Collection source; its default query is used when no query object is set.
    pub model: Option<Arc<dyn Model>>,
    /// Explicit query; takes precedence over `model`.
    pub query_object: Option<Arc<dyn QueryObject>>,
    /// Context key aliasing the collection, instead of the derived `<entity>_list`.
    pub context_object_name: Option<String>,
    /// Page size; `None` disables pagination.
    pub paginate_by: Option<usize>,
    /// Default sort key, `-` prefixed for descending.
    pub sort_by: Option<String>,
    /// Fields a request may sort by; `None` allows every column.
    pub sortable_fields: Option<Vec<String>>,
    /// Query-string key for the page number; defaults to the settings value.
    pub page_kwarg: Option<String>,
    /// Query-string key for the sort key; defaults to the settings value.
    pub sort_kwarg: Option<String>,
    /// Redirect target.
    pub url: Option<String>,
    /// Whether redirects are permanent (301) or temporary (302).
    pub permanent: bool,
    /// Template engine; the process-wide default is used when absent.
    pub engine: Option<Arc<Engine>>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            template_name: None,
            model: None,
            query_object: None,
            context_object_name: None,
            paginate_by: None,
            sort_by: None,
            sortable_fields: None,
            page_kwarg: None,
            sort_kwarg: None,
            url: None,
            permanent: true,
            engine: None,
        }
    }
}

impl ViewConfig {
    /// Creates an empty configuration (redirects permanent).
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: Arc<dyn Model>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn query_object(mut self, query_object: Arc<dyn QueryObject>) -> Self {
        self.query_object = Some(query_object);
        self
    }

    #[must_use]
    pub fn context_object_name(mut self, name: impl Into<String>) -> Self {
        self.context_object_name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn paginate_by(mut self, page_size: usize) -> Self {
        self.paginate_by = Some(page_size);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sort_by = Some(key.into());
        self
    }

    #[must_use]
    pub fn sortable_fields(mut self, fields: &[&str]) -> Self {
        self.sortable_fields = Some(fields.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub fn page_kwarg(mut self, key: impl Into<String>) -> Self {
        self.page_kwarg = Some(key.into());
        self
    }

    #[must_use]
    pub fn sort_kwarg(mut self, key: impl Into<String>) -> Self {
        self.sort_kwarg = Some(key.into());
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub const fn permanent(mut self, permanent: bool) -> Self {
        self.permanent = permanent;
        self
    }

    #[must_use]
    pub fn engine(mut self, engine: Arc<Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Checks the configuration of a list view at startup.
    ///
    /// Requires a template name, exactly one of `model` / `query_object`, and
    /// a positive page size when pagination is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::ImproperlyConfigured`] describing the first problem.
    pub fn validate_list(&self) -> CbvResult<()> {
        if self.template_name.as_deref().map_or(true, str::is_empty) {
            return Err(CbvError::ImproperlyConfigured(
                "ListView requires a template_name".to_string(),
            ));
        }
        match (&self.model, &self.query_object) {
            (None, None) => {
                return Err(CbvError::ImproperlyConfigured(
                    "Either a model or query_object must be defined.".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(CbvError::ImproperlyConfigured(
                    "Define either a model or a query_object, not both.".to_string(),
                ))
            }
            _ => {}
        }
        if self.paginate_by == Some(0) {
            return Err(CbvError::ImproperlyConfigured(
                "paginate_by must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
