//! # cbv-rs
//!
//! Generic class-based views for axum applications.
//!
//! This is the meta-crate that re-exports the layers for convenient access.
//! Depend on `cbv-rs` for everything, or on the individual crates for
//! finer-grained control.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cbv_rs::prelude::*;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let books = InMemoryModel::new("Book", &["title", "year"])
//!     .with_rows(vec![json!({"title": "Dune", "year": 1965})]);
//!
//! let resolver = URLResolver::new(vec![
//!     path("", RedirectView::temporary("/books/").as_view(), Some("home"))?,
//!     path(
//!         "books/",
//!         ListView::new(ViewConfig::new().template_name("books/list.html"))
//!             .model(Arc::new(books))
//!             .paginate_by(10)
//!             .as_view(),
//!         Some("book-list"),
//!     )?,
//! ]);
//!
//! App::new(Settings::default()).urls(resolver).run("127.0.0.1:8000").await?;
//! # Ok(())
//! # }
//! ```

/// Settings, logging setup and error types.
pub use cbv_rs_core as core;

/// HTTP layer: request, response and URL routing.
#[cfg(feature = "http")]
pub use cbv_rs_http as http;

/// Tera-backed template engine.
#[cfg(feature = "template")]
pub use cbv_rs_template as template;

/// Query objects, pagination and the in-memory and SQLite backends.
#[cfg(feature = "query")]
pub use cbv_rs_query as query;

/// Generic views and the axum server.
#[cfg(feature = "views")]
pub use cbv_rs_views as views;

// Third-party crates applications need next to the framework
pub use async_trait;
pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// The names most applications need.
pub mod prelude {
    pub use cbv_rs_core::{CbvError, CbvResult, Settings, SETTINGS};

    #[cfg(feature = "http")]
    pub use cbv_rs_http::urls::pattern::path;
    #[cfg(feature = "http")]
    pub use cbv_rs_http::urls::resolver::URLResolver;
    #[cfg(feature = "http")]
    pub use cbv_rs_http::{HttpRequest, HttpResponse};

    #[cfg(feature = "template")]
    pub use cbv_rs_template::{Context, Engine};

    #[cfg(feature = "query")]
    pub use cbv_rs_query::{InMemoryModel, Model, OrderBy, Pagination, QueryObject};
    #[cfg(feature = "sqlite")]
    pub use cbv_rs_query::SqliteModel;

    #[cfg(feature = "views")]
    pub use cbv_rs_views::{
        App, BaseListView, ContextMixin, ListView, MultipleObjectMixin, RedirectMixin,
        RedirectView, TemplateResponseMixin, TemplateView, View, ViewConfig,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_reexported_crates_are_usable() {
        let row = crate::serde_json::json!({"title": "Dune"});
        let model = InMemoryModel::new("Book", &["title"]).with_rows(vec![row]);
        assert_eq!(model.model_name(), "Book");
        crate::tracing::debug!("re-exported tracing macro");
    }

    #[tokio::test]
    async fn test_prelude_builds_a_router() {
        let resolver = URLResolver::new(vec![path(
            "",
            RedirectView::temporary("/books/").as_view(),
            Some("home"),
        )
        .unwrap()]);
        let app = App::new(Settings::default()).urls(resolver);
        assert!(app.has_urls());
        let _router: crate::axum::Router = app.into_axum_router();
    }
}
