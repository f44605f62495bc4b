//! # cbv-rs-views
//!
//! Generic class-based views and the application server.
//!
//! - [`views::base`]: the [`View`](views::View) trait and method dispatch
//! - [`views::template`]: template rendering mixins and [`TemplateView`](views::TemplateView)
//! - [`views::redirect`]: [`RedirectView`](views::RedirectView)
//! - [`views::list`]: collection mixins, [`ListView`](views::ListView), pagination and sorting
//! - [`views::config`]: [`ViewConfig`](views::ViewConfig), the declarative view configuration
//! - [`server`]: [`App`](server::App), which serves a URL configuration with axum

pub mod server;
pub mod views;

pub use server::App;
pub use views::{
    BaseListView, ContextMixin, ListView, MultipleObjectMixin, RedirectMixin, RedirectView,
    TemplateResponseMixin, TemplateView, View, ViewConfig, ViewFunction,
};
