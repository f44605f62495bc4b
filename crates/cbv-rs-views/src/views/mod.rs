//! The generic views.
//!
//! Mixins are traits layered on [`View`]: a concrete view implements the
//! handlers it supports and composes the mixins it needs. [`TemplateView`],
//! [`RedirectView`] and [`ListView`] are ready-made compositions configured
//! through [`ViewConfig`].

pub mod base;
pub mod config;
pub mod list;
pub mod redirect;
pub mod template;

pub use base::{View, ViewFunction};
pub use config::ViewConfig;
pub use list::{BaseListView, ListView, MultipleObjectMixin};
pub use redirect::{RedirectMixin, RedirectView};
pub use template::{default_engine, ContextMixin, TemplateResponseMixin, TemplateView};
