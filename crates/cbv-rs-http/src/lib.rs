//! # cbv-rs-http
//!
//! HTTP layer for cbv-rs. Provides the request and response types the views
//! consume and produce, query-string parameters, and URL routing with named
//! keyword arguments.
//!
//! ## Modules
//!
//! - [`request`] - [`HttpRequest`] and its builder
//! - [`querydict`] - [`QueryDict`] for query-string parameters
//! - [`response`] - [`HttpResponse`] and redirect / error helpers
//! - [`urls`] - URL patterns, resolution and reversal

pub mod querydict;
pub mod request;
pub mod response;
pub mod urls;

use std::future::Future;
use std::pin::Pin;

pub use querydict::QueryDict;
pub use request::HttpRequest;
pub use response::{HttpResponse, HttpResponsePermanentRedirect, HttpResponseRedirect};

/// A boxed future resolving to an [`HttpResponse`], as returned by route handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = HttpResponse> + Send>>;
