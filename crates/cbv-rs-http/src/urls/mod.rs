//! URL routing and resolution.
//!
//! - [`pattern`]: route definitions via [`path`](pattern::path) with typed
//!   `<conv:name>` placeholders
//! - [`resolver`]: forward resolution to a handler plus keyword arguments, and
//!   reverse URL generation from pattern names
//!
//! # Examples
//!
//! ```
//! use cbv_rs_http::urls::pattern::path;
//! use cbv_rs_http::urls::resolver::URLResolver;
//! use cbv_rs_http::{HttpRequest, HttpResponse};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let handler = Arc::new(|_req: HttpRequest| -> cbv_rs_http::BoxFuture {
//!     Box::pin(async { HttpResponse::ok("ok") })
//! });
//!
//! let resolver = URLResolver::new(vec![
//!     path("books/<slug:genre>/", handler, Some("books-by-genre")).unwrap(),
//! ]);
//!
//! let m = resolver.resolve("/books/poetry/").unwrap();
//! assert_eq!(m.kwargs.get("genre").unwrap(), "poetry");
//!
//! let mut kwargs = HashMap::new();
//! kwargs.insert("genre", "essays");
//! assert_eq!(resolver.reverse("books-by-genre", &kwargs).unwrap(), "/books/essays/");
//! ```

pub mod pattern;
pub mod resolver;
