//! The base view trait.
//!
//! [`View`] routes a request to the handler named after its HTTP method. A
//! view overrides the handlers it supports; the rest answer 405 Method Not
//! Allowed. Handlers return [`CbvResult`], and [`View::dispatch`] turns an
//! error into the matching status response.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use cbv_rs_core::{CbvError, CbvResult};
use cbv_rs_http::urls::pattern::RouteHandler;
use cbv_rs_http::{HttpRequest, HttpResponse};

/// A view converted into a route handler by [`View::as_view`].
pub type ViewFunction = RouteHandler;

/// The base trait for class-based views.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use cbv_rs_core::CbvResult;
/// use cbv_rs_http::{HttpRequest, HttpResponse};
/// use cbv_rs_views::View;
///
/// struct Ping;
///
/// #[async_trait]
/// impl View for Ping {
///     async fn get(&self, _request: HttpRequest) -> CbvResult<HttpResponse> {
///         Ok(HttpResponse::ok("pong"))
///     }
/// }
/// ```
#[async_trait]
pub trait View: Send + Sync {
    /// The HTTP methods a view may answer.
    fn allowed_methods(&self) -> Vec<Method> {
        vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
            Method::TRACE,
        ]
    }

    /// Routes the request to the handler for its method.
    ///
    /// Methods outside [`allowed_methods`](Self::allowed_methods) answer 405.
    /// Handler errors become responses via [`HttpResponse::from_error`];
    /// server errors are logged at `error`, client errors at `debug`.
    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let method = request.method().clone();
        let path = request.path().to_string();
        tracing::debug!(%method, %path, "dispatching view");

        if !self.allowed_methods().contains(&method) {
            return self.http_method_not_allowed(&request);
        }

        let result = match method {
            Method::GET => self.get(request).await,
            Method::POST => self.post(request).await,
            Method::PUT => self.put(request).await,
            Method::DELETE => self.delete(request).await,
            Method::HEAD => self.head(request).await,
            Method::OPTIONS => self.options(request).await,
            Method::TRACE => self.trace(request).await,
            _ => Ok(self.http_method_not_allowed(&request)),
        };

        match result {
            Ok(response) => response,
            Err(CbvError::MethodNotAllowed(_)) => {
                let methods = self.allowed_methods();
                let names: Vec<&str> = methods.iter().map(Method::as_str).collect();
                HttpResponse::not_allowed(&names)
            }
            Err(err) => {
                if err.is_client_error() {
                    tracing::debug!(%method, %path, error = %err, "view returned a client error");
                } else {
                    tracing::error!(%method, %path, error = %err, "view failed");
                }
                HttpResponse::from_error(&err)
            }
        }
    }

    /// Handles GET requests. Returns 405 by default.
    async fn get(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        Ok(self.http_method_not_allowed(&request))
    }

    /// Handles POST requests. Returns 405 by default.
    async fn post(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        Ok(self.http_method_not_allowed(&request))
    }

    /// Handles PUT requests. Returns 405 by default.
    async fn put(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        Ok(self.http_method_not_allowed(&request))
    }

    /// Handles DELETE requests. Returns 405 by default.
    async fn delete(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        Ok(self.http_method_not_allowed(&request))
    }

    /// Handles HEAD requests. Delegates to `get` by default.
    async fn head(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        self.get(request).await
    }

    /// Handles OPTIONS requests with an empty 200 carrying the `Allow` header.
    async fn options(&self, _request: HttpRequest) -> CbvResult<HttpResponse> {
        let methods = self.allowed_methods();
        let names: Vec<&str> = methods.iter().map(Method::as_str).collect();
        let mut response = HttpResponse::ok("");
        if let Ok(value) = http::header::HeaderValue::from_str(&names.join(", ")) {
            response.headers_mut().insert(http::header::ALLOW, value);
        }
        Ok(response)
    }

    /// Handles TRACE requests. Returns 405 by default.
    async fn trace(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        Ok(self.http_method_not_allowed(&request))
    }

    /// Builds the 405 response listing [`allowed_methods`](Self::allowed_methods).
    fn http_method_not_allowed(&self, request: &HttpRequest) -> HttpResponse {
        tracing::debug!(method = %request.method(), path = request.path(), "method not allowed");
        let methods = self.allowed_methods();
        let names: Vec<&str> = methods.iter().map(Method::as_str).collect();
        HttpResponse::not_allowed(&names)
    }

    /// Converts this view into a route handler for URL patterns.
    #[allow(clippy::wrong_self_convention)]
    fn as_view(self) -> ViewFunction
    where
        Self: Sized + 'static,
    {
        let view = Arc::new(self);
        Arc::new(move |request: HttpRequest| -> cbv_rs_http::BoxFuture {
            let view = Arc::clone(&view);
            Box::pin(async move { view.dispatch(request).await })
        })
    }
}
