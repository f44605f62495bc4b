//! HTTP server integration.
//!
//! [`App`] combines settings and a URL configuration into an axum router.
//! Every request is resolved against the [`URLResolver`]; the captured
//! keyword arguments are attached to the [`HttpRequest`] before the matched
//! view runs inside a per-request tracing span.
//!
//! # Examples
//!
//! ```no_run
//! use cbv_rs_core::Settings;
//! use cbv_rs_http::urls::pattern::path;
//! use cbv_rs_http::urls::resolver::URLResolver;
//! use cbv_rs_views::{App, RedirectView, View};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = URLResolver::new(vec![
//!     path("", RedirectView::temporary("/books/").as_view(), Some("home"))?,
//! ]);
//!
//! App::new(Settings::default()).urls(resolver).run("127.0.0.1:8000").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::any;
use tracing::Instrument;

use cbv_rs_core::logging::request_span;
use cbv_rs_core::{CbvError, CbvResult, Settings};
use cbv_rs_http::urls::resolver::URLResolver;
use cbv_rs_http::{HttpRequest, HttpResponse};

/// The application: settings plus URL configuration.
pub struct App {
    url_conf: Option<URLResolver>,
    settings: Settings,
}

impl App {
    /// Creates an application with the given settings and no routes.
    pub const fn new(settings: Settings) -> Self {
        Self {
            url_conf: None,
            settings,
        }
    }

    /// Sets the URL configuration.
    #[must_use]
    pub fn urls(mut self, url_conf: URLResolver) -> Self {
        self.url_conf = Some(url_conf);
        self
    }

    /// Returns the settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns `true` if a URL configuration has been set.
    pub const fn has_urls(&self) -> bool {
        self.url_conf.is_some()
    }

    /// Converts the application into an axum router that sends every path
    /// through the URL resolver.
    pub fn into_axum_router(self) -> axum::Router {
        let url_conf = Arc::new(self.url_conf);

        let handler = move |req: Request<Body>| {
            let url_conf = Arc::clone(&url_conf);

            async move {
                let (parts, _body) = req.into_parts();
                let request = HttpRequest::from_axum(parts);
                let span = request_span(request.method().as_str(), request.path());

                async move {
                    let response = handle((*url_conf).as_ref(), request).await;
                    tracing::info!(status = response.status().as_u16(), "request finished");
                    response.into_response()
                }
                .instrument(span)
                .await
            }
        };

        axum::Router::new()
            .route("/{*path}", any(handler.clone()))
            .route("/", any(handler))
    }

    /// Serves the application on `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server fails.
    pub async fn run(self, addr: &str) -> CbvResult<()> {
        let debug = self.settings.debug;
        let router = self.into_axum_router();
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            CbvError::ImproperlyConfigured(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        } else {
            tracing::info!(%addr, "listening");
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| CbvError::InternalServerError(format!("Server error: {e}")))
    }
}

/// Resolves `request` and runs the matched view.
async fn handle(url_conf: Option<&URLResolver>, mut request: HttpRequest) -> HttpResponse {
    let Some(url_conf) = url_conf else {
        let err = CbvError::ImproperlyConfigured("No URL configuration provided".to_string());
        tracing::error!(error = %err, "cannot route request");
        return HttpResponse::from_error(&err);
    };

    match url_conf.resolve(request.path()) {
        Ok(resolver_match) => {
            tracing::debug!(
                route = %resolver_match.route,
                url_name = resolver_match.url_name.as_deref().unwrap_or(""),
                "resolved"
            );
            request.set_kwargs(resolver_match.kwargs);
            request.set_url_name(resolver_match.url_name);
            (resolver_match.func)(request).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "no route");
            HttpResponse::from_error(&err)
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("has_urls", &self.url_conf.is_some())
            .field("debug", &self.settings.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{RedirectView, View};
    use cbv_rs_http::urls::pattern::path;
    use http::StatusCode;
    use tower::ServiceExt;

    fn resolver() -> URLResolver {
        URLResolver::new(vec![
            path("", RedirectView::temporary("/books/").as_view(), Some("home")).unwrap(),
            path("gone/", RedirectView::gone().as_view(), None).unwrap(),
        ])
    }

    async fn send(router: axum::Router, method: http::Method, uri: &str) -> axum::response::Response {
        let request = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap()
    }

    #[test]
    fn test_app_new() {
        let app = App::new(Settings::default());
        assert!(!app.has_urls());
        assert!(app.settings().debug);
        assert!(App::new(Settings::default()).urls(resolver()).has_urls());
    }

    #[test]
    fn test_app_debug() {
        let debug = format!("{:?}", App::new(Settings::default()));
        assert!(debug.contains("App"));
        assert!(debug.contains("has_urls"));
    }

    #[tokio::test]
    async fn test_router_dispatches_root() {
        let router = App::new(Settings::default()).urls(resolver()).into_axum_router();
        let response = send(router, http::Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(http::header::LOCATION).unwrap(), "/books/");
    }

    #[tokio::test]
    async fn test_router_nested_path() {
        let router = App::new(Settings::default()).urls(resolver()).into_axum_router();
        let response = send(router, http::Method::GET, "/gone/").await;
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn test_router_unknown_path_is_404() {
        let router = App::new(Settings::default()).urls(resolver()).into_axum_router();
        let response = send(router, http::Method::GET, "/nowhere/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_router_without_urls_is_500() {
        let router = App::new(Settings::default()).into_axum_router();
        let response = send(router, http::Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_router_method_not_allowed() {
        let router = App::new(Settings::default()).urls(resolver()).into_axum_router();
        let response = send(router, http::Method::DELETE, "/").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key(http::header::ALLOW));
    }

    #[tokio::test]
    async fn test_run_invalid_address() {
        let result = App::new(Settings::default()).run("invalid-address").await;
        assert!(result.is_err());
    }
}
