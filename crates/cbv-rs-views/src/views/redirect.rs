//! `RedirectView`: permanent or temporary redirects, or 410 Gone.

use std::collections::HashMap;

use async_trait::async_trait;

use cbv_rs_core::{CbvError, CbvResult};
use cbv_rs_http::{HttpRequest, HttpResponse, HttpResponsePermanentRedirect, HttpResponseRedirect};

use super::base::View;
use super::config::ViewConfig;

/// Redirect behavior shared by redirecting views.
///
/// Override [`get_redirect_url`](Self::get_redirect_url) to compute the
/// target from the URL keyword arguments.
pub trait RedirectMixin: View {
    /// The configured static target.
    fn url(&self) -> Option<&str> {
        None
    }

    /// Whether to answer 301 rather than 302.
    fn permanent(&self) -> bool {
        true
    }

    /// The redirect target, or `None` when the resource is gone.
    fn get_redirect_url(&self, _kwargs: &HashMap<String, String>) -> Option<String> {
        self.url().filter(|url| !url.is_empty()).map(ToString::to_string)
    }

    /// Builds the redirect for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::Gone`] when there is no target, and
    /// [`CbvError::InternalServerError`] when the target is not a valid
    /// `Location` value.
    fn redirect(&self, request: &HttpRequest) -> CbvResult<HttpResponse> {
        let Some(url) = self.get_redirect_url(request.kwargs()) else {
            tracing::debug!(path = request.path(), "redirect has no target; gone");
            return Err(CbvError::Gone);
        };

        tracing::debug!(from = request.path(), to = %url, permanent = self.permanent(), "redirecting");
        if self.permanent() {
            HttpResponsePermanentRedirect::new(&url)
        } else {
            HttpResponseRedirect::new(&url)
        }
    }
}

/// Redirects GET requests to a fixed URL.
///
/// # Examples
///
/// ```
/// use cbv_rs_views::RedirectView;
///
/// let moved = RedirectView::new("/library/");
/// assert!(moved.is_permanent());
///
/// let temporary = RedirectView::temporary("/maintenance/");
/// assert!(!temporary.is_permanent());
/// ```
#[derive(Debug, Clone)]
pub struct RedirectView {
    url: Option<String>,
    permanent: bool,
}

impl RedirectView {
    /// A permanent (301) redirect to `url`.
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            permanent: true,
        }
    }

    /// A temporary (302) redirect to `url`.
    pub fn temporary(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            permanent: false,
        }
    }

    /// A view that answers 410 Gone.
    pub const fn gone() -> Self {
        Self {
            url: None,
            permanent: true,
        }
    }

    /// Creates a view from the `url` and `permanent` of `config`.
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            url: config.url.clone(),
            permanent: config.permanent,
        }
    }

    /// Returns whether the redirect is permanent.
    pub const fn is_permanent(&self) -> bool {
        self.permanent
    }
}

impl RedirectMixin for RedirectView {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn permanent(&self) -> bool {
        self.permanent
    }
}

#[async_trait]
impl View for RedirectView {
    async fn get(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        self.redirect(&request)
    }
}
