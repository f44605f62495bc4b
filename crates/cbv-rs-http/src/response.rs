//! HTTP response types.
//!
//! This module provides [`HttpResponse`] and helpers for the responses the
//! generic views produce: rendered pages, redirects, and error statuses.

use axum::response::IntoResponse;
use http::{HeaderMap, HeaderValue, StatusCode};

use cbv_rs_core::{CbvError, CbvResult};

/// An HTTP response produced by a view.
///
/// Converts into an axum response via [`IntoResponse`].
///
/// # Examples
///
/// ```
/// use cbv_rs_http::HttpResponse;
///
/// let response = HttpResponse::ok("Hello, World!");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.text(), "Hello, World!");
/// ```
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: Vec<u8>,
    charset: String,
    content_type: String,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content.len())
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    /// Creates a new `text/html` response with the given status code and body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: body.into().into_bytes(),
            charset: "utf-8".to_string(),
            content_type: "text/html".to_string(),
        }
    }

    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 405 Method Not Allowed response with an `Allow` header.
    pub fn not_allowed(permitted_methods: &[&str]) -> Self {
        let allow = permitted_methods.join(", ");
        let mut response = Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method Not Allowed. Permitted: {allow}"),
        );
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers.insert(http::header::ALLOW, value);
        }
        response
    }

    /// Builds the response a host returns for an unhandled view error.
    ///
    /// The status comes from [`CbvError::status_code`]. Server-side failures
    /// get a generic body so configuration details are not leaked to clients.
    pub fn from_error(error: &CbvError) -> Self {
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            return Self::new(status, "<h1>Internal Server Error</h1>");
        }
        let reason = status.canonical_reason().unwrap_or("Error");
        Self::new(status, format!("<h1>{reason}</h1>"))
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the `Location` header, if this is a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the content type (without charset).
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the body bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Returns the full content type header value including charset.
    fn full_content_type(&self) -> String {
        if self.content_type.starts_with("text/") || self.content_type.contains("json") {
            format!("{}; charset={}", self.content_type, self.charset)
        } else {
            self.content_type.clone()
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let content_type = self.full_content_type();
        let mut response = (self.status, self.content).into_response();

        if let Ok(ct) = HeaderValue::from_str(&content_type) {
            response.headers_mut().insert(http::header::CONTENT_TYPE, ct);
        }
        for (key, value) in &self.headers {
            response.headers_mut().insert(key, value.clone());
        }
        response
    }
}

fn redirect(status: StatusCode, url: &str) -> CbvResult<HttpResponse> {
    let location = HeaderValue::from_str(url).map_err(|e| {
        CbvError::InternalServerError(format!("Invalid redirect target {url:?}: {e}"))
    })?;
    let mut response = HttpResponse::new(status, "");
    response.headers.insert(http::header::LOCATION, location);
    Ok(response)
}

/// An HTTP redirect response (302 Found).
pub struct HttpResponseRedirect;

impl HttpResponseRedirect {
    /// Creates a 302 Found redirect to the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::InternalServerError`] if `url` cannot be sent as a
    /// `Location` header.
    pub fn new(url: &str) -> CbvResult<HttpResponse> {
        redirect(StatusCode::FOUND, url)
    }
}

/// An HTTP permanent redirect response (301 Moved Permanently).
pub struct HttpResponsePermanentRedirect;

impl HttpResponsePermanentRedirect {
    /// Creates a 301 Moved Permanently redirect to the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::InternalServerError`] if `url` cannot be sent as a
    /// `Location` header.
    pub fn new(url: &str) -> CbvResult<HttpResponse> {
        redirect(StatusCode::MOVED_PERMANENTLY, url)
    }
}
