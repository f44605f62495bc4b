//! HTTP request type.
//!
//! [`HttpRequest`] carries what a generic view needs from an incoming
//! request: the method, path, headers, decoded query-string parameters, and
//! the keyword arguments captured by the URL resolver.

use std::collections::HashMap;

use http::{HeaderMap, Method};

use crate::querydict::QueryDict;

/// An incoming HTTP request as seen by a view.
///
/// Instances are created from an axum request via [`HttpRequest::from_axum`],
/// or with [`HttpRequest::builder`] in tests.
///
/// # Examples
///
/// ```
/// use cbv_rs_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/books/")
///     .query_string("page=2")
///     .kwarg("genre", "poetry")
///     .build();
///
/// assert_eq!(request.path(), "/books/");
/// assert_eq!(request.get().get("page"), Some("2"));
/// assert_eq!(request.kwargs().get("genre").map(String::as_str), Some("poetry"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    get: QueryDict,
    headers: HeaderMap,
    kwargs: HashMap<String, String>,
    url_name: Option<String>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from the head of an axum/hyper request.
    ///
    /// URL keyword arguments are empty until the resolver attaches them with
    /// [`set_kwargs`](Self::set_kwargs).
    pub fn from_axum(parts: http::request::Parts) -> Self {
        let path = parts.uri.path().to_string();
        let query_string = parts.uri.query().unwrap_or("").to_string();
        let get = QueryDict::parse(&query_string);

        Self {
            method: parts.method,
            path,
            query_string,
            get,
            headers: parts.headers,
            kwargs: HashMap::new(),
            url_name: None,
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the decoded query-string parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the keyword arguments captured from the URL path.
    pub const fn kwargs(&self) -> &HashMap<String, String> {
        &self.kwargs
    }

    /// Attaches the keyword arguments captured by the URL resolver.
    pub fn set_kwargs(&mut self, kwargs: HashMap<String, String>) {
        self.kwargs = kwargs;
    }

    /// Returns the name of the matched URL pattern, if any.
    pub fn url_name(&self) -> Option<&str> {
        self.url_name.as_deref()
    }

    /// Records the name of the matched URL pattern.
    pub fn set_url_name(&mut self, name: Option<String>) {
        self.url_name = name;
    }

    /// Returns the full path including the query string.
    pub fn get_full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }
}

/// Builder for constructing [`HttpRequest`] instances without an axum request.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    headers: HeaderMap,
    kwargs: HashMap<String, String>,
    url_name: Option<String>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            headers: HeaderMap::new(),
            kwargs: HashMap::new(),
            url_name: None,
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Adds a URL keyword argument.
    #[must_use]
    pub fn kwarg(mut self, key: &str, value: &str) -> Self {
        self.kwargs.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the matched URL pattern name.
    #[must_use]
    pub fn url_name(mut self, name: &str) -> Self {
        self.url_name = Some(name.to_string());
        self
    }

    /// Builds the [`HttpRequest`].
    pub fn build(self) -> HttpRequest {
        let get = QueryDict::parse(&self.query_string);

        HttpRequest {
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            get,
            headers: self.headers,
            kwargs: self.kwargs,
            url_name: self.url_name,
        }
    }
}
