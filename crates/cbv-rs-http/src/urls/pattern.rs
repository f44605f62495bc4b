//! URL path pattern parsing and matching.
//!
//! Routes use `<type:name>` placeholders (`books/<int:year>/`). A bare
//! `<name>` is a `str` placeholder.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use regex::Regex;

use cbv_rs_core::{CbvError, CbvResult};

/// The type for route handler functions.
///
/// A handler is an async function that takes an [`HttpRequest`](crate::HttpRequest)
/// and returns an [`HttpResponse`](crate::HttpResponse).
pub type RouteHandler = Arc<dyn Fn(crate::HttpRequest) -> crate::BoxFuture + Send + Sync>;

/// The built-in path converters.
///
/// | Name   | Regex            |
/// |--------|------------------|
/// | `int`  | `[0-9]+`         |
/// | `str`  | `[^/]+`          |
/// | `slug` | `[-a-zA-Z0-9_]+` |
/// | `path` | `.+`             |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// One or more digits.
    Int,
    /// Any non-empty segment without a slash.
    Str,
    /// Letters, digits, hyphens and underscores.
    Slug,
    /// Any non-empty string, slashes included.
    Path,
}

impl Converter {
    /// Looks up a converter by the name used in route placeholders.
    pub fn from_name(name: &str) -> CbvResult<Self> {
        match name {
            "int" => Ok(Self::Int),
            "str" => Ok(Self::Str),
            "slug" => Ok(Self::Slug),
            "path" => Ok(Self::Path),
            other => Err(CbvError::ImproperlyConfigured(format!(
                "Unknown path converter: {other}"
            ))),
        }
    }

    /// Returns the regex fragment matched by this converter.
    pub const fn regex(self) -> &'static str {
        match self {
            Self::Int => "[0-9]+",
            Self::Str => "[^/]+",
            Self::Slug => "[-a-zA-Z0-9_]+",
            Self::Path => ".+",
        }
    }
}

/// A single URL pattern that matches a path and invokes a handler.
pub struct URLPattern {
    route: String,
    regex: Regex,
    name: Option<String>,
    converters: Vec<(String, Converter)>,
    callback: RouteHandler,
}

impl fmt::Debug for URLPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("URLPattern")
            .field("route", &self.route)
            .field("regex", &self.regex.as_str())
            .field("name", &self.name)
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}

impl URLPattern {
    /// Returns the original route string.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the optional name for this pattern.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the named converters for this pattern, in route order.
    pub fn converters(&self) -> &[(String, Converter)] {
        &self.converters
    }

    /// Returns a reference to the callback handler.
    pub fn callback(&self) -> &RouteHandler {
        &self.callback
    }

    /// Matches the whole of `path` (without leading slash) against this pattern.
    ///
    /// Returns the captured keyword arguments, or `None` on mismatch.
    pub fn full_match(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        let kwargs = self
            .converters
            .iter()
            .filter_map(|(name, _)| {
                captures
                    .name(name)
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect();
        Some(kwargs)
    }
}

/// Splits a `<type:name>` placeholder into `(type_name, param_name)`.
fn parse_type_and_name(inner: &str) -> (&str, &str) {
    inner
        .find(':')
        .map_or(("str", inner), |pos| (&inner[..pos], &inner[pos + 1..]))
}

/// A parsed piece of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Literal text matched verbatim.
    Literal(&'a str),
    /// A `<type:name>` placeholder.
    Param(Converter, &'a str),
}

/// Splits a route into literal text and placeholders.
pub(crate) fn parse_route(route: &str) -> CbvResult<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut remaining = route;

    while let Some(start) = remaining.find('<') {
        if start > 0 {
            segments.push(Segment::Literal(&remaining[..start]));
        }

        let end = remaining[start..].find('>').ok_or_else(|| {
            CbvError::ImproperlyConfigured(format!("Unclosed angle bracket in route: {route}"))
        })? + start;

        let (type_name, param_name) = parse_type_and_name(&remaining[start + 1..end]);
        segments.push(Segment::Param(Converter::from_name(type_name)?, param_name));

        remaining = &remaining[end + 1..];
    }

    if !remaining.is_empty() {
        segments.push(Segment::Literal(remaining));
    }
    Ok(segments)
}

/// Creates a URL pattern from a route such as `"books/<int:year>/"`.
///
/// Routes are written without a leading slash.
///
/// # Errors
///
/// Returns [`CbvError::ImproperlyConfigured`] for unknown converters, unclosed
/// placeholders, or duplicate parameter names.
pub fn path(route: &str, callback: RouteHandler, name: Option<&str>) -> CbvResult<URLPattern> {
    let mut regex_str = String::from("^");
    let mut converters: Vec<(String, Converter)> = Vec::new();

    for segment in parse_route(route)? {
        match segment {
            Segment::Literal(literal) => regex_str.push_str(&regex::escape(literal)),
            Segment::Param(converter, param_name) => {
                if converters.iter().any(|(n, _)| n == param_name) {
                    return Err(CbvError::ImproperlyConfigured(format!(
                        "Duplicate parameter '{param_name}' in route: {route}"
                    )));
                }
                write!(regex_str, "(?P<{param_name}>{})", converter.regex()).ok();
                converters.push((param_name.to_string(), converter));
            }
        }
    }
    regex_str.push('$');

    let regex = Regex::new(&regex_str)
        .map_err(|e| CbvError::ImproperlyConfigured(format!("Invalid pattern regex: {e}")))?;

    Ok(URLPattern {
        route: route.to_string(),
        regex,
        name: name.map(String::from),
        converters,
        callback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_handler() -> RouteHandler {
        Arc::new(|_req| Box::pin(async { crate::HttpResponse::ok("ok") }))
    }

    #[test]
    fn test_path_no_params() {
        let p = path("books/", dummy_handler(), Some("book-list")).unwrap();
        assert_eq!(p.name(), Some("book-list"));
        assert_eq!(p.full_match("books/"), Some(HashMap::new()));
        assert!(p.full_match("books/extra/").is_none());
    }

    #[test]
    fn test_path_int_param() {
        let p = path("books/<int:year>/", dummy_handler(), None).unwrap();
        let kwargs = p.full_match("books/1999/").unwrap();
        assert_eq!(kwargs["year"], "1999");
        assert!(p.full_match("books/ninety/").is_none());
    }

    #[test]
    fn test_path_default_str_converter() {
        let p = path("authors/<name>/", dummy_handler(), None).unwrap();
        assert_eq!(p.converters()[0].1, Converter::Str);
        assert_eq!(p.full_match("authors/le guin/").unwrap()["name"], "le guin");
        assert!(p.full_match("authors/a/b/").is_none());
    }

    #[test]
    fn test_path_slug_and_path() {
        let p = path("<slug:shelf>/<path:rest>", dummy_handler(), None).unwrap();
        let kwargs = p.full_match("sci-fi/a/b/c").unwrap();
        assert_eq!(kwargs["shelf"], "sci-fi");
        assert_eq!(kwargs["rest"], "a/b/c");
    }

    #[test]
    fn test_literal_is_escaped() {
        let p = path("feed.xml", dummy_handler(), None).unwrap();
        assert!(p.full_match("feed.xml").is_some());
        assert!(p.full_match("feedXxml").is_none());
    }

    #[test]
    fn test_unknown_converter() {
        let err = path("<uuid:id>/", dummy_handler(), None).unwrap_err();
        assert!(matches!(err, CbvError::ImproperlyConfigured(_)));
    }

    #[test]
    fn test_unclosed_placeholder() {
        assert!(path("books/<int:year/", dummy_handler(), None).is_err());
    }

    #[test]
    fn test_parse_route_segments() {
        let segments = parse_route("books/<int:year>/<slug>").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("books/"),
                Segment::Param(Converter::Int, "year"),
                Segment::Literal("/"),
                Segment::Param(Converter::Str, "slug"),
            ]
        );
    }

    #[test]
    fn test_duplicate_param() {
        assert!(path("<id>/<int:id>/", dummy_handler(), None).is_err());
    }
}
