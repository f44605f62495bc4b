//! URL resolution.
//!
//! [`URLResolver`] holds an ordered list of [`URLPattern`]s. The first pattern
//! that fully matches a request path wins.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use cbv_rs_core::{CbvError, CbvResult};

use super::pattern::{parse_route, RouteHandler, Segment, URLPattern};

/// The result of resolving a path: the handler plus captured keyword arguments.
#[derive(Clone)]
pub struct ResolverMatch {
    /// The handler function to call.
    pub func: RouteHandler,
    /// Named keyword arguments extracted from the URL path.
    pub kwargs: HashMap<String, String>,
    /// The name of the matched URL pattern, if any.
    pub url_name: Option<String>,
    /// The matched route string.
    pub route: String,
}

impl fmt::Debug for ResolverMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverMatch")
            .field("kwargs", &self.kwargs)
            .field("url_name", &self.url_name)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// An ordered collection of URL patterns.
#[derive(Debug, Default)]
pub struct URLResolver {
    patterns: Vec<URLPattern>,
}

impl URLResolver {
    /// Creates a resolver over the given patterns.
    pub fn new(patterns: Vec<URLPattern>) -> Self {
        Self { patterns }
    }

    /// Appends a pattern.
    pub fn add(&mut self, pattern: URLPattern) {
        self.patterns.push(pattern);
    }

    /// Returns the number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if no patterns are registered.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Resolves a request path to a handler and keyword arguments.
    ///
    /// A leading `/` is ignored, since routes are written without one.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::NotFound`] when no pattern matches.
    pub fn resolve(&self, path: &str) -> CbvResult<ResolverMatch> {
        let path = path.strip_prefix('/').unwrap_or(path);

        self.patterns
            .iter()
            .find_map(|pattern| {
                pattern.full_match(path).map(|kwargs| ResolverMatch {
                    func: pattern.callback().clone(),
                    kwargs,
                    url_name: pattern.name().map(String::from),
                    route: pattern.route().to_string(),
                })
            })
            .ok_or_else(|| CbvError::NotFound(format!("No URL pattern matches '/{path}'")))
    }

    /// Builds the URL for a named pattern, substituting keyword arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::NotFound`] if no pattern has that name, an argument is
    /// missing, or a value does not satisfy its converter.
    pub fn reverse<S: BuildHasher>(
        &self,
        name: &str,
        kwargs: &HashMap<&str, &str, S>,
    ) -> CbvResult<String> {
        let pattern = self
            .patterns
            .iter()
            .find(|p| p.name() == Some(name))
            .ok_or_else(|| CbvError::NotFound(format!("Reverse for '{name}' not found")))?;

        let mut url = String::from("/");
        for segment in parse_route(pattern.route())? {
            match segment {
                Segment::Literal(literal) => url.push_str(literal),
                Segment::Param(converter, param) => {
                    let value = kwargs.get(param).ok_or_else(|| {
                        CbvError::NotFound(format!(
                            "Reverse for '{name}' is missing argument '{param}'"
                        ))
                    })?;
                    let valid = regex::Regex::new(&format!("^(?:{})$", converter.regex()))
                        .is_ok_and(|re| re.is_match(value));
                    if !valid {
                        return Err(CbvError::NotFound(format!(
                            "Reverse for '{name}' with {param}='{value}' does not match the route"
                        )));
                    }
                    url.push_str(value);
                }
            }
        }
        Ok(url)
    }
}
