//! Query string dictionary for HTTP request parameters.
//!
//! [`QueryDict`] holds the decoded query-string parameters of a request. A key
//! may carry several values (`?tag=a&tag=b`); [`QueryDict::get`] returns the
//! last one, [`QueryDict::get_list`] returns them all.

use std::collections::HashMap;

/// A multi-valued dictionary for query string data.
///
/// # Examples
///
/// ```
/// use cbv_rs_http::QueryDict;
///
/// let qd = QueryDict::parse("sort_by=-name&page=2&tag=a&tag=b");
/// assert_eq!(qd.get("page"), Some("2"));
/// assert_eq!(qd.get("sort_by"), Some("-name"));
/// assert_eq!(qd.get_list("tag"), Some(&vec!["a".to_string(), "b".to_string()]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    data: HashMap<String, Vec<String>>,
}

impl QueryDict {
    /// Creates a new, empty `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL query string (e.g., `"key1=val1&key2=val2"`).
    ///
    /// Handles percent-encoding, `+` as space, and multiple values per key.
    pub fn parse(query_string: &str) -> Self {
        let mut qd = Self::new();

        for pair in query_string.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq_pos| (&pair[..eq_pos], &pair[eq_pos + 1..]));

            qd.append(&percent_decode(key), &percent_decode(value));
        }

        qd
    }

    /// Returns the last value for the given key, or `None` if not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns all values for the given key, or `None` if not present.
    pub fn get_list(&self, key: &str) -> Option<&Vec<String>> {
        self.data.get(key)
    }

    /// Sets a single value for the given key, replacing any existing values.
    pub fn set(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), vec![value.to_string()]);
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: &str, value: &str) {
        self.data
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Removes a key and all its values, returning them.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.data.remove(key)
    }

    /// Encodes this `QueryDict` as a URL query string.
    ///
    /// Pairs are percent-encoded and sorted so the output is deterministic.
    pub fn urlencode(&self) -> String {
        let mut parts: Vec<String> = self
            .data
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", percent_encode(key), percent_encode(value)))
            })
            .collect();

        parts.sort();
        parts.join("&")
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the `QueryDict` contains no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the specified key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }
}

/// Decodes a percent-encoded string.
fn percent_decode(input: &str) -> String {
    // `+` is a space in form encoding
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Percent-encodes a string for use in a URL query.
fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let qd = QueryDict::new();
        assert!(qd.is_empty());
        assert_eq!(qd.len(), 0);
    }

    #[test]
    fn test_parse_simple() {
        let qd = QueryDict::parse("page=3");
        assert_eq!(qd.get("page"), Some("3"));
        assert_eq!(qd.len(), 1);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(QueryDict::parse("").is_empty());
        assert!(QueryDict::parse("&&").is_empty());
    }

    #[test]
    fn test_parse_key_without_value() {
        let qd = QueryDict::parse("sort_by");
        assert_eq!(qd.get("sort_by"), Some(""));
    }

    #[test]
    fn test_parse_multiple_values_last_wins() {
        let qd = QueryDict::parse("page=1&page=2");
        assert_eq!(qd.get("page"), Some("2"));
        assert_eq!(qd.get_list("page").unwrap().len(), 2);
    }

    #[test]
    fn test_parse_percent_encoded() {
        let qd = QueryDict::parse("q=hello%20world&name=a+b&sort_by=%2Dtitle");
        assert_eq!(qd.get("q"), Some("hello world"));
        assert_eq!(qd.get("name"), Some("a b"));
        assert_eq!(qd.get("sort_by"), Some("-title"));
    }

    #[test]
    fn test_set_replaces() {
        let mut qd = QueryDict::parse("page=1&page=2");
        qd.set("page", "5");
        assert_eq!(qd.get_list("page"), Some(&vec!["5".to_string()]));
    }

    #[test]
    fn test_remove() {
        let mut qd = QueryDict::parse("page=1&sort_by=name");
        assert_eq!(qd.remove("page"), Some(vec!["1".to_string()]));
        assert!(!qd.contains_key("page"));
        assert!(qd.contains_key("sort_by"));
    }

    #[test]
    fn test_urlencode_sorted_and_escaped() {
        let mut qd = QueryDict::new();
        qd.append("sort_by", "-name");
        qd.append("page", "2");
        qd.append("q", "a b");
        assert_eq!(qd.urlencode(), "page=2&q=a%20b&sort%5Fby=%2Dname");
    }
}
