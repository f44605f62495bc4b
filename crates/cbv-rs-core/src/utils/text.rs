//! String utility functions.

/// Converts a `CamelCase` identifier to `snake_case`.
///
/// An underscore is inserted before an uppercase letter that follows a
/// lowercase letter or digit, and before the last capital of an acronym
/// that starts a new word. Existing underscores are kept and never doubled.
///
/// # Examples
///
/// ```
/// use cbv_rs_core::utils::text::camelcase_to_underscore;
///
/// assert_eq!(camelcase_to_underscore("BlogPost"), "blog_post");
/// assert_eq!(camelcase_to_underscore("HTTPRequest"), "http_request");
/// assert_eq!(camelcase_to_underscore("book"), "book");
/// ```
pub fn camelcase_to_underscore(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out.trim_matches('_').to_string()
}
