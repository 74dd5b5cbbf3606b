//! Route pattern compilation and location parsing.
//!
//! A pattern is a path template made of `/`-separated segments. A segment of the
//! form `:name` captures exactly one non-empty, slash-free path segment; every
//! other segment is matched literally (regex metacharacters are escaped).
//!
//! | Pattern        | Regex                  |
//! |----------------|------------------------|
//! | `/`            | `^/$`                  |
//! | `/dog/:slug`   | `^/dog/([^/]+)$`       |
//! | `/a.b/:x/c`    | `^/a\.b/([^/]+)/c$`    |

use crate::domain::error::{PawfeedError, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Path and query strings to parameter maps.
pub type Params = BTreeMap<String, String>;

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compiles a path template.
    ///
    /// # Errors
    ///
    /// Returns [`PawfeedError::Route`] if the resulting expression does not compile.
    ///
    /// # Example
    ///
    /// ```
    /// use pawfeed::navigation::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("/dog/:slug")?;
    /// let params = pattern.captures("/dog/nelli-1").unwrap();
    /// assert_eq!(params["slug"], "nelli-1");
    /// assert!(pattern.captures("/dog/nelli-1/photos").is_none());
    /// # Ok::<(), pawfeed::PawfeedError>(())
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut param_names = Vec::new();
        let body = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => {
                    param_names.push(name.to_string());
                    "([^/]+)".to_string()
                }
                _ => regex::escape(segment),
            })
            .collect::<Vec<_>>()
            .join("/");

        let regex = Regex::new(&format!("^{body}$"))
            .map_err(|e| PawfeedError::Route(format!("invalid pattern {pattern:?}: {e}")))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// The template this pattern was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter names in the order they appear in the template.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Matches `path` and returns its parameters, or `None` if it does not match.
    ///
    /// `path` must not include the query string.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let params = self
            .param_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name.clone(), m.as_str().to_string())))
            .collect();
        Some(params)
    }
}

/// Splits a location into its path and query string, dropping any fragment.
///
/// ```
/// use pawfeed::navigation::split_location;
///
/// assert_eq!(split_location("/messages?tab=unread#top"), ("/messages", "tab=unread"));
/// assert_eq!(split_location("/"), ("/", ""));
/// ```
#[must_use]
pub fn split_location(location: &str) -> (&str, &str) {
    let without_fragment = location.split_once('#').map_or(location, |(head, _)| head);
    without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""))
}

/// Parses a query string into a flat map. On duplicate keys the last value wins.
#[must_use]
pub fn parse_query(query: &str) -> Params {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_pattern_matches_only_root() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert_eq!(pattern.captures("/"), Some(Params::new()));
        assert!(pattern.captures("/dog").is_none());
        assert!(pattern.captures("").is_none());
    }

    #[test]
    fn params_follow_template_order() {
        let pattern = RoutePattern::parse("/dog/:slug/health/:record").unwrap();
        assert_eq!(pattern.param_names(), ["slug", "record"]);

        let params = pattern.captures("/dog/rex/health/42").unwrap();
        assert_eq!(params["slug"], "rex");
        assert_eq!(params["record"], "42");
    }

    #[test]
    fn literal_segments_are_escaped() {
        let pattern = RoutePattern::parse("/v1.0/:id").unwrap();
        assert!(pattern.captures("/v1.0/5").is_some());
        assert!(pattern.captures("/v1x0/5").is_none());
    }

    #[test]
    fn captures_never_span_slashes() {
        let pattern = RoutePattern::parse("/a/:x").unwrap();
        assert_eq!(pattern.captures("/a/5").unwrap()["x"], "5");
        assert!(pattern.captures("/a/5/6").is_none());
        assert!(pattern.captures("/a/").is_none());
    }

    #[test]
    fn duplicate_query_keys_keep_last_value() {
        let query = parse_query("tab=all&tab=unread&q=golden%20retriever");
        assert_eq!(query["tab"], "unread");
        assert_eq!(query["q"], "golden retriever");
    }

    #[test]
    fn empty_query_is_empty_map() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }
}
