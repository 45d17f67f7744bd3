//! Request matching predicates.
//!
//! URL matching (exact or regex search) and the partial JSON body match used
//! by [`crate::mock::Mock::matches`].

use regex::Regex;
use serde_json::Value;

/// How a mock matches the request URL.
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    /// Exact string match
    Exact(String),
    /// Unanchored regex search
    Pattern(Regex),
}

impl UrlMatcher {
    /// Compile a regex URL matcher.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(UrlMatcher::Pattern)
    }

    /// Check a request URL against this matcher.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            UrlMatcher::Exact(value) => url == value,
            UrlMatcher::Pattern(regex) => regex.is_match(url),
        }
    }
}

impl PartialEq for UrlMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UrlMatcher::Exact(a), UrlMatcher::Exact(b)) => a == b,
            (UrlMatcher::Pattern(a), UrlMatcher::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Check a request body against a mock's expected body.
///
/// No expectation (`None`, `null` or `{}`) matches anything, including a
/// missing body. A scalar or array expectation must equal the body as a whole.
pub fn body_matches(expected: Option<&Value>, actual: Option<&Value>) -> bool {
    match expected {
        None | Some(Value::Null) => true,
        Some(Value::Object(keys)) if keys.is_empty() => true,
        Some(expected @ Value::Object(_)) => partial_match(expected, actual),
        Some(expected) => actual == Some(expected),
    }
}

/// Asymmetric subset match.
///
/// Every key of `expected` must be present in `actual` with an equal value, or,
/// where both sides hold an object, match recursively. Keys only present in
/// `actual` are ignored. `actual` must itself be an object.
pub fn partial_match(expected: &Value, actual: Option<&Value>) -> bool {
    let (Value::Object(expected), Some(Value::Object(actual))) = (expected, actual) else {
        return false;
    };

    expected.iter().all(|(key, want)| match (want, actual.get(key)) {
        (Value::Object(_), Some(got @ Value::Object(_))) => partial_match(want, Some(got)),
        (_, Some(got)) => want == got,
        (_, None) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exact_url_matching() {
        let matcher = UrlMatcher::Exact("/api/users".to_string());
        assert!(matcher.matches("/api/users"));
        assert!(!matcher.matches("/api/users/1"));
        assert!(!matcher.matches("/api/posts"));
    }

    #[test]
    fn test_pattern_url_is_a_search() {
        let matcher = UrlMatcher::pattern(r"users/\d+").unwrap();
        assert!(matcher.matches("/api/users/42"));
        assert!(matcher.matches("/api/users/42/orders"));
        assert!(!matcher.matches("/api/users/abc"));

        let anchored = UrlMatcher::pattern(r"^/api/users$").unwrap();
        assert!(anchored.matches("/api/users"));
        assert!(!anchored.matches("/v2/api/users"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(UrlMatcher::pattern("(unclosed").is_err());
    }

    #[test]
    fn test_no_body_expectation() {
        assert!(body_matches(None, None));
        assert!(body_matches(None, Some(&json!({"a": 1}))));
        assert!(body_matches(Some(&Value::Null), Some(&json!("text"))));
    }

    #[test]
    fn test_extra_keys_ignored() {
        let expected = json!({"a": 1});
        assert!(body_matches(Some(&expected), Some(&json!({"a": 1, "b": 2}))));
        assert!(!body_matches(Some(&expected), Some(&json!({"a": 2}))));
        assert!(!body_matches(Some(&expected), Some(&json!({}))));
    }

    #[test]
    fn test_non_object_candidates() {
        let expected = json!({"a": 1});
        assert!(!body_matches(Some(&expected), None));
        assert!(!body_matches(Some(&expected), Some(&json!([{"a": 1}]))));
        assert!(!body_matches(Some(&expected), Some(&json!("a"))));
        assert!(!body_matches(Some(&expected), Some(&Value::Null)));
    }

    #[test]
    fn test_nested_partial_match() {
        let expected = json!({"user": {"name": "John"}});
        let actual = json!({"user": {"name": "John", "age": 30}, "trace": "x"});
        assert!(body_matches(Some(&expected), Some(&actual)));

        let actual = json!({"user": {"name": "Jane"}});
        assert!(!body_matches(Some(&expected), Some(&actual)));

        let actual = json!({"user": "John"});
        assert!(!body_matches(Some(&expected), Some(&actual)));
    }

    #[test]
    fn test_arrays_compared_whole() {
        let expected = json!({"tags": ["a", "b"]});
        assert!(body_matches(Some(&expected), Some(&json!({"tags": ["a", "b"]}))));
        assert!(!body_matches(Some(&expected), Some(&json!({"tags": ["a"]}))));
    }

    #[test]
    fn test_empty_expectation_matches_anything() {
        let expected = json!({});
        assert!(body_matches(Some(&expected), Some(&json!({"x": true}))));
        assert!(body_matches(Some(&expected), Some(&json!(3))));
        assert!(body_matches(Some(&expected), None));
    }

    #[test]
    fn test_scalar_expectation_is_equality() {
        let expected = json!("ping");
        assert!(body_matches(Some(&expected), Some(&json!("ping"))));
        assert!(!body_matches(Some(&expected), Some(&json!("pong"))));
        assert!(!body_matches(Some(&expected), None));
    }

    #[test]
    fn test_null_value_must_be_present() {
        let expected = json!({"deleted": null});
        assert!(body_matches(Some(&expected), Some(&json!({"deleted": null}))));
        assert!(!body_matches(Some(&expected), Some(&json!({}))));
    }
}
