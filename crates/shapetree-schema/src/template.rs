//! Level-1 URI templates as used by `tree:matchesUriTemplate`.

use std::fmt;

use regex_lite::Regex;

use crate::error::{SchemaError, SchemaResult};

/// A compiled template such as `{issue}` or `issue-{n}.ttl`.
///
/// Each `{var}` matches exactly one non-empty path segment. Matching ignores
/// a single trailing `/` on the candidate so container names match too.
#[derive(Clone, Debug)]
pub struct UriTemplate {
    source: String,
    variables: Vec<String>,
    pattern: Regex,
}

impl UriTemplate {
    pub fn parse(source: &str) -> SchemaResult<Self> {
        let invalid = |reason: &str| SchemaError::Template {
            template: source.to_string(),
            reason: reason.to_string(),
        };
        let mut pattern = String::from("^");
        let mut variables = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find('{') {
            let (literal, tail) = rest.split_at(open);
            if literal.contains('}') {
                return Err(invalid("unbalanced '}'"));
            }
            pattern.push_str(&regex_lite::escape(literal));
            let close = tail.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
            let name = &tail[1..close];
            if name.is_empty() {
                return Err(invalid("empty variable"));
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("only level-1 variables are supported"));
            }
            variables.push(name.to_string());
            pattern.push_str("([^/]+)");
            rest = &tail[close + 1..];
        }
        if rest.contains('}') {
            return Err(invalid("unbalanced '}'"));
        }
        pattern.push_str(&regex_lite::escape(rest));
        pattern.push('$');
        let pattern = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            variables,
            pattern,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.strip_suffix('/').unwrap_or(name);
        !name.is_empty() && self.pattern.is_match(name)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_variable_matches_one_segment() {
        let t = UriTemplate::parse("{issue}").unwrap();
        assert!(t.matches("42"));
        assert!(t.matches("proj1/"));
        assert!(!t.matches(""));
        assert!(!t.matches("a/b"));
        assert_eq!(t.variables(), ["issue"]);
    }

    #[test]
    fn literals_are_not_regex() {
        let t = UriTemplate::parse("issue-{n}.ttl").unwrap();
        assert!(t.matches("issue-7.ttl"));
        assert!(!t.matches("issue-7xttl"));
        assert!(!t.matches("bug-7.ttl"));
    }

    #[test]
    fn malformed_templates() {
        for bad in ["{", "{}", "a}", "{a,b}", "{+x}"] {
            assert!(UriTemplate::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn plain_literal_template() {
        let t = UriTemplate::parse("README").unwrap();
        assert!(t.matches("README"));
        assert!(!t.matches("README2"));
    }
}
