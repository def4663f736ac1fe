//! Mount rule matching.
//!
//! # Responsibilities
//! - Match the request path against a context path at a segment boundary
//! - Match the remainder against a URL pattern (index, exact, wildcard)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/foo/*` matches `/foo` itself and anything below it
//! - The empty pattern matches only the context root
//! - No regex to guarantee O(n) matching

use std::fmt;

/// URL pattern evaluated against the path remaining after the context path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// `""`: the context root only.
    Index,
    /// `/features`: one exact path.
    Exact(String),
    /// `/foo/*`, stored without the `/*` suffix. `/*` stores the empty stem.
    Wildcard(String),
}

impl UrlPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern.is_empty() {
            UrlPattern::Index
        } else if let Some(stem) = pattern.strip_suffix("/*") {
            UrlPattern::Wildcard(stem.to_string())
        } else {
            UrlPattern::Exact(pattern.to_string())
        }
    }

    /// `rest` is either empty or starts with `/`.
    pub fn matches(&self, rest: &str) -> bool {
        match self {
            UrlPattern::Index => rest.is_empty() || rest == "/",
            UrlPattern::Exact(path) => rest == path,
            UrlPattern::Wildcard(stem) => match rest.strip_prefix(stem.as_str()) {
                Some(tail) => tail.is_empty() || tail.starts_with('/'),
                None => false,
            },
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlPattern::Index => Ok(()),
            UrlPattern::Exact(path) => f.write_str(path),
            UrlPattern::Wildcard(stem) => write!(f, "{}/*", stem),
        }
    }
}

/// A (context path, URL pattern) registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRule {
    context_path: String,
    url_pattern: UrlPattern,
}

impl MountRule {
    /// Create a rule. A context path of `/` is normalized to the empty root
    /// and a trailing slash is dropped.
    pub fn new(context_path: impl Into<String>, url_pattern: &str) -> Self {
        let mut context_path = context_path.into();
        if context_path.ends_with('/') {
            context_path.pop();
        }

        Self {
            context_path,
            url_pattern: UrlPattern::parse(url_pattern),
        }
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn url_pattern(&self) -> &UrlPattern {
        &self.url_pattern
    }

    /// Match a request path, returning the part after the context path.
    pub fn resolve<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.context_path.as_str())?;
        if !rest.is_empty() && !rest.starts_with('/') {
            // `/app` must not claim `/apple`
            return None;
        }

        self.url_pattern.matches(rest).then_some(rest)
    }
}

impl fmt::Display for MountRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.context_path, self.url_pattern)
    }
}
