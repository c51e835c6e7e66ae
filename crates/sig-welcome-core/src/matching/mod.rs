//! Path pattern matching for relation rules.
//!
//! Relation documents attribute files to owners with loose path patterns:
//!
//! - A pattern without the wildcard segment matches any path that contains it
//!   as a substring (no anchoring at either end)
//! - `/*/` stands for one path segment of one or more non-whitespace
//!   characters; such patterns are turned into a regular expression and
//!   searched for anywhere in the path

use regex::Regex;
use thiserror::Error;

/// The wildcard segment marker.
pub const WILDCARD_SEGMENT: &str = "/*/";

/// What the wildcard segment becomes in the compiled expression.
const WILDCARD_EXPANSION: &str = r"/[^\s]+/";

/// A pattern that could not be compiled.
#[derive(Debug, Clone, Error)]
#[error("invalid path pattern '{pattern}': {source}")]
pub struct PatternError {
    /// The pattern as written in the document.
    pub pattern: String,
    /// The regex compilation failure.
    #[source]
    pub source: regex::Error,
}

#[derive(Debug, Clone)]
enum Matcher {
    Substring,
    Segment(Regex),
}

/// A compiled relation path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    original: String,
    matcher: Matcher,
}

impl PathPattern {
    /// Compiles a relation path pattern.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let matcher = if has_wildcard_segment(pattern) {
            let expression = pattern.replace(WILDCARD_SEGMENT, WILDCARD_EXPANSION);
            let regex = Regex::new(&expression).map_err(|source| PatternError {
                pattern: pattern.to_string(),
                source,
            })?;
            Matcher::Segment(regex)
        } else {
            Matcher::Substring
        };

        Ok(Self {
            original: pattern.to_string(),
            matcher,
        })
    }

    /// Returns the original pattern string.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Returns true if this pattern uses the wildcard segment.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.matcher, Matcher::Segment(_))
    }

    /// Checks if this pattern matches the given changed path.
    pub fn matches(&self, changed_path: &str) -> bool {
        match &self.matcher {
            Matcher::Substring => changed_path.contains(self.original.as_str()),
            Matcher::Segment(regex) => regex.is_match(changed_path),
        }
    }
}

/// Returns true if `pattern` contains the `/*/` wildcard segment.
pub fn has_wildcard_segment(pattern: &str) -> bool {
    pattern.contains(WILDCARD_SEGMENT)
}

/// Tests a single changed path against a single pattern.
///
/// Prefer [`PathPattern::compile`] when the same pattern is tested against
/// many paths.
pub fn matches(changed_path: &str, pattern: &str) -> Result<bool, PatternError> {
    Ok(PathPattern::compile(pattern)?.matches(changed_path))
}
