//! Path matching against compiled templates.
//!
//! # Responsibilities
//! - Compare a request path with a route's segments
//! - Capture variable components by name
//!
//! # Design Decisions
//! - Segment counts must be equal (no prefix or wildcard matching)
//! - Literal comparison is case-insensitive
//! - An empty path component never matches, not even a variable
//! - No-match is a plain `None`, never an error

use crate::routing::fold_case;
use crate::routing::template::Segment;

/// Variables captured from a matched path.
///
/// Lookups ignore case; iteration follows template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    entries: Vec<(String, String)>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a capture, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let key = fold_case(&name);
        match self.entries.iter_mut().find(|(n, _)| fold_case(n) == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let key = fold_case(name);
        self.entries
            .iter()
            .find(|(n, _)| fold_case(n) == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Split a request path into components after trimming outer `/`.
pub fn path_components(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

/// Match `path` against `segments`, returning the captured variables.
pub fn try_match(segments: &[Segment], path: &str) -> Option<Captures> {
    let components = path_components(path);
    if components.len() != segments.len() {
        return None;
    }

    let mut captures = Captures::new();
    for (segment, component) in segments.iter().zip(components) {
        if component.is_empty() {
            return None;
        }
        match segment {
            Segment::Literal(text) => {
                if fold_case(text) != fold_case(component) {
                    return None;
                }
            }
            Segment::Variable(name) => captures.insert(name.as_str(), component),
        }
    }

    Some(captures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::template::compile;

    #[test]
    fn test_literal_match_ignores_case() {
        let segments = compile("docs/items/count").unwrap();
        assert!(try_match(&segments, "/DOCS/Items/count/").is_some());
        assert!(try_match(&segments, "docs/items/total").is_none());
    }

    #[test]
    fn test_variables_are_captured() {
        let segments = compile("licenses/{serialKey}/activationKey").unwrap();
        let captures = try_match(&segments, "licenses/abc/activationKey").unwrap();
        assert_eq!(captures.get("serialKey"), Some("abc"));
        assert_eq!(captures.get("SERIALKEY"), Some("abc"));
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_segment_count_must_match() {
        let segments = compile("{x}/{y}").unwrap();
        assert!(try_match(&segments, "a/b/c").is_none());
        assert!(try_match(&segments, "a").is_none());
        assert!(try_match(&segments, "").is_none());
        assert!(try_match(&segments, "a/b").is_some());
    }

    #[test]
    fn test_empty_component_never_matches() {
        let segments = compile("{x}/{y}/{z}").unwrap();
        assert!(try_match(&segments, "a//c").is_none());
    }

    #[test]
    fn test_captures_insert_replaces_existing() {
        let mut captures = Captures::new();
        captures.insert("id", "1");
        captures.insert("ID", "2");
        assert_eq!(captures.len(), 1);
        assert_eq!(captures.get("id"), Some("2"));
    }
}
