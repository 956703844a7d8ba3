//! Route table and lookup.
//!
//! # Responsibilities
//! - Store compiled routes partitioned by method
//! - Keep each partition sorted by route priority
//! - Look up the most specific route for a request
//!
//! # Design Decisions
//! - Mutable only through `register`; shared as `Arc` once built, so lookups
//!   need no locks
//! - Insertion is stable: equal-priority routes keep registration order
//! - A failed registration leaves the table untouched
//! - Explicit `None` on no match rather than a silent default

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::routing::fold_case;
use crate::routing::matcher::{try_match, Captures};
use crate::routing::priority::compare;
use crate::routing::template::{compile, render, Segment, TemplateError};

/// Errors raised by route registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Method was empty or contained whitespace.
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Handle returned by [`RouteTable::register`], in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route#{}", self.0)
    }
}

/// A registered (method, template, handler) binding.
#[derive(Debug)]
pub struct Route<H> {
    id: RouteId,
    method: String,
    template: String,
    segments: Vec<Segment>,
    handler: H,
}

impl<H> Route<H> {
    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Canonical template text (`docs/{collection}/count`).
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub route: &'a Route<H>,
    pub captures: Captures,
}

/// Priority-ordered route table.
#[derive(Debug)]
pub struct RouteTable<H> {
    /// Folded method -> routes in priority order.
    partitions: BTreeMap<String, Vec<Route<H>>>,
    next_id: usize,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            partitions: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and insert the route at its priority position.
    pub fn register(&mut self, method: &str, template: &str, handler: H) -> Result<RouteId, RouteError> {
        let method = method.trim();
        if method.is_empty() || method.contains(char::is_whitespace) {
            return Err(RouteError::InvalidMethod(method.to_string()));
        }
        let segments = compile(template)?;

        let id = RouteId(self.next_id);
        self.next_id += 1;

        let route = Route {
            id,
            method: method.to_ascii_uppercase(),
            template: render(&segments),
            segments,
            handler,
        };

        let partition = self.partitions.entry(fold_case(method)).or_default();
        let position = partition.partition_point(|existing| compare(existing, &route).is_le());

        if let Some(previous) = position.checked_sub(1).map(|i| &partition[i]) {
            if compare(previous, &route).is_eq() {
                tracing::warn!(
                    method = %route.method,
                    template = %route.template,
                    shadowed_by = %previous.template,
                    "Route has the same priority as an earlier registration and will never match"
                );
            }
        }

        tracing::debug!(
            %id,
            method = %route.method,
            template = %route.template,
            position,
            "Route registered"
        );
        partition.insert(position, route);
        Ok(id)
    }

    /// Find the most specific route for `method` and `path`.
    pub fn lookup(&self, method: &str, path: &str) -> Option<RouteMatch<'_, H>> {
        let partition = self.partitions.get(&fold_case(method))?;
        partition.iter().find_map(|route| {
            try_match(&route.segments, path).map(|captures| RouteMatch { route, captures })
        })
    }

    /// All routes, grouped by method and in priority order within a method.
    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.partitions.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(routes: &[(&str, &str, &'static str)]) -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        for (method, template, name) in routes {
            table.register(method, template, *name).unwrap();
        }
        table
    }

    #[test]
    fn test_specific_route_wins_in_any_order() {
        let forward = table(&[
            ("GET", "docs/items/count", "literal"),
            ("GET", "docs/{collection}/count", "generic"),
        ]);
        let reverse = table(&[
            ("GET", "docs/{collection}/count", "generic"),
            ("GET", "docs/items/count", "literal"),
        ]);

        for t in [&forward, &reverse] {
            let m = t.lookup("GET", "/docs/items/count").unwrap();
            assert_eq!(*m.route.handler(), "literal");

            let m = t.lookup("GET", "/docs/anything/count").unwrap();
            assert_eq!(*m.route.handler(), "generic");
            assert_eq!(m.captures.get("collection"), Some("anything"));
        }
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let t = table(&[("get", "items", "list")]);
        assert!(t.lookup("GET", "items").is_some());
        assert!(t.lookup("Get", "items").is_some());
        assert!(t.lookup("POST", "items").is_none());
    }

    #[test]
    fn test_different_depths_never_compete() {
        let t = table(&[("GET", "a/b/c", "deep"), ("GET", "{x}/{y}", "shallow")]);
        assert_eq!(*t.lookup("GET", "a/b/c").unwrap().route.handler(), "deep");
        assert_eq!(*t.lookup("GET", "a/b").unwrap().route.handler(), "shallow");
        assert!(t.lookup("GET", "a").is_none());
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let t = table(&[("GET", "{a}/x", "first"), ("GET", "{b}/x", "second")]);
        assert_eq!(t.len(), 2);
        let m = t.lookup("GET", "q/x").unwrap();
        assert_eq!(*m.route.handler(), "first");
        assert_eq!(m.captures.get("a"), Some("q"));
    }

    #[test]
    fn test_failed_registration_leaves_table_untouched() {
        let mut t = table(&[("GET", "items", "list")]);
        assert!(matches!(
            t.register("GET", "items/{}", "broken"),
            Err(RouteError::Template(TemplateError::EmptyVariable { .. }))
        ));
        assert_eq!(t.register("", "items", "broken"), Err(RouteError::InvalidMethod(String::new())));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_route_ids_follow_registration_order() {
        let mut t = RouteTable::new();
        let a = t.register("GET", "{x}", ()).unwrap();
        let b = t.register("GET", "x", ()).unwrap();
        assert!(a < b);
        let first = t.routes().next().unwrap();
        assert_eq!(first.id(), b);
        assert_eq!(first.template(), "x");
    }
}
