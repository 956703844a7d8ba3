//! Route priority ordering.
//!
//! Routes are ordered so that, for any request, the first matching route in
//! the table is the most specific one:
//!
//! ```text
//! GET docs/items/count        <- literal trailing segments first
//! GET docs/{collection}/count
//! GET docs/items/{id}
//! GET docs/{collection}/{id}
//! ```
//!
//! Ordering keys, in order: method (case-insensitive), segment count (fewer
//! first), then segments compared from last to first where a literal beats a
//! variable and two literals compare by case-insensitive text.

use std::cmp::Ordering;

use crate::routing::fold_case;
use crate::routing::router::Route;
use crate::routing::template::Segment;

/// Compare two routes for table order.
pub fn compare<H>(a: &Route<H>, b: &Route<H>) -> Ordering {
    compare_ignore_case(a.method(), b.method())
        .then_with(|| compare_segments(a.segments(), b.segments()))
}

/// Compare two compiled templates of the same method.
pub fn compare_segments(a: &[Segment], b: &[Segment]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }

    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        match (x, y) {
            (Segment::Variable(_), Segment::Variable(_)) => continue,
            (Segment::Variable(_), Segment::Literal(_)) => return Ordering::Greater,
            (Segment::Literal(_), Segment::Variable(_)) => return Ordering::Less,
            (Segment::Literal(x), Segment::Literal(y)) => match compare_ignore_case(x, y) {
                Ordering::Equal => continue,
                decided => return decided,
            },
        }
    }

    Ordering::Equal
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    fold_case(a).cmp(&fold_case(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::template::compile;

    fn order(a: &str, b: &str) -> Ordering {
        compare_segments(&compile(a).unwrap(), &compile(b).unwrap())
    }

    #[test]
    fn test_fewer_segments_first() {
        assert_eq!(order("{x}/{y}", "a/b/c"), Ordering::Less);
        assert_eq!(order("a/b/c", "{x}"), Ordering::Greater);
    }

    #[test]
    fn test_trailing_literal_wins() {
        assert_eq!(order("items/count", "{collection}/count"), Ordering::Less);
        assert_eq!(order("{collection}/count", "items/{id}"), Ordering::Less);
        assert_eq!(order("items/{id}", "{collection}/{id}"), Ordering::Less);
    }

    #[test]
    fn test_literal_text_ignores_case() {
        assert_eq!(order("Items/Count", "items/count"), Ordering::Equal);
        assert_eq!(order("items/alpha", "items/beta"), Ordering::Less);
    }

    #[test]
    fn test_variables_with_different_names_are_equal() {
        assert_eq!(order("{a}/x", "{b}/x"), Ordering::Equal);
    }

    #[test]
    fn test_order_is_antisymmetric() {
        let templates = [
            "items/count",
            "{c}/count",
            "items/{id}",
            "{c}/{id}",
            "a/b/c",
            "{x}/{y}",
            "docs",
            "{only}",
        ];
        for a in templates {
            for b in templates {
                assert_eq!(order(a, b), order(b, a).reverse(), "{} vs {}", a, b);
            }
        }
    }
}
