//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     (method, template, handler)
//!     → template.rs (compile into segments)
//!     → priority.rs (find insertion point)
//!     → router.rs (store in method partition)
//!
//! Incoming Request (method, path)
//!     → router.rs (scan method partition in priority order)
//!     → matcher.rs (segment-by-segment match, capture variables)
//!     → Return: matched Route + Captures, or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex or wildcards: literal and `{variable}` segments only
//! - Deterministic: the most specific route wins regardless of registration order
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod priority;
pub mod router;
pub mod template;

pub use matcher::{try_match, Captures};
pub use router::{Route, RouteError, RouteId, RouteMatch, RouteTable};
pub use template::{compile, join_prefix, Segment, TemplateError};

/// Case folding used for every case-insensitive comparison in routing.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
