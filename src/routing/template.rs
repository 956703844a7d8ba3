//! URL template compilation.
//!
//! # Responsibilities
//! - Split a template such as `licenses/{serialKey}/activationKey` into segments
//! - Distinguish literal segments from `{name}` variables
//! - Reject templates that cannot produce a usable route
//!
//! # Design Decisions
//! - Compiled once at registration, cached on the route
//! - Empty components (`a//b`, leading/trailing `/`) are skipped
//! - Duplicate variable names are rejected rather than last-write-wins

use std::fmt;

use thiserror::Error;

use crate::routing::fold_case;

/// Errors raised while compiling a URL template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Template was empty or whitespace only.
    #[error("URL template is empty")]
    Empty,

    /// Template consisted only of separators.
    #[error("URL template '{0}' has no segments")]
    NoSegments(String),

    /// A `{}` variable without a name.
    #[error("URL template '{template}' has an unnamed variable at segment {position}")]
    EmptyVariable { template: String, position: usize },

    /// The same variable name appears twice.
    #[error("URL template '{template}' declares variable '{name}' more than once")]
    DuplicateVariable { template: String, name: String },
}

/// One `/`-delimited component of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the request component (case-insensitive).
    Literal(String),
    /// Captures the request component under this name.
    Variable(String),
}

impl Segment {
    pub fn is_variable(&self) -> bool {
        matches!(self, Segment::Variable(_))
    }

    /// Literal text, or the variable name.
    pub fn text(&self) -> &str {
        match self {
            Segment::Literal(text) | Segment::Variable(text) => text,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => write!(f, "{}", text),
            Segment::Variable(name) => write!(f, "{{{}}}", name),
        }
    }
}

/// Compile a URL template into its ordered segments.
pub fn compile(template: &str) -> Result<Vec<Segment>, TemplateError> {
    if template.trim().is_empty() {
        return Err(TemplateError::Empty);
    }

    let mut segments = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for (position, component) in template.trim_matches('/').split('/').enumerate() {
        if component.is_empty() {
            continue;
        }

        match variable_name(component) {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::EmptyVariable {
                        template: template.to_string(),
                        position,
                    });
                }

                let folded = fold_case(name);
                if seen.contains(&folded) {
                    return Err(TemplateError::DuplicateVariable {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                seen.push(folded);
                segments.push(Segment::Variable(name.to_string()));
            }
            None => segments.push(Segment::Literal(component.to_string())),
        }
    }

    if segments.is_empty() {
        return Err(TemplateError::NoSegments(template.to_string()));
    }

    Ok(segments)
}

fn variable_name(component: &str) -> Option<&str> {
    component
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
}

/// Join a route-group prefix and an endpoint template with a single `/`.
pub fn join_prefix(prefix: &str, template: &str) -> String {
    if prefix.is_empty() {
        return template.to_string();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), template.trim_start_matches('/'))
}

/// Render segments back into canonical template form.
pub fn render(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}
