//! Parameter binding.
//!
//! # Responsibilities
//! - Resolve each declared parameter from the request
//! - Convert raw strings and bodies to declared types
//! - Stop at the first failure with a descriptive error
//!
//! # Resolution Order
//! ```text
//! scalar parameter:  path variable → query string → JSON body field → fallback
//! body parameter:    path variable (as JSON) → whole request body → fallback
//! ```
//!
//! # Design Decisions
//! - Pure: the same inputs always produce the same arguments or error
//! - Name matching is case-insensitive everywhere
//! - An empty body counts as absent

use serde_json::Value;
use thiserror::Error;

use crate::binding::arguments::Arguments;
use crate::binding::params::{BoundValue, ConversionError, Decoder, Parameter};
use crate::routing::Captures;

/// Longest raw input echoed back in a binding error.
const MAX_RAW_LEN: usize = 256;

/// Why a request could not be bound to a handler's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("required parameter '{name}' is missing")]
    Missing { name: String },

    #[error("invalid value '{raw}' for parameter '{name}': {source}")]
    Conversion {
        name: String,
        raw: String,
        #[source]
        source: ConversionError,
    },
}

impl BindingError {
    /// Name of the offending parameter.
    pub fn parameter(&self) -> &str {
        match self {
            BindingError::Missing { name } | BindingError::Conversion { name, .. } => name,
        }
    }

    /// Raw input that failed to convert, if any.
    pub fn raw(&self) -> Option<&str> {
        match self {
            BindingError::Missing { .. } => None,
            BindingError::Conversion { raw, .. } => Some(raw),
        }
    }

    /// Short machine-readable kind, used for metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            BindingError::Missing { .. } => "missing",
            BindingError::Conversion { .. } => "conversion",
        }
    }
}

/// Decoded query-string pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Parse a raw `a=1&b=two` query string (form-urlencoded).
    pub fn parse(raw: &str) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(raw.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value for `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.to_lowercase() == name.to_lowercase())
            .map(|(_, v)| v.as_str())
    }

}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Bind `parameters` in declaration order.
pub fn bind(
    parameters: &[Parameter],
    captures: &Captures,
    query: &Query,
    body: &[u8],
) -> Result<Arguments, BindingError> {
    let mut arguments = Arguments::with_capacity(parameters.len());
    let mut fields = BodyFields::new(body);

    for parameter in parameters {
        let name = parameter.name();
        let bound = match &parameter.decoder {
            Decoder::Text { parse, .. } => {
                let raw = captures
                    .get(name)
                    .map(str::to_string)
                    .or_else(|| query.get(name).map(str::to_string))
                    .or_else(|| fields.get(name));

                match raw {
                    Some(raw) => Some(parse(&raw).map_err(|source| conversion(name, &raw, source))?),
                    None => None,
                }
            }
            Decoder::Body { parse, .. } => match captures.get(name) {
                Some(raw) => Some(parse_captured(*parse, raw).map_err(|source| conversion(name, raw, source))?),
                None if is_blank(body) => None,
                None => {
                    let bound = parse(body).map_err(|source| {
                        conversion(name, &String::from_utf8_lossy(body), source)
                    })?;
                    Some(bound)
                }
            },
        };

        let value = match bound {
            Some(value) => value,
            None => parameter.fallback().ok_or_else(|| BindingError::Missing {
                name: name.to_string(),
            })?,
        };
        arguments.push(name, parameter.type_name(), value);
    }

    Ok(arguments)
}

fn conversion(name: &str, raw: &str, source: ConversionError) -> BindingError {
    let raw = match raw.char_indices().nth(MAX_RAW_LEN) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_string(),
    };
    BindingError::Conversion {
        name: name.to_string(),
        raw,
        source,
    }
}

/// A path variable bound to a body-typed parameter: read it as JSON first,
/// then as a JSON string.
fn parse_captured(
    parse: fn(&[u8]) -> Result<BoundValue, ConversionError>,
    raw: &str,
) -> Result<BoundValue, ConversionError> {
    parse(raw.as_bytes()).or_else(|first| match serde_json::to_vec(raw) {
        Ok(quoted) => parse(&quoted).map_err(|_| first),
        Err(_) => Err(first),
    })
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Top-level fields of a JSON object body, parsed on first use.
struct BodyFields<'a> {
    body: &'a [u8],
    parsed: Option<Option<serde_json::Map<String, Value>>>,
}

impl<'a> BodyFields<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self { body, parsed: None }
    }

    fn get(&mut self, name: &str) -> Option<String> {
        let body = self.body;
        let object = self
            .parsed
            .get_or_insert_with(|| match serde_json::from_slice::<Value>(body) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            })
            .as_ref()?;

        let wanted = name.to_lowercase();
        let value = object
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v)?;

        match value {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
