//! Declared handler parameters and raw-value converters.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

/// Type-erased bound value.
pub type BoundValue = Box<dyn Any + Send>;

/// A raw value could not be converted to the declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}: {reason}")]
pub struct ConversionError {
    /// Declared type name (`i32`, `uuid`, ...).
    pub expected: &'static str,
    pub reason: String,
}

impl ConversionError {
    pub fn new(expected: &'static str, reason: impl fmt::Display) -> Self {
        Self {
            expected,
            reason: reason.to_string(),
        }
    }
}

/// Conversion from a raw path, query or body-field string.
pub trait FromParam: Sized + Send + 'static {
    /// Type name reported in conversion errors.
    const TYPE_NAME: &'static str;

    fn from_param(raw: &str) -> Result<Self, ConversionError>;

    /// Value bound when the request supplies nothing. `None` means required.
    fn when_missing() -> Option<Self> {
        None
    }
}

macro_rules! impl_from_param_via_parse {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl FromParam for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_param(raw: &str) -> Result<Self, ConversionError> {
                    raw.trim()
                        .parse::<$ty>()
                        .map_err(|e| ConversionError::new($name, e))
                }
            }
        )*
    };
}

impl_from_param_via_parse! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
}

impl FromParam for String {
    const TYPE_NAME: &'static str = "string";

    fn from_param(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.to_string())
    }
}

impl FromParam for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_param(raw: &str) -> Result<Self, ConversionError> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConversionError::new("bool", "value must be 'true' or 'false'"))
        }
    }
}

impl FromParam for char {
    const TYPE_NAME: &'static str = "char";

    fn from_param(raw: &str) -> Result<Self, ConversionError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::new("char", "value must be exactly one character")),
        }
    }
}

impl FromParam for Uuid {
    const TYPE_NAME: &'static str = "uuid";

    fn from_param(raw: &str) -> Result<Self, ConversionError> {
        Uuid::parse_str(raw.trim()).map_err(|e| ConversionError::new("uuid", e))
    }
}

impl<T: FromParam> FromParam for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_param(raw: &str) -> Result<Self, ConversionError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        T::from_param(raw).map(Some)
    }

    fn when_missing() -> Option<Self> {
        Some(None)
    }
}

/// How a parameter obtains its raw input.
#[derive(Clone)]
pub(crate) enum Decoder {
    /// Path variable, then query string, then JSON body field.
    Text {
        parse: fn(&str) -> Result<BoundValue, ConversionError>,
        missing: fn() -> Option<BoundValue>,
    },
    /// Whole request body, deserialized.
    Body {
        parse: fn(&[u8]) -> Result<BoundValue, ConversionError>,
        missing: fn() -> Option<BoundValue>,
    },
}

/// One declared handler parameter.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    type_name: &'static str,
    pub(crate) decoder: Decoder,
    default: Option<Arc<dyn Fn() -> BoundValue + Send + Sync>>,
}

impl Parameter {
    /// A scalar parameter resolved from path, query or body field.
    pub fn new<T: FromParam>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: T::TYPE_NAME,
            decoder: Decoder::Text {
                parse: parse_text::<T>,
                missing: missing_text::<T>,
            },
            default: None,
        }
    }

    /// A scalar parameter that falls back to `value` when absent.
    pub fn with_default<T: FromParam + Clone + Sync>(name: impl Into<String>, value: T) -> Self {
        let mut parameter = Self::new::<T>(name);
        parameter.default = Some(Arc::new(move || Box::new(value.clone()) as BoundValue));
        parameter
    }

    /// A required parameter deserialized from the JSON request body.
    pub fn body<T: DeserializeOwned + Send + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: std::any::type_name::<T>(),
            decoder: Decoder::Body {
                parse: parse_body::<T>,
                missing: || None,
            },
            default: None,
        }
    }

    /// A body parameter bound as `Option<T>`; an empty body binds `None`.
    pub fn optional_body<T: DeserializeOwned + Send + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: std::any::type_name::<T>(),
            decoder: Decoder::Body {
                parse: parse_optional_body::<T>,
                missing: || Some(Box::new(None::<T>) as BoundValue),
            },
            default: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_body(&self) -> bool {
        matches!(self.decoder, Decoder::Body { .. })
    }

    /// Value used when the request carries no input for this parameter.
    pub(crate) fn fallback(&self) -> Option<BoundValue> {
        if let Some(default) = &self.default {
            return Some(default());
        }
        match &self.decoder {
            Decoder::Text { missing, .. } | Decoder::Body { missing, .. } => missing(),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("body", &self.is_body())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

fn parse_text<T: FromParam>(raw: &str) -> Result<BoundValue, ConversionError> {
    T::from_param(raw).map(|value| Box::new(value) as BoundValue)
}

fn missing_text<T: FromParam>() -> Option<BoundValue> {
    T::when_missing().map(|value| Box::new(value) as BoundValue)
}

fn parse_body<T: DeserializeOwned + Send + 'static>(body: &[u8]) -> Result<BoundValue, ConversionError> {
    serde_json::from_slice::<T>(body)
        .map(|value| Box::new(value) as BoundValue)
        .map_err(|e| ConversionError::new(std::any::type_name::<T>(), e))
}

fn parse_optional_body<T: DeserializeOwned + Send + 'static>(
    body: &[u8],
) -> Result<BoundValue, ConversionError> {
    serde_json::from_slice::<Option<T>>(body)
        .map(|value| Box::new(value) as BoundValue)
        .map_err(|e| ConversionError::new(std::any::type_name::<T>(), e))
}
