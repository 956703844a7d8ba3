//! Response encoding and serializer settings.
//!
//! Settings can be configured globally (`[dispatch.serializer]`) and
//! overridden per route group.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Naming applied to object keys of encoded replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCase {
    /// Keys are written as serialized.
    #[default]
    AsIs,
    /// `days_left` / `DaysLeft` become `daysLeft`.
    CamelCase,
}

/// JSON output settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SerializerSettings {
    /// Indent output.
    pub pretty: bool,

    /// Drop object fields whose value is `null`.
    pub skip_nulls: bool,

    /// Key naming policy.
    pub key_case: KeyCase,
}

impl SerializerSettings {
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn skip_nulls(mut self, skip: bool) -> Self {
        self.skip_nulls = skip;
        self
    }

    pub fn key_case(mut self, key_case: KeyCase) -> Self {
        self.key_case = key_case;
        self
    }

    /// Encode `value` according to these settings.
    pub fn encode(&self, value: Value) -> Result<Bytes, serde_json::Error> {
        let value = self.transform(value);
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&value)?
        } else {
            serde_json::to_vec(&value)?
        };
        Ok(Bytes::from(bytes))
    }

    fn transform(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    if self.skip_nulls && value.is_null() {
                        continue;
                    }
                    let key = match self.key_case {
                        KeyCase::AsIs => key,
                        KeyCase::CamelCase => camel_case(&key),
                    };
                    out.insert(key, self.transform(value));
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.transform(v)).collect()),
            other => other,
        }
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for (i, c) in key.chars().enumerate() {
        if c == '_' || c == '-' {
            upper_next = !out.is_empty();
            continue;
        }
        if i == 0 || out.is_empty() {
            out.extend(c.to_lowercase());
        } else if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = false;
    }
    out
}
