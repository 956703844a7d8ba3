//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::dispatch::SerializerSettings;

/// Root configuration for the router service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Dispatch behavior shared by all route groups.
    pub dispatch: DispatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Status sent for binding failures when a group has no error handler.
    pub binding_error_status: u16,

    /// Default serializer settings; a group may override them.
    pub serializer: SerializerSettings,
}

impl DispatchConfig {
    /// `binding_error_status` as a status code, falling back to 400 when it
    /// is not a client error.
    pub fn error_status(&self) -> StatusCode {
        StatusCode::from_u16(self.binding_error_status)
            .ok()
            .filter(StatusCode::is_client_error)
            .unwrap_or(StatusCode::BAD_REQUEST)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            binding_error_status: 400,
            serializer: SerializerSettings::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::KeyCase;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.dispatch.error_status(), StatusCode::BAD_REQUEST);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: RouterConfig = toml::from_str(
            r#"
            [dispatch]
            binding_error_status = 422

            [dispatch.serializer]
            key_case = "camel_case"
            skip_nulls = true
            "#,
        )
        .unwrap();
        assert_eq!(config.dispatch.error_status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(config.dispatch.serializer.key_case, KeyCase::CamelCase);
        assert!(config.dispatch.serializer.skip_nulls);
        assert!(!config.dispatch.serializer.pretty);
    }

    #[test]
    fn test_non_client_status_falls_back() {
        let dispatch = DispatchConfig {
            binding_error_status: 500,
            ..DispatchConfig::default()
        };
        assert_eq!(dispatch.error_status(), StatusCode::BAD_REQUEST);
    }
}
