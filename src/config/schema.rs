//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the SOAP
//! endpoint. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

use crate::routing::DEFAULT_ACTION_NAMESPACE;

/// Root configuration for the SOAP endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// HTTP endpoint the service is mounted on.
    pub endpoint: EndpointConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request dispatch behavior.
    pub dispatch: DispatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
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

/// Endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    /// Path that accepts SOAP POST requests.
    pub path: String,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
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

/// What to do with a SOAPAction that names no registered operation.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownActionPolicy {
    /// Answer with a `soap:Client` Fault.
    #[default]
    Fault,
    /// Answer 200 with an empty body.
    Drop,
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Reject requests whose body cannot be decoded. When false, decode
    /// errors are logged and the operation receives its default input.
    pub strict_decoding: bool,

    /// Policy for unresolvable actions.
    pub unknown_action: UnknownActionPolicy,

    /// Prefix stripped from SOAPAction values.
    pub action_namespace: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strict_decoding: true,
            unknown_action: UnknownActionPolicy::Fault,
            action_namespace: DEFAULT_ACTION_NAMESPACE.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
