//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → handed to the dispatcher, HTTP server and observability setup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, override_bind_address, ConfigError};
pub use schema::{
    DispatchConfig, EndpointConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ServerConfig, TimeoutConfig, UnknownActionPolicy,
};
pub use validation::{validate_config, ValidationError};
