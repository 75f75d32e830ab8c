//! SOAP 1.1 RPC endpoint library.
//!
//! Exposes the operations of a Rust service type as SOAP actions over HTTP.

// Core pipeline
pub mod dispatch;
pub mod envelope;
pub mod routing;
pub mod service;

// Hosting
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub mod demo;

pub use config::ServerConfig;
pub use dispatch::{register_operations, Dispatcher, SoapResponse};
pub use envelope::{Body, Envelope, Fault};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::AliasTable;
pub use service::{OperationTable, SoapService};
