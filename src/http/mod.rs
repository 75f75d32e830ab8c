//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID, SOAPAction, Basic credentials)
//!     → dispatch (on the blocking pool)
//!     → response.rs (status, Content-Type, Content-Length)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{basic_credentials, soap_action, RequestUuid, SOAP_ACTION, X_REQUEST_ID};
pub use server::HttpServer;
