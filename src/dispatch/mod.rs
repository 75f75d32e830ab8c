//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! (headers, body bytes)
//!     → routing (SOAPAction → operation name)
//!     → envelope (scan Envelope/Header/Body)
//!     → service (fresh instance, typed input, invoke, encode reply)
//!     → SoapResponse (status, XML body)
//! ```
//!
//! # Design Decisions
//! - Every request ends in exactly one `SoapResponse`; errors become Faults
//! - Dispatcher-generated Faults answer 500, operation results answer 200
//! - Dispatch is synchronous; the HTTP layer runs it on the blocking pool

pub mod dispatcher;
pub mod error;

use axum::http::StatusCode;
use tracing::error;

use crate::envelope::{encode_envelope, Body, Envelope, Fault};

pub use dispatcher::{register_operations, Dispatcher};
pub use error::{DispatchError, Outcome};

/// Content type of every SOAP 1.1 response body.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// The result of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    pub status: StatusCode,
    /// Encoded envelope; empty when the request was dropped.
    pub body: Vec<u8>,
}

impl SoapResponse {
    /// A 200 response carrying an encoded envelope.
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// A 500 response carrying an encoded Fault envelope.
    pub fn fault(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        }
    }

    /// Encodes a dispatcher-generated Fault as a 500 response.
    pub fn from_fault(fault: Fault) -> Self {
        match encode_envelope(&Envelope::<(), ()>::new(Body::Fault(fault))) {
            Ok(bytes) => Self::fault(bytes),
            Err(err) => {
                error!(error = %err, "Failed to encode fault");
                Self::fault(Vec::new())
            }
        }
    }

    /// A 200 response without a body.
    pub fn empty() -> Self {
        Self::ok(Vec::new())
    }
}
