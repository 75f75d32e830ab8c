//! SOAP 1.1 envelope model.
//!
//! # Data Flow
//! ```text
//! Request bytes
//!     → decode.rs (scan Envelope/Header/Body, classify the Body child)
//!     → RawEnvelope (captured fragments, untyped)
//!     → typed decode (header target, content target chosen by the dispatcher)
//!     → Envelope<H, C>
//!
//! Envelope<H, C>
//!     → encode.rs (soap:Envelope, soap:Header?, soap:Body [Fault | Content])
//!     → response bytes
//! ```
//!
//! # Design Decisions
//! - The Body carries no type information of its own, so the content type is
//!   always supplied by the caller
//! - A Fault child is recognized by its qualified name, not by position
//! - More than one Body child is rejected (wrapped document/literal, WS-I)

pub mod decode;
pub mod encode;
pub mod fault;

use thiserror::Error;

pub use decode::{decode_envelope, RawBody, RawEnvelope};
pub use encode::{encode_envelope, encode_envelope_with_root};
pub use fault::Fault;

/// Namespace of the SOAP 1.1 envelope.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Prefix used for envelope elements on the wire.
pub const SOAP_PREFIX: &str = "soap";

/// A SOAP envelope with a header of type `H` and body content of type `C`.
///
/// See <https://www.w3.org/TR/2000/NOTE-SOAP-20000508/#_Toc478383494>
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope<H = (), C = ()> {
    pub header: Option<H>,
    pub body: Body<C>,
}

impl<H, C> Envelope<H, C> {
    /// Creates an envelope without a header.
    pub fn new(body: Body<C>) -> Self {
        Self { header: None, body }
    }

    /// Attaches a header to the envelope.
    pub fn with_header(mut self, header: H) -> Self {
        self.header = Some(header);
        self
    }
}

/// The single payload of a SOAP body.
///
/// A body holds a fault or application content, never both.
#[derive(Clone, Debug, PartialEq)]
pub enum Body<C> {
    /// No child element.
    Empty,
    /// A `soap:Fault` child.
    Fault(Fault),
    /// An application-defined child.
    Content(C),
}

impl<C> Body<C> {
    pub fn is_fault(&self) -> bool {
        matches!(self, Body::Fault(_))
    }

    /// Returns the content, if the body carries any.
    pub fn content(&self) -> Option<&C> {
        match self {
            Body::Content(content) => Some(content),
            _ => None,
        }
    }

    /// Consumes the body, returning its content if it carries any.
    pub fn into_content(self) -> Option<C> {
        match self {
            Body::Content(content) => Some(content),
            _ => None,
        }
    }

    /// Returns the fault, if the body carries one.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Body::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Errors raised while decoding or encoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// No placeholder for the body content was supplied.
    #[error("content target must be supplied for the SOAP body")]
    InvalidContentTarget,

    #[error("found multiple elements inside SOAP body; not wrapped-document/literal WS-I compliant")]
    MultipleBodyElements,

    /// A request carried a Fault where content was expected.
    #[error("SOAP body carries a fault instead of request content")]
    UnexpectedFault,

    #[error("document has no SOAP envelope")]
    MissingEnvelope,

    #[error("expected SOAP envelope root, found `{0}`")]
    UnexpectedRoot(String),

    #[error("SOAP envelope has no body")]
    MissingBody,

    #[error("document ended inside element `{0}`")]
    Truncated(String),

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("failed to decode element: {0}")]
    Deserialize(#[from] quick_xml::DeError),

    #[error("failed to encode element: {0}")]
    Serialize(#[from] quick_xml::SeError),

    #[error("failed to write XML: {0}")]
    Io(#[from] std::io::Error),
}
