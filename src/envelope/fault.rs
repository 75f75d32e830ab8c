//! SOAP fault payload.

use quick_xml::escape::escape;
use thiserror::Error;

/// Fault code for errors caused by the request content.
pub const FAULT_CLIENT: &str = "soap:Client";

/// Fault code for errors raised while processing a valid request.
pub const FAULT_SERVER: &str = "soap:Server";

/// A structured representation of a SOAP fault.
///
/// Every field may be empty; empty fields are omitted on the wire. `code`,
/// `message` and `actor` are plain text. `detail` is the raw inner markup of
/// the `<detail>` element and is written back unescaped.
///
/// See <https://www.w3.org/TR/2000/NOTE-SOAP-20000508/#_Toc478383507>
#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Fault {
    /// `faultcode`
    pub code: String,
    /// `faultstring`
    pub message: String,
    /// `faultactor`
    pub actor: String,
    /// `detail`, as markup
    pub detail: String,
}

impl Fault {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    /// A fault blaming the sender of the request.
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(FAULT_CLIENT, message)
    }

    /// A fault blaming the receiver of the request.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FAULT_SERVER, message)
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Sets the detail markup, e.g. `<e:Code xmlns:e="urn:e">17</e:Code>`.
    pub fn with_detail(mut self, markup: impl Into<String>) -> Self {
        self.detail = markup.into();
        self
    }

    /// Sets a plain-text detail, escaping it.
    pub fn with_detail_text(mut self, text: &str) -> Self {
        self.detail = escape(text).into_owned();
        self
    }

    /// The human-readable fault string.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_is_an_error() {
        let fault = Fault::server("database unavailable").with_actor("urn:db");
        let err: Box<dyn std::error::Error> = Box::new(fault.clone());
        assert_eq!(err.to_string(), "database unavailable");
        assert_eq!(fault.message(), "database unavailable");
        assert_eq!(fault.code, FAULT_SERVER);
        assert_eq!(fault.actor, "urn:db");
    }

    #[test]
    fn test_text_detail_escaped() {
        let fault = Fault::client("bad input").with_detail_text("a < b & c");
        assert_eq!(fault.detail, "a &lt; b &amp; c");
    }
}
