//! Dispatch errors and their Fault mapping.

use thiserror::Error;

use crate::envelope::{EnvelopeError, Fault};
use crate::service::{BindError, CallError};

/// Why a request could not be answered by its operation.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown SOAP action `{0}`")]
    UnknownOperation(String),

    #[error("malformed SOAP envelope: {0}")]
    Envelope(#[source] EnvelopeError),

    #[error("invalid request header: {0}")]
    Bind(#[from] BindError),

    #[error("invalid request body: {0}")]
    Decode(#[source] EnvelopeError),

    #[error("failed to encode response: {0}")]
    Encode(#[source] EnvelopeError),

    #[error("operation `{operation}` panicked: {message}")]
    Panic { operation: String, message: String },
}

impl From<CallError> for DispatchError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Decode(e) => DispatchError::Decode(e),
            CallError::Encode(e) => DispatchError::Encode(e),
        }
    }
}

impl DispatchError {
    /// Whether the request itself is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DispatchError::UnknownOperation(_)
                | DispatchError::Envelope(_)
                | DispatchError::Bind(_)
                | DispatchError::Decode(_)
        )
    }

    /// The Fault sent back for this error.
    ///
    /// Server-side failures do not echo internal details to the client.
    pub fn to_fault(&self) -> Fault {
        match self {
            DispatchError::Panic { operation, .. } => {
                Fault::server(format!("operation `{operation}` failed"))
            }
            DispatchError::Encode(_) => Fault::server("failed to encode response"),
            client => Fault::client(client.to_string()),
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_client_error() {
            Outcome::ClientFault
        } else {
            Outcome::ServerFault
        }
    }
}

/// How a request ended, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation returned content or nothing.
    Success,
    /// The operation returned a Fault.
    Fault,
    ClientFault,
    ServerFault,
    /// An unknown action dropped under the drop policy.
    Dropped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Fault => "fault",
            Outcome::ClientFault => "client_fault",
            Outcome::ServerFault => "server_fault",
            Outcome::Dropped => "dropped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::fault::{FAULT_CLIENT, FAULT_SERVER};

    #[test]
    fn test_client_errors_map_to_client_faults() {
        let err = DispatchError::UnknownOperation("Nope".into());
        let fault = err.to_fault();
        assert_eq!(fault.code, FAULT_CLIENT);
        assert_eq!(fault.message(), "unknown SOAP action `Nope`");
        assert_eq!(err.outcome(), Outcome::ClientFault);

        let err = DispatchError::Envelope(EnvelopeError::MultipleBodyElements);
        assert_eq!(err.to_fault().code, FAULT_CLIENT);
        assert!(err.to_fault().message().contains("WS-I"));
    }

    #[test]
    fn test_panic_maps_to_server_fault_without_details() {
        let err = DispatchError::Panic {
            operation: "Explode".into(),
            message: "index out of bounds".into(),
        };
        let fault = err.to_fault();
        assert_eq!(fault.code, FAULT_SERVER);
        assert!(!fault.message().contains("index"));
        assert_eq!(err.outcome(), Outcome::ServerFault);
    }

    #[test]
    fn test_call_error_conversion() {
        let err: DispatchError = CallError::Decode(EnvelopeError::UnexpectedFault).into();
        assert!(matches!(err, DispatchError::Decode(_)));
        assert!(err.is_client_error());

        let err: DispatchError = CallError::Encode(EnvelopeError::InvalidContentTarget).into();
        assert!(!err.is_client_error());
    }
}
