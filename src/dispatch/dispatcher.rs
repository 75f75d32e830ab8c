//! The per-request pipeline.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;
use tracing::{debug, error, warn};

use super::{DispatchError, Outcome, SoapResponse};
use crate::config::{DispatchConfig, UnknownActionPolicy};
use crate::envelope::RawEnvelope;
use crate::http::request::{basic_credentials, soap_action};
use crate::observability::metrics::record_request;
use crate::routing::ActionResolver;
use crate::service::operation::ErasedOperation;
use crate::service::{DescriptorError, Encoded, ServiceDescriptor, SoapService};

/// Operation label used for actions that resolve to nothing.
const UNKNOWN_OPERATION: &str = "unknown";

/// Describes `S` and builds a dispatcher for it.
///
/// Fails when the service definition is invalid; callers should refuse to
/// start in that case.
pub fn register_operations<S: SoapService>(
    config: DispatchConfig,
) -> Result<Dispatcher<S>, DescriptorError> {
    let descriptor = ServiceDescriptor::<S>::describe()?;
    let resolver = ActionResolver::new(
        config.action_namespace.clone(),
        descriptor.aliases().clone(),
    );

    tracing::info!(
        service = descriptor.name(),
        operations = ?descriptor.operations().names(),
        "SOAP service registered"
    );

    Ok(Dispatcher {
        descriptor: Arc::new(descriptor),
        resolver: Arc::new(resolver),
        config: Arc::new(config),
    })
}

/// Dispatches SOAP requests to the operations of `S`.
///
/// Cheap to clone; clones share the descriptor.
pub struct Dispatcher<S> {
    descriptor: Arc<ServiceDescriptor<S>>,
    resolver: Arc<ActionResolver>,
    config: Arc<DispatchConfig>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            resolver: Arc::clone(&self.resolver),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: SoapService> Dispatcher<S> {
    /// Handles one request.
    pub fn dispatch(&self, headers: &HeaderMap, body: &[u8]) -> SoapResponse {
        let start = Instant::now();
        let raw_action = soap_action(headers).unwrap_or_default();
        let name = self.resolver.resolve(raw_action);

        let Some(operation) = self.descriptor.operation(name) else {
            let (response, outcome) = self.unknown_action(raw_action, name);
            record_request(UNKNOWN_OPERATION, outcome.as_str(), start);
            return response;
        };

        debug!(operation = name, "Dispatching");

        let (response, outcome) = match self.invoke(operation, name, headers, body) {
            Ok(encoded) if encoded.fault => (SoapResponse::ok(encoded.bytes), Outcome::Fault),
            Ok(encoded) => (SoapResponse::ok(encoded.bytes), Outcome::Success),
            Err(err) => {
                if err.is_client_error() {
                    warn!(operation = name, error = %err, "Request rejected");
                } else {
                    error!(operation = name, error = %err, "Request failed");
                }
                (SoapResponse::from_fault(err.to_fault()), err.outcome())
            }
        };

        record_request(name, outcome.as_str(), start);
        response
    }

    fn unknown_action(&self, raw_action: &str, name: &str) -> (SoapResponse, Outcome) {
        match self.config.unknown_action {
            UnknownActionPolicy::Drop => {
                debug!(action = raw_action, "Unknown action dropped");
                (SoapResponse::empty(), Outcome::Dropped)
            }
            UnknownActionPolicy::Fault => {
                let err = DispatchError::UnknownOperation(name.to_string());
                warn!(action = raw_action, error = %err, "Request rejected");
                (SoapResponse::from_fault(err.to_fault()), err.outcome())
            }
        }
    }

    fn invoke(
        &self,
        operation: &dyn ErasedOperation<S>,
        name: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Encoded, DispatchError> {
        let strict = self.config.strict_decoding;

        let request = match RawEnvelope::scan(body) {
            Ok(request) => request,
            Err(err) if strict => return Err(DispatchError::Envelope(err)),
            Err(err) => {
                warn!(operation = name, error = %err, "Malformed envelope, continuing with default input");
                RawEnvelope::default()
            }
        };

        let credentials = basic_credentials(headers);
        let mut service = match self
            .descriptor
            .instantiate(request.header_fragment(), credentials.as_ref())
        {
            Ok(service) => service,
            Err(err) if strict => return Err(err.into()),
            Err(err) => {
                warn!(operation = name, error = %err, "Header not bound, continuing without it");
                self.descriptor.instantiate(None, credentials.as_ref())?
            }
        };

        let result = catch_unwind(AssertUnwindSafe(|| {
            operation.call(&mut service, request, strict)
        }));

        match result {
            Ok(call) => Ok(call?),
            Err(payload) => Err(DispatchError::Panic {
                operation: name.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
