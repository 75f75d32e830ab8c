//! Typed operations and the table they are registered in.
//!
//! # Example
//!
//! ```ignore
//! impl SoapService for Login {
//!     fn operations(table: &mut OperationTable<Self>) {
//!         table.operation("PutDataBySqh", Login::put_data_by_sqh);
//!         table.operation("Ping", |_: &mut Login| ());
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{DeserializeOwned, Deserializer, IgnoredAny};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::Reply;
use crate::envelope::{encode_envelope_with_root, Envelope, EnvelopeError, RawEnvelope};

/// A function callable as a SOAP operation on a service of type `S`.
///
/// Implemented for `Fn(&mut S) -> R` and `Fn(&mut S, Req) -> R`, where `Req`
/// is decoded from the request Body and `R` is any [`Reply`]. `Args` only
/// tells the two forms apart.
pub trait Operation<S, Args>: Send + Sync + 'static {
    /// Request payload; its `Default` is the decode placeholder.
    type Input: DeserializeOwned + Default;
    type Output: Reply;

    fn invoke(&self, service: &mut S, input: Self::Input) -> Self::Output;
}

impl<S, F, R> Operation<S, (R,)> for F
where
    F: Fn(&mut S) -> R + Send + Sync + 'static,
    R: Reply,
{
    type Input = Discard;
    type Output = R;

    fn invoke(&self, service: &mut S, _input: Discard) -> R {
        self(service)
    }
}

impl<S, F, Req, R> Operation<S, (Req, R)> for F
where
    F: Fn(&mut S, Req) -> R + Send + Sync + 'static,
    Req: DeserializeOwned + Default,
    R: Reply,
{
    type Input = Req;
    type Output = R;

    fn invoke(&self, service: &mut S, input: Req) -> R {
        self(service, input)
    }
}

/// Input of operations that take no parameter. The Body payload is parsed
/// and ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Discard;

impl<'de> Deserialize<'de> for Discard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Discard)
    }
}

/// Failure inside one operation call, outside of the operation itself.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("failed to decode request: {0}")]
    Decode(#[source] EnvelopeError),

    #[error("failed to encode response: {0}")]
    Encode(#[source] EnvelopeError),
}

/// Encoded response of one operation call.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// The operation answered with a Fault.
    pub fault: bool,
}

/// Object-safe form of [`Operation`].
pub(crate) trait ErasedOperation<S>: Send + Sync {
    /// Decodes the request Body, invokes the operation and encodes its reply.
    fn call(
        &self,
        service: &mut S,
        request: RawEnvelope,
        strict: bool,
    ) -> Result<Encoded, CallError>;
}

struct TypedOperation<F, Args> {
    operation: F,
    /// Element wrapping replies that have no element name of their own.
    response_root: String,
    _phantom: PhantomData<fn() -> Args>,
}

impl<S, F, Args> ErasedOperation<S> for TypedOperation<F, Args>
where
    F: Operation<S, Args>,
    Args: 'static,
{
    fn call(
        &self,
        service: &mut S,
        request: RawEnvelope,
        strict: bool,
    ) -> Result<Encoded, CallError> {
        let decoded = request.into_envelope::<(), F::Input>(None, Some(F::Input::default()));
        let input = match decoded {
            Ok(envelope) => match envelope.body.into_content() {
                Some(input) => input,
                None => {
                    let err = EnvelopeError::UnexpectedFault;
                    if strict {
                        return Err(CallError::Decode(err));
                    }
                    warn!(error = %err, "Continuing with default input");
                    F::Input::default()
                }
            },
            Err(err) if strict => return Err(CallError::Decode(err)),
            Err(err) => {
                warn!(error = %err, "Request body not decoded, continuing with default input");
                F::Input::default()
            }
        };

        let body = self.operation.invoke(service, input).into_body();
        let fault = body.is_fault();
        let bytes = encode_envelope_with_root(&Envelope::<(), _>::new(body), &self.response_root)
            .map_err(CallError::Encode)?;

        Ok(Encoded { bytes, fault })
    }
}

/// Operations of a service, keyed by operation name.
pub struct OperationTable<S> {
    operations: HashMap<String, Box<dyn ErasedOperation<S>>>,
    duplicates: Vec<String>,
}

impl<S: 'static> OperationTable<S> {
    pub(crate) fn new() -> Self {
        Self {
            operations: HashMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Registers `operation` under `name`.
    ///
    /// Registering the same name twice is reported when the service is
    /// described.
    pub fn operation<F, Args>(&mut self, name: impl Into<String>, operation: F) -> &mut Self
    where
        F: Operation<S, Args>,
        Args: 'static,
    {
        let name = name.into();
        let typed = TypedOperation {
            operation,
            response_root: format!("{name}Response"),
            _phantom: PhantomData,
        };
        if self.operations.insert(name.clone(), Box::new(typed)).is_some() {
            self.duplicates.push(name);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Registered operation names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn get(&self, name: &str) -> Option<&dyn ErasedOperation<S>> {
        self.operations.get(name).map(|op| op.as_ref())
    }

    pub(crate) fn first_duplicate(&self) -> Option<&str> {
        self.duplicates.first().map(String::as_str)
    }
}

impl<S> fmt::Debug for OperationTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.operations.keys().collect();
        names.sort_unstable();
        f.debug_struct("OperationTable")
            .field("operations", &names)
            .finish()
    }
}
