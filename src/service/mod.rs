//! Service definition and registration.
//!
//! # Data Flow
//! ```text
//! Registration (once):
//!     SoapService impl
//!     → probe.rs (inspect the serde shape: struct? Header/User/Password kinds)
//!     → operation.rs (typed operation table)
//!     → descriptor.rs (validated, immutable ServiceDescriptor)
//!
//! Per request:
//!     ServiceDescriptor
//!     → binding.rs (fresh instance: zero value + header + credentials)
//!     → operation.rs (decode input, invoke, reply.rs → response body)
//! ```
//!
//! # Design Decisions
//! - Shape violations are configuration errors raised at registration,
//!   never at request time
//! - A new instance is built for every request; nothing is pooled
//! - Recognized fields are matched by their serde name: `Header`, `User`,
//!   `Password`

pub mod binding;
pub mod descriptor;
pub mod operation;
pub mod probe;
pub mod reply;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::routing::AliasTable;

pub use binding::{BindError, Credentials};
pub use descriptor::{ServiceDescriptor, ServiceShape};
pub use operation::{CallError, Discard, Encoded, Operation, OperationTable};
pub use probe::FieldShape;
pub use reply::Reply;

/// Serde name of the field that receives the inbound SOAP header.
pub const HEADER_FIELD: &str = "Header";

/// Serde name of the field that receives the Basic auth user name.
pub const USER_FIELD: &str = "User";

/// Serde name of the field that receives the Basic auth password.
pub const PASSWORD_FIELD: &str = "Password";

/// A type whose operations are exposed as SOAP actions.
///
/// The service is deserialized from its zero value for every request, so it
/// is usually declared with `#[serde(default)]`. Optional recognized fields:
///
/// - `Header`: a struct (or `Option` of one) decoded from `soap:Header`
/// - `User`, `Password`: strings filled from HTTP Basic credentials
///
/// ```ignore
/// #[derive(Default, Deserialize)]
/// #[serde(default)]
/// struct Login {
///     #[serde(rename = "User")]
///     user: String,
/// }
///
/// impl SoapService for Login {
///     fn operations(table: &mut OperationTable<Self>) {
///         table.operation("PutDataBySqh", Login::put_data_by_sqh);
///     }
///
///     fn actions() -> AliasTable {
///         AliasTable::from_iter([("putDataBySqh", "PutDataBySqh")])
///     }
/// }
/// ```
pub trait SoapService: DeserializeOwned + Sized + 'static {
    /// Registers the operations of the service.
    fn operations(table: &mut OperationTable<Self>);

    /// Maps external action names onto operation names.
    fn actions() -> AliasTable {
        AliasTable::default()
    }
}

/// Errors in a service definition, detected at registration.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("service `{service}` must be a struct: {reason}")]
    InvalidServiceType {
        service: &'static str,
        reason: String,
    },

    #[error("`Header` field of `{service}` must be a struct or an optional struct, found {found}")]
    InvalidHeaderField {
        service: &'static str,
        found: FieldShape,
    },

    #[error("`{field}` field of `{service}` must be a string, found {found}")]
    InvalidCredentialField {
        service: &'static str,
        field: &'static str,
        found: FieldShape,
    },

    #[error("operation `{0}` is registered more than once")]
    DuplicateOperation(String),
}
