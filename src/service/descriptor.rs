//! Service description, computed once at registration.
//!
//! # Responsibilities
//! - Check that the service is a struct that can be zero-constructed
//! - Check the kinds of the recognized `Header`, `User`, `Password` fields
//! - Collect the operation table and the alias table
//! - Build the per-request instance

use std::any::type_name;
use std::fmt;

use tracing::{debug, warn};

use super::binding::{bind, Binding};
use super::operation::ErasedOperation;
use super::probe::{field_shape, struct_fields};
use super::{
    BindError, Credentials, DescriptorError, FieldShape, OperationTable, SoapService,
    HEADER_FIELD, PASSWORD_FIELD, USER_FIELD,
};
use crate::routing::AliasTable;

/// Which recognized fields a service declares, and their kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceShape {
    pub header: Option<FieldShape>,
    pub user: Option<FieldShape>,
    pub password: Option<FieldShape>,
}

/// Validated, immutable description of a service type.
pub struct ServiceDescriptor<S> {
    name: &'static str,
    shape: ServiceShape,
    aliases: AliasTable,
    operations: OperationTable<S>,
}

impl<S: SoapService> ServiceDescriptor<S> {
    /// Inspects `S` and collects its operations and aliases.
    pub fn describe() -> Result<Self, DescriptorError> {
        let name = short_type_name::<S>();

        let fields = struct_fields::<S>().map_err(|reason| DescriptorError::InvalidServiceType {
            service: name,
            reason,
        })?;

        let shape = ServiceShape {
            header: recognized::<S>(name, fields, HEADER_FIELD)?,
            user: recognized::<S>(name, fields, USER_FIELD)?,
            password: recognized::<S>(name, fields, PASSWORD_FIELD)?,
        };

        if let Some(found) = shape.header {
            if !matches!(found, FieldShape::Struct | FieldShape::OptionalStruct) {
                return Err(DescriptorError::InvalidHeaderField {
                    service: name,
                    found,
                });
            }
        }

        for (field, found) in [(USER_FIELD, shape.user), (PASSWORD_FIELD, shape.password)] {
            if let Some(found) = found {
                if !matches!(found, FieldShape::Text | FieldShape::OptionalText) {
                    return Err(DescriptorError::InvalidCredentialField {
                        service: name,
                        field,
                        found,
                    });
                }
            }
        }

        // Every request starts from this value, so it must exist.
        bind::<S>(Vec::new()).map_err(|e| DescriptorError::InvalidServiceType {
            service: name,
            reason: format!("it cannot be built from its zero value: {e}"),
        })?;

        let mut operations = OperationTable::new();
        S::operations(&mut operations);
        if let Some(duplicate) = operations.first_duplicate() {
            return Err(DescriptorError::DuplicateOperation(duplicate.to_string()));
        }

        let aliases = S::actions();
        for (action, operation) in aliases.iter() {
            if !operations.contains(operation) {
                warn!(
                    service = name,
                    action,
                    operation,
                    "Alias points to an unregistered operation"
                );
            }
        }

        debug!(
            service = name,
            operations = operations.len(),
            aliases = aliases.len(),
            ?shape,
            "Service described"
        );

        Ok(Self {
            name,
            shape,
            aliases,
            operations,
        })
    }

    /// Builds a fresh instance for one request.
    ///
    /// `header` is the serialized `soap:Header` element. It is only used when
    /// the service declares a `Header` field, and credentials only fill the
    /// `User` and `Password` fields the service declares.
    pub fn instantiate(
        &self,
        header: Option<&[u8]>,
        credentials: Option<&Credentials>,
    ) -> Result<S, BindError> {
        let mut bindings = Vec::with_capacity(3);

        if let (Some(_), Some(fragment)) = (self.shape.header, header) {
            bindings.push((HEADER_FIELD, Binding::Header(fragment)));
        }
        if let Some(credentials) = credentials {
            if self.shape.user.is_some() {
                bindings.push((USER_FIELD, Binding::Text(&credentials.user)));
            }
            if self.shape.password.is_some() {
                bindings.push((PASSWORD_FIELD, Binding::Text(&credentials.password)));
            }
        }

        bind(bindings)
    }
}

impl<S: 'static> ServiceDescriptor<S> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> ServiceShape {
        self.shape
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn operations(&self) -> &OperationTable<S> {
        &self.operations
    }

    pub(crate) fn operation(&self, name: &str) -> Option<&dyn ErasedOperation<S>> {
        self.operations.get(name)
    }
}

impl<S> fmt::Debug for ServiceDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("aliases", &self.aliases)
            .field("operations", &self.operations)
            .finish()
    }
}

/// Kind of a recognized field, or `None` when the service lacks it.
fn recognized<S: SoapService>(
    service: &'static str,
    fields: &[&str],
    field: &'static str,
) -> Result<Option<FieldShape>, DescriptorError> {
    if !fields.contains(&field) {
        return Ok(None);
    }
    field_shape::<S>(field)
        .map(Some)
        .map_err(|reason| DescriptorError::InvalidServiceType { service, reason })
}

fn short_type_name<S>() -> &'static str {
    let full = type_name::<S>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
