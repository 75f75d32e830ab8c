//! SOAPAction resolution.
//!
//! # Responsibilities
//! - Strip the default namespace prefix (`http://tempuri.org/` unless
//!   configured otherwise)
//! - Strip surrounding quotes and whitespace
//! - Apply the alias table
//!
//! # Design Decisions
//! - Quotes are stripped on both sides of the prefix, so `"ns/Op"` and
//!   `ns/"Op"` both resolve to `Op`
//! - The prefix is only removed at the start of the value

use super::AliasTable;

/// Namespace prefix most SOAP clients put in front of the action name.
pub const DEFAULT_ACTION_NAMESPACE: &str = "http://tempuri.org/";

/// Maps raw SOAPAction header values to operation names.
#[derive(Debug, Clone)]
pub struct ActionResolver {
    namespace: String,
    aliases: AliasTable,
}

impl ActionResolver {
    pub fn new(namespace: impl Into<String>, aliases: AliasTable) -> Self {
        Self {
            namespace: namespace.into(),
            aliases,
        }
    }

    /// Resolves a raw header value to an operation name.
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        let action = self.strip(raw);
        self.aliases.get(action).unwrap_or(action)
    }

    /// The action name with namespace and quotes removed, before aliasing.
    pub fn strip<'a>(&self, raw: &'a str) -> &'a str {
        let action = raw.trim().trim_matches('"');
        let action = match self.namespace.as_str() {
            "" => action,
            ns => action.strip_prefix(ns).unwrap_or(action),
        };
        action.trim_matches('"').trim()
    }
}

impl Default for ActionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ACTION_NAMESPACE, AliasTable::default())
    }
}
