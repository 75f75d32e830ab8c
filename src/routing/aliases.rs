//! Alias table.
//!
//! Keys are unique and insertion order is irrelevant. Aliases are applied
//! once; a target that is itself an alias is not followed.

use std::collections::HashMap;

/// Mapping from external action names to operation names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an alias, replacing any previous target for `action`.
    pub fn insert(&mut self, action: impl Into<String>, operation: impl Into<String>) {
        self.entries.insert(action.into(), operation.into());
    }

    /// The operation an action is aliased to, if any.
    pub fn get(&self, action: &str) -> Option<&str> {
        self.entries.get(action).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (action, operation) in iter {
            table.insert(action, operation);
        }
        table
    }
}

impl From<HashMap<String, String>> for AliasTable {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}
