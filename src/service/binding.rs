//! Per-request instance construction.
//!
//! The service is deserialized from a map holding only the recognized fields
//! that have a value for this request. Every other field falls back to its
//! serde default, which gives each request a fresh zero-valued instance.

use std::fmt;
use std::vec;

use serde::de::value::StrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, Visitor};
use serde::forward_to_deserialize_any;
use thiserror::Error;

/// HTTP Basic credentials of the current request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Failure to build a service instance.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("failed to decode SOAP header: {0}")]
    Header(#[source] quick_xml::DeError),

    #[error("{0}")]
    Custom(String),
}

impl de::Error for BindError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        BindError::Custom(msg.to_string())
    }
}

/// A value for one recognized field.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Binding<'a> {
    /// Serialized `soap:Header` element.
    Header(&'a [u8]),
    Text(&'a str),
}

/// Deserializes `S` with the given fields set and all others defaulted.
pub(crate) fn bind<S: DeserializeOwned>(
    bindings: Vec<(&'static str, Binding<'_>)>,
) -> Result<S, BindError> {
    S::deserialize(InstanceBinder { bindings })
}

struct InstanceBinder<'a> {
    bindings: Vec<(&'static str, Binding<'a>)>,
}

impl<'de, 'a> de::Deserializer<'de> for InstanceBinder<'a> {
    type Error = BindError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        visitor.visit_map(BindingAccess {
            entries: self.bindings.into_iter(),
            pending: None,
        })
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BindError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit newtype_struct seq tuple tuple_struct map
        struct enum identifier ignored_any
    }
}

struct BindingAccess<'a> {
    entries: vec::IntoIter<(&'static str, Binding<'a>)>,
    pending: Option<Binding<'a>>,
}

impl<'de, 'a> MapAccess<'de> for BindingAccess<'a> {
    type Error = BindError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, BindError> {
        match self.entries.next() {
            Some((field, value)) => {
                self.pending = Some(value);
                let key: StrDeserializer<'_, BindError> = field.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, BindError> {
        match self.pending.take() {
            Some(Binding::Header(fragment)) => {
                let mut xml = quick_xml::de::Deserializer::from_reader(fragment);
                seed.deserialize(&mut xml).map_err(BindError::Header)
            }
            Some(Binding::Text(text)) => seed.deserialize(TextValue(text)),
            None => Err(BindError::Custom("value requested before key".into())),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// A string that also satisfies `Option<String>` targets.
struct TextValue<'a>(&'a str);

impl<'de, 'a> de::Deserializer<'de> for TextValue<'a> {
    type Error = BindError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        visitor.visit_str(self.0)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        visitor.visit_some(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple tuple_struct
        map struct enum identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Session {
        token: String,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Service {
        #[serde(rename = "Header")]
        header: Option<Session>,
        #[serde(rename = "User")]
        user: String,
        #[serde(rename = "Password")]
        password: Option<String>,
        calls: u32,
    }

    #[test]
    fn test_bind_defaults_without_bindings() {
        let service: Service = bind(Vec::new()).unwrap();
        assert_eq!(service, Service::default());
    }

    #[test]
    fn test_bind_header_and_credentials() {
        let header = b"<soap:Header><token>abc</token></soap:Header>";
        let service: Service = bind(vec![
            ("Header", Binding::Header(header)),
            ("User", Binding::Text("alice")),
            ("Password", Binding::Text("s3cret")),
        ])
        .unwrap();

        assert_eq!(
            service.header,
            Some(Session {
                token: "abc".into()
            })
        );
        assert_eq!(service.user, "alice");
        assert_eq!(service.password.as_deref(), Some("s3cret"));
        assert_eq!(service.calls, 0);
    }

    #[test]
    fn test_bind_unit_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Stateless;

        let service: Stateless = bind(Vec::new()).unwrap();
        assert_eq!(service, Stateless);
    }

    #[test]
    fn test_bind_requires_defaults() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            required: String,
        }

        let err = bind::<Strict>(Vec::new()).unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "s3cret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"));
    }
}
