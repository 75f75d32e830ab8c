//! Shape inspection through the serde data model.
//!
//! A service's `Deserialize` impl describes its shape: a derived struct asks
//! for `deserialize_struct` with its field list, and each field asks for the
//! kind of value it holds. The probes below answer those requests with a
//! [`Probe`] error carrying what was asked, so the shape is read without
//! constructing a value.

use std::fmt;

use serde::de::value::StrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, Visitor};
use serde::forward_to_deserialize_any;
use thiserror::Error;

/// Kind of value a recognized field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Struct,
    OptionalStruct,
    Text,
    OptionalText,
    Other,
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldShape::Struct => "a struct",
            FieldShape::OptionalStruct => "an optional struct",
            FieldShape::Text => "a string",
            FieldShape::OptionalText => "an optional string",
            FieldShape::Other => "a non-text, non-struct value",
        };
        f.write_str(name)
    }
}

/// Outcome of a probe. Every probe ends in an error; the variant says what
/// was learned.
#[derive(Debug, Error)]
pub(crate) enum Probe {
    #[error("struct with fields {0:?}")]
    Fields(&'static [&'static str]),

    #[error("field holding {0}")]
    Field(FieldShape),

    #[error("not a struct")]
    NotStruct,

    #[error("{0}")]
    Custom(String),
}

impl de::Error for Probe {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Probe::Custom(msg.to_string())
    }
}

/// Returns the serde field names of `T`, or why `T` is not a struct.
pub(crate) fn struct_fields<T: DeserializeOwned>() -> Result<&'static [&'static str], String> {
    match T::deserialize(ServiceProbe { field: None }) {
        Err(Probe::Fields(fields)) => Ok(fields),
        Err(Probe::NotStruct) => Err("its serde representation is not a struct".to_string()),
        Err(other) => Err(other.to_string()),
        Ok(_) => Err("its shape could not be inspected".to_string()),
    }
}

/// Returns the kind of value held by `field` of `T`.
pub(crate) fn field_shape<T: DeserializeOwned>(field: &'static str) -> Result<FieldShape, String> {
    match T::deserialize(ServiceProbe { field: Some(field) }) {
        Err(Probe::Field(shape)) => Ok(shape),
        Err(other) => Err(format!("field `{field}` could not be inspected: {other}")),
        Ok(_) => Err(format!("field `{field}` could not be inspected")),
    }
}

/// Probes the top-level type.
struct ServiceProbe {
    /// Field whose value kind is wanted; `None` asks for the field list.
    field: Option<&'static str>,
}

impl<'de> de::Deserializer<'de> for ServiceProbe {
    type Error = Probe;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Probe> {
        Err(Probe::NotStruct)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Probe> {
        match self.field {
            None => Err(Probe::Fields(fields)),
            Some(field) => visitor.visit_map(SingleField { field: Some(field) }),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Probe> {
        Err(Probe::Fields(&[]))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit newtype_struct seq tuple tuple_struct map
        enum identifier ignored_any
    }
}

/// Presents one key, then probes its value.
struct SingleField {
    field: Option<&'static str>,
}

impl<'de> MapAccess<'de> for SingleField {
    type Error = Probe;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Probe> {
        match self.field.take() {
            Some(field) => {
                let key: StrDeserializer<'_, Probe> = field.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Probe> {
        seed.deserialize(FieldProbe { optional: false })
    }
}

/// Probes the value of a single field.
struct FieldProbe {
    /// Set once an `Option` layer has been seen.
    optional: bool,
}

impl FieldProbe {
    fn found(&self, plain: FieldShape, optional: FieldShape) -> Probe {
        Probe::Field(if self.optional { optional } else { plain })
    }
}

impl<'de> de::Deserializer<'de> for FieldProbe {
    type Error = Probe;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Probe> {
        Err(Probe::Field(FieldShape::Other))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Probe> {
        Err(self.found(FieldShape::Struct, FieldShape::OptionalStruct))
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Probe> {
        Err(self.found(FieldShape::Struct, FieldShape::OptionalStruct))
    }

    fn deserialize_str<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Probe> {
        Err(self.found(FieldShape::Text, FieldShape::OptionalText))
    }

    fn deserialize_string<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Probe> {
        Err(self.found(FieldShape::Text, FieldShape::OptionalText))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Probe> {
        if self.optional {
            return Err(Probe::Field(FieldShape::Other));
        }
        visitor.visit_some(FieldProbe { optional: true })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf unit newtype_struct seq tuple tuple_struct map
        enum identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Auth {
        token: String,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Marker;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Service {
        plain: Auth,
        optional: Option<Auth>,
        boxed: Box<Auth>,
        marker: Marker,
        text: String,
        maybe_text: Option<String>,
        number: u32,
        map: HashMap<String, String>,
        nested_option: Option<Option<Auth>>,
        #[serde(rename = "Renamed")]
        renamed: String,
    }

    #[test]
    fn test_struct_fields() {
        let fields = struct_fields::<Service>().unwrap();
        assert!(fields.contains(&"plain"));
        assert!(fields.contains(&"Renamed"));
        assert!(!fields.contains(&"renamed"));

        assert_eq!(struct_fields::<Marker>().unwrap(), &[] as &[&str]);
    }

    #[test]
    fn test_non_structs_rejected() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Wrapper(u32);

        #[derive(Deserialize)]
        #[allow(dead_code)]
        enum Choice {
            A,
            B,
        }

        assert!(struct_fields::<Wrapper>().is_err());
        assert!(struct_fields::<Choice>().is_err());
        assert!(struct_fields::<String>().is_err());
    }

    #[test]
    fn test_field_shapes() {
        let cases = [
            ("plain", FieldShape::Struct),
            ("optional", FieldShape::OptionalStruct),
            ("boxed", FieldShape::Struct),
            ("marker", FieldShape::Struct),
            ("text", FieldShape::Text),
            ("maybe_text", FieldShape::OptionalText),
            ("number", FieldShape::Other),
            ("map", FieldShape::Other),
            ("nested_option", FieldShape::Other),
            ("Renamed", FieldShape::Text),
        ];

        for (field, expected) in cases {
            assert_eq!(field_shape::<Service>(field).unwrap(), expected, "field {field}");
        }
    }
}
