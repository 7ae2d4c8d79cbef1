//! Check that a deserialization target is a struct (or a map) before any
//! field is read, by asking its `Deserialize` impl what it wants.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, Visitor};

/// Whether `T` deserializes from a struct or map.
pub fn is_struct_like<T: for<'de> Deserialize<'de>>() -> bool {
    matches!(T::deserialize(Probe), Err(ProbeError::StructLike))
}

struct Probe;

#[derive(Debug)]
enum ProbeError {
    StructLike,
    Other,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::StructLike => write!(f, "struct-like target"),
            ProbeError::Other => write!(f, "not a struct-like target"),
        }
    }
}

impl std::error::Error for ProbeError {}

impl de::Error for ProbeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        ProbeError::Other
    }
}

impl<'de> Deserializer<'de> for Probe {
    type Error = ProbeError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, ProbeError> {
        Err(ProbeError::Other)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, ProbeError> {
        Err(ProbeError::StructLike)
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, ProbeError> {
        Err(ProbeError::StructLike)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct enum identifier ignored_any
    }
}
