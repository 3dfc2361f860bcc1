use crate::{Entity, EntityType, Error, Result, Value};

use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Serialize};
use std::{any::TypeId, fmt, sync::Arc};
use uuid::Uuid;

/// The declared type of a host property.
///
/// This stands in for runtime type introspection: each registered property
/// records its type once, and construction-time validation works entirely
/// from this description.
#[derive(Debug, Clone, PartialEq)]
pub enum HostType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    Bytes,
    DateTime,
    Uuid,

    /// A nullable wrapper around another host type (`Option<T>`).
    Option(Box<HostType>),

    /// A fieldless enum with a fixed constant list.
    Enum(EnumType),

    /// Another mapped entity type.
    Entity(EntityType),

    /// A value stored through serde serialization.
    Serializable(&'static str),

    /// A type with no storable representation.
    Opaque(&'static str),
}

/// The declared constant set of a persisted enum, captured at registration.
#[derive(Clone, Copy)]
pub struct EnumType {
    type_id: TypeId,
    name: &'static str,
    constants: &'static [&'static str],
}

impl HostType {
    /// Strips one level of `Option`, returning the inner type and whether a
    /// wrapper was present.
    pub fn unwrap_option(&self) -> (&HostType, bool) {
        match self {
            Self::Option(inner) => (inner, true),
            ty => (ty, false),
        }
    }

    /// A primitive is a non-nullable scalar: anything that is not an
    /// `Option`, an entity, or an opaque type.
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            Self::Option(_) | Self::Entity(_) | Self::Serializable(_) | Self::Opaque(_)
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self.unwrap_option().0 {
            Self::Enum(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityType> {
        match self.unwrap_option().0 {
            Self::Entity(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Char => f.write_str("char"),
            Self::I8 => f.write_str("i8"),
            Self::I16 => f.write_str("i16"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::String => f.write_str("String"),
            Self::Bytes => f.write_str("Vec<u8>"),
            Self::DateTime => f.write_str("NaiveDateTime"),
            Self::Uuid => f.write_str("Uuid"),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::Enum(ty) => f.write_str(ty.name),
            Self::Entity(ty) => f.write_str(ty.name()),
            Self::Serializable(name) | Self::Opaque(name) => f.write_str(name),
        }
    }
}

impl EnumType {
    pub fn of<T: 'static>(name: &'static str, constants: &'static [&'static str]) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
            constants,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn constants(&self) -> &'static [&'static str] {
        self.constants
    }

    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.constants.iter().position(|constant| *constant == name)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.name, self.constants)
    }
}

/// A Rust type that can live in a mapped property.
pub trait HostValue: Sized + Send + Sync + 'static {
    /// Describes the type for construction-time validation.
    fn host_type() -> HostType;

    /// Reads the value out of the property, failing with a type conversion
    /// error when it has no storable representation.
    fn to_value(&self) -> Result<Value>;

    /// Builds a property value, failing with a type conversion error when
    /// the value is not compatible.
    fn from_value(value: Value) -> Result<Self>;
}

impl HostValue for bool {
    fn host_type() -> HostType {
        HostType::Bool
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            value => Err(Error::type_conversion(value, "bool")),
        }
    }
}

impl HostValue for char {
    fn host_type() -> HostType {
        HostType::Char
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Char(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(v) => Ok(v),
            value => Err(Error::type_conversion(value, "char")),
        }
    }
}

macro_rules! impl_integer_host_value {
    ($ty:ty, $variant:ident, $lit:literal) => {
        impl HostValue for $ty {
            fn host_type() -> HostType {
                HostType::$variant
            }

            fn to_value(&self) -> Result<Value> {
                Ok(Value::$variant(*self))
            }

            // Any integer variant can be narrowed losslessly when in range.
            fn from_value(value: Value) -> Result<Self> {
                match value.to_i64().map(<$ty>::try_from) {
                    Some(Ok(v)) => Ok(v),
                    _ => Err(Error::type_conversion(value, $lit)),
                }
            }
        }
    };
}

impl_integer_host_value!(i8, I8, "i8");
impl_integer_host_value!(i16, I16, "i16");
impl_integer_host_value!(i32, I32, "i32");
impl_integer_host_value!(i64, I64, "i64");

impl HostValue for f32 {
    fn host_type() -> HostType {
        HostType::F32
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::F32(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v),
            // A DOUBLE column mapped onto an `f32` property.
            Value::F64(v) => Ok(v as f32),
            value => Err(Error::type_conversion(value, "f32")),
        }
    }
}

impl HostValue for f64 {
    fn host_type() -> HostType {
        HostType::F64
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F64(v) => Ok(v),
            Value::F32(v) => Ok(v.into()),
            value => Err(Error::type_conversion(value, "f64")),
        }
    }
}

impl HostValue for String {
    fn host_type() -> HostType {
        HostType::String
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            value => Err(Error::type_conversion(value, "String")),
        }
    }
}

impl HostValue for Vec<u8> {
    fn host_type() -> HostType {
        HostType::Bytes
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bytes(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            value => Err(Error::type_conversion(value, "Vec<u8>")),
        }
    }
}

impl HostValue for NaiveDateTime {
    fn host_type() -> HostType {
        HostType::DateTime
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::DateTime(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            value => Err(Error::type_conversion(value, "NaiveDateTime")),
        }
    }
}

impl HostValue for Uuid {
    fn host_type() -> HostType {
        HostType::Uuid
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Uuid(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(v) => Ok(v),
            value => Err(Error::type_conversion(value, "Uuid")),
        }
    }
}

impl HostValue for () {
    fn host_type() -> HostType {
        HostType::Opaque("()")
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(()),
            value => Err(Error::type_conversion(value, "()")),
        }
    }
}

impl<T: HostValue> HostValue for Option<T> {
    fn host_type() -> HostType {
        HostType::Option(Box::new(T::host_type()))
    }

    fn to_value(&self) -> Result<Value> {
        match self {
            Some(value) => value.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<E: Entity> HostValue for Arc<E> {
    fn host_type() -> HostType {
        HostType::Entity(EntityType::of::<E>())
    }

    fn to_value(&self) -> Result<Value> {
        Ok(Value::Entity(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Entity(entity) => entity
                .downcast::<E>()
                .map_err(|entity| Error::type_conversion(Value::Entity(entity), E::NAME)),
            value => Err(Error::type_conversion(value, E::NAME)),
        }
    }
}

/// A property value persisted through serde, as a JSON byte payload.
///
/// Fields of this type must be configured with
/// [`DataKind::Serializable`](crate::DataKind::Serializable).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Serialized<T>(pub T);

impl<T> HostValue for Serialized<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn host_type() -> HostType {
        HostType::Serializable(std::any::type_name::<T>())
    }

    fn to_value(&self) -> Result<Value> {
        let type_name = std::any::type_name::<T>();
        let bytes = serde_json::to_vec(&self.0).map_err(|err| {
            log::debug!("failed to serialize {type_name}: {err}");
            Error::from(err).context(Error::type_conversion_from(type_name, "Serialized"))
        })?;
        Ok(Value::Bytes(bytes))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(bytes) => Ok(Serialized(serde_json::from_slice(&bytes)?)),
            value => Err(Error::type_conversion(value, "Serialized")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_narrow_when_in_range() {
        assert_eq!(i32::from_value(Value::I64(42)).unwrap(), 42);
        assert!(i8::from_value(Value::I64(200)).is_err());
        assert!(i32::from_value(Value::from("42")).is_err());
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::I32(3)).unwrap(), Some(3));
        assert_eq!(
            Option::<i32>::host_type(),
            HostType::Option(Box::new(HostType::I32))
        );
    }

    #[test]
    fn primitive_classification() {
        assert!(HostType::I32.is_primitive());
        assert!(!Option::<i32>::host_type().is_primitive());
        assert!(!HostType::Opaque("()").is_primitive());
    }

    #[test]
    fn unserializable_payload_fails() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), 3);

        let err = Serialized(map).to_value().unwrap_err();
        assert!(err.is_type_conversion());
        assert!(!err.is_configuration());
    }

    #[test]
    fn serialized_payload_round_trips() {
        let value = Serialized(vec![1_u32, 2, 3]).to_value().unwrap();
        let back = Serialized::<Vec<u32>>::from_value(value).unwrap();
        assert_eq!(back, Serialized(vec![1, 2, 3]));
    }
}
