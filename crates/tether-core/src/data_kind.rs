use crate::{
    converter::{self, FieldConverter},
    HostType, Value,
};

use serde::Deserialize;
use std::sync::Arc;

/// The closed catalog of storable scalar kinds.
///
/// Every mapped field resolves to exactly one kind, either derived from its
/// host type through [`DataKind::lookup`] or configured explicitly. Each kind
/// has one default [`FieldConverter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataKind {
    String,
    Boolean,
    Char,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,

    /// A date stored as a timestamp
    Date,

    /// A date stored as epoch milliseconds
    DateLong,

    /// A date stored as a formatted string
    DateString,

    /// Raw bytes
    ByteArray,

    /// A serde-serialized payload
    Serializable,

    /// An enum stored by constant name
    EnumString,

    /// An enum stored by ordinal
    EnumInteger,

    /// A UUID stored as its string form
    Uuid,
}

impl DataKind {
    /// Derives the kind for a host type. `Option` wrappers are looked
    /// through.
    ///
    /// Byte arrays and serializable payloads are never derived; they must be
    /// configured explicitly.
    pub fn lookup(ty: &HostType) -> Option<DataKind> {
        match ty.unwrap_option().0 {
            HostType::String => Some(Self::String),
            HostType::Bool => Some(Self::Boolean),
            HostType::Char => Some(Self::Char),
            HostType::I8 => Some(Self::Byte),
            HostType::I16 => Some(Self::Short),
            HostType::I32 => Some(Self::Integer),
            HostType::I64 => Some(Self::Long),
            HostType::F32 => Some(Self::Float),
            HostType::F64 => Some(Self::Double),
            HostType::DateTime => Some(Self::Date),
            HostType::Uuid => Some(Self::Uuid),
            HostType::Enum(_) => Some(Self::EnumString),
            HostType::Bytes
            | HostType::Serializable(_)
            | HostType::Entity(_)
            | HostType::Opaque(_)
            | HostType::Option(_) => None,
        }
    }

    /// Returns `true` if a field of host type `ty` may be configured with
    /// this kind.
    pub fn is_valid_for(self, ty: &HostType) -> bool {
        let ty = ty.unwrap_option().0;

        match self {
            Self::String => matches!(ty, HostType::String),
            Self::Boolean => matches!(ty, HostType::Bool),
            Self::Char => matches!(ty, HostType::Char),
            Self::Byte | Self::Short | Self::Integer | Self::Long => ty.is_integer(),
            Self::Float | Self::Double => matches!(ty, HostType::F32 | HostType::F64),
            Self::Date | Self::DateLong | Self::DateString => matches!(ty, HostType::DateTime),
            Self::ByteArray => matches!(ty, HostType::Bytes),
            Self::Serializable => matches!(ty, HostType::Serializable(_)),
            Self::EnumString | Self::EnumInteger => matches!(ty, HostType::Enum(_)),
            Self::Uuid => matches!(ty, HostType::Uuid),
        }
    }

    /// The configuration name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
            Self::Char => "CHAR",
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Date => "DATE",
            Self::DateLong => "DATE_LONG",
            Self::DateString => "DATE_STRING",
            Self::ByteArray => "BYTE_ARRAY",
            Self::Serializable => "SERIALIZABLE",
            Self::EnumString => "ENUM_STRING",
            Self::EnumInteger => "ENUM_INTEGER",
            Self::Uuid => "UUID",
        }
    }

    /// Kinds the database can generate id values for.
    pub fn is_valid_generated_id(self) -> bool {
        matches!(self, Self::Short | Self::Integer | Self::Long)
    }

    /// Kinds whose values can identify a row.
    pub fn is_appropriate_id(self) -> bool {
        !matches!(
            self,
            Self::Boolean | Self::Float | Self::Double | Self::ByteArray | Self::Serializable
        )
    }

    /// Converts a numeric generated key into a value of this kind.
    pub fn convert_id_number(self, number: i64) -> Option<Value> {
        match self {
            Self::Short => i16::try_from(number).ok().map(Value::I16),
            Self::Integer => i32::try_from(number).ok().map(Value::I32),
            Self::Long => Some(Value::I64(number)),
            _ => None,
        }
    }

    /// Value stored into a non-`Option` property when its column is null.
    ///
    /// `None` for kinds without a natural zero value.
    pub fn zero_value(self) -> Option<Value> {
        match self {
            Self::String => Some(Value::String(String::new())),
            Self::Boolean => Some(Value::Bool(false)),
            Self::Char => Some(Value::Char('\0')),
            Self::Byte => Some(Value::I8(0)),
            Self::Short => Some(Value::I16(0)),
            Self::Integer => Some(Value::I32(0)),
            Self::Long => Some(Value::I64(0)),
            Self::Float => Some(Value::F32(0.0)),
            Self::Double => Some(Value::F64(0.0)),
            Self::ByteArray => Some(Value::Bytes(vec![])),
            _ => None,
        }
    }

    /// The default converter for this kind.
    pub fn converter(self) -> Arc<dyn FieldConverter> {
        match self {
            Self::String => Arc::new(converter::StringConverter),
            Self::Boolean => Arc::new(converter::BooleanConverter),
            Self::Char => Arc::new(converter::CharConverter),
            Self::Byte => Arc::new(converter::ByteConverter),
            Self::Short => Arc::new(converter::ShortConverter),
            Self::Integer => Arc::new(converter::IntegerConverter),
            Self::Long => Arc::new(converter::LongConverter),
            Self::Float => Arc::new(converter::FloatConverter),
            Self::Double => Arc::new(converter::DoubleConverter),
            Self::Date => Arc::new(converter::DateConverter),
            Self::DateLong => Arc::new(converter::DateLongConverter),
            Self::DateString => Arc::new(converter::DateStringConverter),
            Self::ByteArray => Arc::new(converter::ByteArrayConverter),
            Self::Serializable => Arc::new(converter::SerializableConverter),
            Self::EnumString => Arc::new(converter::EnumStringConverter),
            Self::EnumInteger => Arc::new(converter::EnumIntegerConverter),
            Self::Uuid => Arc::new(converter::UuidConverter),
        }
    }
}
