//! Conversion between host values and storage representations.
//!
//! Each [`DataKind`](crate::DataKind) has exactly one default converter. A
//! [`Dialect`](crate::Dialect) may register its own converter for a kind,
//! which then takes precedence for every field of that kind.

mod binary;
pub use binary::{ByteArrayConverter, SerializableConverter};

mod date;
pub use date::{DateConverter, DateLongConverter, DateStringConverter, DEFAULT_DATE_FORMAT};

mod enums;
pub use enums::{enum_from_name, enum_from_ordinal, EnumIntegerConverter, EnumStringConverter};

mod scalar;
pub use scalar::{
    BooleanConverter, ByteConverter, DoubleConverter, FloatConverter, IntegerConverter,
    LongConverter, ShortConverter,
};

mod text;
pub use text::{CharConverter, StringConverter, UuidConverter};

use crate::{Error, HostType, Result, Results, Value};

use std::fmt;

/// The storage-level scalar type a converter produces and consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    String,
    Date,
    Boolean,
    Char,
    Byte,
    ByteArray,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Serializable,
}

/// Field context handed to a converter.
#[derive(Debug, Clone, Copy)]
pub struct ConvertCx<'a> {
    /// Name of the enclosing entity type
    pub entity: &'a str,

    /// Name of the field being converted
    pub field: &'a str,

    /// The scalar host type of the field's values
    pub ty: &'a HostType,

    /// Ordinal of the enum fallback constant, if one is configured
    pub unknown_enum: Option<usize>,
}

/// Bidirectional conversion for one data kind.
///
/// `host_to_storage` and `result_to_host` are never called with nulls: the
/// field descriptor handles null values before dispatching to the converter.
pub trait FieldConverter: Send + Sync + fmt::Debug {
    /// The storage type values are converted to.
    fn storage_type(&self) -> StorageType;

    /// Parses a configured default value into a host value.
    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value>;

    /// Converts a host value into a storage argument.
    fn host_to_storage(&self, cx: &ConvertCx<'_>, value: Value) -> Result<Value>;

    /// Reads the column at position `column` and converts it to a host value.
    fn result_to_host(
        &self,
        cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value>;

    /// Stream-like kinds are not value-comparable and cannot be ids.
    fn is_stream_type(&self) -> bool {
        false
    }

    /// True if storage values must be quoted when inlined into a statement.
    fn is_escaped_value(&self) -> bool {
        false
    }

    /// True if the default value must be quoted when inlined into a
    /// statement.
    fn is_escaped_default_value(&self) -> bool {
        self.is_escaped_value()
    }
}

impl ConvertCx<'_> {
    /// Error for a default value the converter cannot parse.
    pub fn invalid_default(&self, default: &str, reason: impl fmt::Display) -> Error {
        Error::invalid_configuration(
            self.entity,
            self.field,
            format!("could not parse default value `{default}`: {reason}"),
        )
    }
}
