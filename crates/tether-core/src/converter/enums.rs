use super::*;
use crate::EnumType;

fn enum_type<'a>(cx: &ConvertCx<'a>) -> Result<&'a EnumType> {
    cx.ty
        .as_enum()
        .ok_or_else(|| Error::unsupported_type(cx.entity, cx.field, cx.ty))
}

/// Resolves an enum constant by ordinal, falling back to the configured
/// unknown constant.
pub fn enum_from_ordinal(cx: &ConvertCx<'_>, ordinal: i64) -> Result<Value> {
    let ty = enum_type(cx)?;

    match usize::try_from(ordinal) {
        Ok(index) if index < ty.constants().len() => Ok(Value::Enum(index)),
        _ => cx
            .unknown_enum
            .map(Value::Enum)
            .ok_or_else(|| Error::unknown_enum_value(ty.name(), ordinal)),
    }
}

/// Resolves an enum constant by name, falling back to the configured unknown
/// constant.
pub fn enum_from_name(cx: &ConvertCx<'_>, name: &str) -> Result<Value> {
    let ty = enum_type(cx)?;

    match ty.ordinal_of(name) {
        Some(index) => Ok(Value::Enum(index)),
        None => cx
            .unknown_enum
            .map(Value::Enum)
            .ok_or_else(|| Error::unknown_enum_value(ty.name(), name)),
    }
}

/// Stores enums by constant name.
#[derive(Debug)]
pub struct EnumStringConverter;

impl FieldConverter for EnumStringConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::String
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        let ty = enum_type(cx)?;
        ty.ordinal_of(default)
            .map(Value::Enum)
            .ok_or_else(|| cx.invalid_default(default, format!("not a constant of `{}`", ty.name())))
    }

    fn host_to_storage(&self, cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        let ty = enum_type(cx)?;
        match value {
            Value::Enum(index) if index < ty.constants().len() => {
                Ok(Value::String(ty.constants()[index].to_string()))
            }
            value => Err(Error::type_conversion(value, "ENUM_STRING")),
        }
    }

    fn result_to_host(
        &self,
        cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        match results.get_string(column)? {
            Some(name) => enum_from_name(cx, &name),
            None => Ok(Value::Null),
        }
    }

    fn is_escaped_value(&self) -> bool {
        true
    }
}

/// Stores enums by ordinal.
#[derive(Debug)]
pub struct EnumIntegerConverter;

impl FieldConverter for EnumIntegerConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Integer
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        let ty = enum_type(cx)?;
        default
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|index| *index < ty.constants().len())
            .map(Value::Enum)
            .ok_or_else(|| cx.invalid_default(default, format!("not an ordinal of `{}`", ty.name())))
    }

    fn host_to_storage(&self, cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        let ty = enum_type(cx)?;
        match value {
            Value::Enum(index) if index < ty.constants().len() => {
                i32::try_from(index)
                    .map(Value::I32)
                    .map_err(|_| Error::type_conversion(Value::Enum(index), "ENUM_INTEGER"))
            }
            value => Err(Error::type_conversion(value, "ENUM_INTEGER")),
        }
    }

    fn result_to_host(
        &self,
        cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        enum_from_ordinal(cx, results.get_i32(column)?.into())
    }
}
