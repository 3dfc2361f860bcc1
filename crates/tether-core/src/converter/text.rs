use super::*;

use uuid::Uuid;

#[derive(Debug)]
pub struct StringConverter;

impl FieldConverter for StringConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::String
    }

    fn parse_default(&self, _cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        Ok(Value::String(default.to_string()))
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        match value {
            value @ Value::String(_) => Ok(value),
            value => Err(Error::type_conversion(value, "STRING")),
        }
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        Ok(results.get_string(column)?.map(Value::String).unwrap_or_default())
    }

    fn is_escaped_value(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct CharConverter;

impl FieldConverter for CharConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Char
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        let mut chars = default.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(Value::Char(ch)),
            _ => Err(cx.invalid_default(default, "expected exactly one character")),
        }
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        match value {
            value @ Value::Char(_) => Ok(value),
            value => Err(Error::type_conversion(value, "CHAR")),
        }
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        results.get_char(column).map(Value::Char)
    }

    fn is_escaped_value(&self) -> bool {
        true
    }
}

/// Stores a [`Uuid`] as its hyphenated string form.
#[derive(Debug)]
pub struct UuidConverter;

impl FieldConverter for UuidConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::String
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        Uuid::parse_str(default)
            .map(Value::Uuid)
            .map_err(|err| cx.invalid_default(default, err))
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        match value {
            Value::Uuid(uuid) => Ok(Value::String(uuid.to_string())),
            value => Err(Error::type_conversion(value, "UUID")),
        }
    }

    fn result_to_host(
        &self,
        cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        let Some(text) = results.get_string(column)? else {
            return Ok(Value::Null);
        };

        Uuid::parse_str(&text).map(Value::Uuid).map_err(|err| {
            crate::err!(
                "column for field `{}` of `{}` holds an invalid uuid `{text}`: {err}",
                cx.field,
                cx.entity
            )
        })
    }

    fn is_escaped_value(&self) -> bool {
        true
    }
}
