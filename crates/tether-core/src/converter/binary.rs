use super::*;

fn no_default(cx: &ConvertCx<'_>, default: &str) -> Error {
    cx.invalid_default(default, "binary fields cannot have default values")
}

fn expect_bytes(value: Value, kind: &'static str) -> Result<Value> {
    match value {
        value @ Value::Bytes(_) => Ok(value),
        value => Err(Error::type_conversion(value, kind)),
    }
}

/// Raw bytes, stored as-is.
#[derive(Debug)]
pub struct ByteArrayConverter;

impl FieldConverter for ByteArrayConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::ByteArray
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        Err(no_default(cx, default))
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        expect_bytes(value, "BYTE_ARRAY")
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        Ok(results.get_bytes(column)?.map(Value::Bytes).unwrap_or_default())
    }

    fn is_stream_type(&self) -> bool {
        true
    }
}

/// A serde payload. The host value is already serialized by
/// [`Serialized`](crate::Serialized), so the bytes pass through.
#[derive(Debug)]
pub struct SerializableConverter;

impl FieldConverter for SerializableConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Serializable
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        Err(no_default(cx, default))
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        expect_bytes(value, "SERIALIZABLE")
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        Ok(results.get_bytes(column)?.map(Value::Bytes).unwrap_or_default())
    }

    fn is_stream_type(&self) -> bool {
        true
    }
}
