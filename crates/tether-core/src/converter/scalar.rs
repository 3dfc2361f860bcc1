use super::*;

#[derive(Debug)]
pub struct BooleanConverter;

impl FieldConverter for BooleanConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Boolean
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        default
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|err| cx.invalid_default(default, err))
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        match value {
            value @ Value::Bool(_) => Ok(value),
            value => Err(Error::type_conversion(value, "BOOLEAN")),
        }
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        results.get_bool(column).map(Value::Bool)
    }
}

macro_rules! integer_converter {
    ($name:ident, $ty:ty, $variant:ident, $storage:ident, $getter:ident, $lit:literal) => {
        #[derive(Debug)]
        pub struct $name;

        impl FieldConverter for $name {
            fn storage_type(&self) -> StorageType {
                StorageType::$storage
            }

            fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
                default
                    .trim()
                    .parse::<$ty>()
                    .map(Value::$variant)
                    .map_err(|err| cx.invalid_default(default, err))
            }

            fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
                match value.to_i64().map(<$ty>::try_from) {
                    Some(Ok(v)) => Ok(Value::$variant(v)),
                    _ => Err(Error::type_conversion(value, $lit)),
                }
            }

            fn result_to_host(
                &self,
                _cx: &ConvertCx<'_>,
                results: &dyn Results,
                column: usize,
            ) -> Result<Value> {
                results.$getter(column).map(Value::$variant)
            }
        }
    };
}

integer_converter!(ByteConverter, i8, I8, Byte, get_i8, "BYTE");
integer_converter!(ShortConverter, i16, I16, Short, get_i16, "SHORT");
integer_converter!(IntegerConverter, i32, I32, Integer, get_i32, "INTEGER");
integer_converter!(LongConverter, i64, I64, Long, get_i64, "LONG");

#[derive(Debug)]
pub struct FloatConverter;

impl FieldConverter for FloatConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Float
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        default
            .trim()
            .parse::<f32>()
            .map(Value::F32)
            .map_err(|err| cx.invalid_default(default, err))
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        match value {
            value @ Value::F32(_) => Ok(value),
            Value::F64(v) => Ok(Value::F32(v as f32)),
            value => Err(Error::type_conversion(value, "FLOAT")),
        }
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        results.get_f32(column).map(Value::F32)
    }
}

#[derive(Debug)]
pub struct DoubleConverter;

impl FieldConverter for DoubleConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Double
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        default
            .trim()
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|err| cx.invalid_default(default, err))
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        match value {
            value @ Value::F64(_) => Ok(value),
            Value::F32(v) => Ok(Value::F64(v.into())),
            value => Err(Error::type_conversion(value, "DOUBLE")),
        }
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        results.get_f64(column).map(Value::F64)
    }
}
