use super::*;

use chrono::{DateTime, NaiveDateTime};

/// Format used to parse date default values.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Format of dates stored as strings.
const DATE_STRING_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

fn parse_date(cx: &ConvertCx<'_>, default: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(default, DEFAULT_DATE_FORMAT)
        .map_err(|err| cx.invalid_default(default, err))
}

fn expect_date(value: Value, kind: &'static str) -> Result<NaiveDateTime> {
    match value {
        Value::DateTime(date) => Ok(date),
        value => Err(Error::type_conversion(value, kind)),
    }
}

/// Stores dates as native timestamps.
#[derive(Debug)]
pub struct DateConverter;

impl FieldConverter for DateConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Date
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        parse_date(cx, default).map(Value::DateTime)
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        expect_date(value, "DATE").map(Value::DateTime)
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        Ok(results.get_timestamp(column)?.map(Value::DateTime).unwrap_or_default())
    }

    fn is_escaped_value(&self) -> bool {
        true
    }
}

/// Stores dates as milliseconds since the Unix epoch.
#[derive(Debug)]
pub struct DateLongConverter;

impl DateLongConverter {
    fn from_millis(millis: i64) -> Result<NaiveDateTime> {
        DateTime::from_timestamp_millis(millis)
            .map(|date| date.naive_utc())
            .ok_or_else(|| Error::type_conversion(Value::I64(millis), "NaiveDateTime"))
    }
}

impl FieldConverter for DateLongConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::Long
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        let millis = default
            .trim()
            .parse::<i64>()
            .map_err(|err| cx.invalid_default(default, err))?;
        Self::from_millis(millis).map(Value::DateTime)
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        let date = expect_date(value, "DATE_LONG")?;
        Ok(Value::I64(date.and_utc().timestamp_millis()))
    }

    fn result_to_host(
        &self,
        _cx: &ConvertCx<'_>,
        results: &dyn Results,
        column: usize,
    ) -> Result<Value> {
        Self::from_millis(results.get_i64(column)?).map(Value::DateTime)
    }
}

/// Stores dates as formatted strings.
#[derive(Debug)]
pub struct DateStringConverter;

impl FieldConverter for DateStringConverter {
    fn storage_type(&self) -> StorageType {
        StorageType::String
    }

    fn parse_default(&self, cx: &ConvertCx<'_>, default: &str) -> Result<Value> {
        parse_date(cx, default).map(Value::DateTime)
    }

    fn host_to_storage(&self, _cx: &ConvertCx<'_>, value: Value) -> Result<Value> {
        let date = expect_date(value, "DATE_STRING")?;
        Ok(Value::String(date.format(DATE_STRING_FORMAT).to_string()))
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

        NaiveDateTime::parse_from_str(&text, DEFAULT_DATE_FORMAT)
            .map(Value::DateTime)
            .map_err(|err| {
                crate::err!(
                    "column for field `{}` of `{}` holds an invalid date `{text}`: {err}",
                    cx.field,
                    cx.entity
                )
            })
    }

    fn is_escaped_value(&self) -> bool {
        true
    }
}
