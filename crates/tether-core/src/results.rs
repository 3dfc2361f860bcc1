//! Read-only access to the current row of a query result.

use crate::{Error, Result, Value};

use chrono::NaiveDateTime;
use indexmap::IndexMap;

/// The current row of a database result set.
///
/// Scalar getters follow the convention of SQL drivers and return the zero
/// value for a null column; callers that need to tell the difference check
/// [`Results::is_null`] after reading. Reference-like getters return `None`
/// for nulls.
pub trait Results: Send + Sync {
    /// Position of the column named `name`.
    fn find_column(&self, name: &str) -> Result<usize>;

    /// True if the column at `column` is null.
    fn is_null(&self, column: usize) -> Result<bool>;

    fn get_bool(&self, column: usize) -> Result<bool>;

    fn get_char(&self, column: usize) -> Result<char>;

    fn get_i8(&self, column: usize) -> Result<i8>;

    fn get_i16(&self, column: usize) -> Result<i16>;

    fn get_i32(&self, column: usize) -> Result<i32>;

    fn get_i64(&self, column: usize) -> Result<i64>;

    fn get_f32(&self, column: usize) -> Result<f32>;

    fn get_f64(&self, column: usize) -> Result<f64>;

    fn get_string(&self, column: usize) -> Result<Option<String>>;

    fn get_bytes(&self, column: usize) -> Result<Option<Vec<u8>>>;

    fn get_timestamp(&self, column: usize) -> Result<Option<NaiveDateTime>>;
}

/// A single in-memory result row, keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column. Columns keep their insertion order.
    pub fn column(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn value(&self, column: usize) -> Result<&Value> {
        self.columns
            .get_index(column)
            .map(|(_, value)| value)
            .ok_or_else(|| crate::err!("column index {column} out of range"))
    }

    fn integer(&self, column: usize, ty: &'static str) -> Result<i64> {
        match self.value(column)? {
            Value::Null => Ok(0),
            value => value
                .to_i64()
                .ok_or_else(|| Error::type_conversion(value.clone(), ty)),
        }
    }
}

macro_rules! integer_getter {
    ($name:ident, $ty:ty, $lit:literal) => {
        fn $name(&self, column: usize) -> Result<$ty> {
            let value = self.integer(column, $lit)?;
            <$ty>::try_from(value).map_err(|_| Error::type_conversion(Value::I64(value), $lit))
        }
    };
}

impl Results for Row {
    fn find_column(&self, name: &str) -> Result<usize> {
        self.columns
            .get_index_of(name)
            .ok_or_else(|| crate::err!("unknown column `{name}`"))
    }

    fn is_null(&self, column: usize) -> Result<bool> {
        Ok(self.value(column)?.is_null())
    }

    fn get_bool(&self, column: usize) -> Result<bool> {
        match self.value(column)? {
            Value::Null => Ok(false),
            Value::Bool(v) => Ok(*v),
            value => Err(Error::type_conversion(value.clone(), "bool")),
        }
    }

    fn get_char(&self, column: usize) -> Result<char> {
        match self.value(column)? {
            Value::Null => Ok('\0'),
            Value::Char(v) => Ok(*v),
            value => Err(Error::type_conversion(value.clone(), "char")),
        }
    }

    integer_getter!(get_i8, i8, "i8");
    integer_getter!(get_i16, i16, "i16");
    integer_getter!(get_i32, i32, "i32");
    integer_getter!(get_i64, i64, "i64");

    fn get_f32(&self, column: usize) -> Result<f32> {
        match self.value(column)? {
            Value::Null => Ok(0.0),
            Value::F32(v) => Ok(*v),
            value => Err(Error::type_conversion(value.clone(), "f32")),
        }
    }

    fn get_f64(&self, column: usize) -> Result<f64> {
        match self.value(column)? {
            Value::Null => Ok(0.0),
            Value::F64(v) => Ok(*v),
            Value::F32(v) => Ok((*v).into()),
            value => Err(Error::type_conversion(value.clone(), "f64")),
        }
    }

    fn get_string(&self, column: usize) -> Result<Option<String>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::String(v) => Ok(Some(v.clone())),
            value => Err(Error::type_conversion(value.clone(), "String")),
        }
    }

    fn get_bytes(&self, column: usize) -> Result<Option<Vec<u8>>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Bytes(v) => Ok(Some(v.clone())),
            value => Err(Error::type_conversion(value.clone(), "Vec<u8>")),
        }
    }

    fn get_timestamp(&self, column: usize) -> Result<Option<NaiveDateTime>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::DateTime(v) => Ok(Some(*v)),
            value => Err(Error::type_conversion(value.clone(), "NaiveDateTime")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_scalars_read_as_zero() {
        let row = Row::new().column("id", Value::Null).column("name", "Bob");

        assert_eq!(row.find_column("name").unwrap(), 1);
        assert_eq!(row.get_i32(0).unwrap(), 0);
        assert!(row.is_null(0).unwrap());
        assert_eq!(row.get_string(1).unwrap().as_deref(), Some("Bob"));
    }

    #[test]
    fn integers_narrow_on_read() {
        let row = Row::new().column("id", 300_i64);
        assert_eq!(row.get_i16(0).unwrap(), 300);
        assert!(row.get_i8(0).unwrap_err().is_type_conversion());
    }

    #[test]
    fn unknown_column() {
        let row = Row::new();
        assert!(row.find_column("missing").is_err());
        assert!(row.get_bool(3).is_err());
    }
}
