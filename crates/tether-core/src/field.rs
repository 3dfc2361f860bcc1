//! Compiled per-column metadata.

mod build;

use crate::{
    converter::{self, ConvertCx},
    foreign::Resolution,
    Accessor, ConnectionSource, DataKind, Error, FieldConverter, Foreign, HostType, Result,
    Results, Value,
};

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

/// The compiled, immutable mapping of one property to one column.
///
/// Descriptors are built once by the [`Registry`](crate::Registry) and then
/// shared read-only. All per-instance state (the property values, including
/// cached foreign references) lives on the owner instances passed in.
#[derive(Clone)]
pub struct FieldDescriptor {
    entity: &'static str,
    table_name: String,
    field_name: &'static str,
    column_name: String,
    data_kind: DataKind,

    /// The declared property type
    host_ty: HostType,

    /// Scalar type the converter works with. For foreign fields this is the
    /// type of the referenced id.
    value_ty: HostType,

    converter: Arc<dyn FieldConverter>,
    width: usize,
    default_value: Option<Value>,
    can_be_null: bool,
    throw_if_null: bool,
    primitive: bool,
    id: bool,
    generated_id: bool,
    generated_id_sequence: Option<String>,
    foreign: Option<Foreign>,
    unknown_enum: Option<usize>,
    accessor: Accessor,
}

impl FieldDescriptor {
    /// Name of the enclosing entity type.
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn field_name(&self) -> &'static str {
        self.field_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn data_kind(&self) -> DataKind {
        self.data_kind
    }

    pub fn host_type(&self) -> &HostType {
        &self.host_ty
    }

    pub fn converter(&self) -> &Arc<dyn FieldConverter> {
        &self.converter
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// The parsed default, as a host value.
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn can_be_null(&self) -> bool {
        self.can_be_null
    }

    pub fn throw_if_null(&self) -> bool {
        self.throw_if_null
    }

    /// True for ids, generated or not.
    pub fn is_id(&self) -> bool {
        self.id
    }

    pub fn is_generated_id(&self) -> bool {
        self.generated_id
    }

    pub fn generated_id_sequence(&self) -> Option<&str> {
        self.generated_id_sequence.as_deref()
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign.is_some()
    }

    pub fn foreign(&self) -> Option<&Foreign> {
        self.foreign.as_ref()
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn is_escaped_value(&self) -> bool {
        self.converter.is_escaped_value()
    }

    pub fn is_escaped_default_value(&self) -> bool {
        self.converter.is_escaped_default_value()
    }

    /// Reads the property from `owner`.
    pub fn get(&self, owner: &dyn Any) -> Result<Value> {
        self.accessor.get(owner)
    }

    /// Writes the property on `owner`.
    pub fn set(&self, owner: &mut dyn Any, value: Value) -> Result<()> {
        self.accessor.set(owner, value)
    }

    /// Reads the id-like value of the property: for foreign fields the id of
    /// the referenced entity, otherwise the property value itself.
    pub fn get_id(&self, owner: &dyn Any) -> Result<Value> {
        let value = self.get(owner)?;

        match (&self.foreign, value) {
            (Some(foreign), Value::Entity(entity)) => foreign.id_of(&entity),
            (_, value) => Ok(value),
        }
    }

    /// Stores a database-generated key into an id field.
    pub fn assign_id(&self, owner: &mut dyn Any, number: i64) -> Result<()> {
        let value = self
            .data_kind
            .convert_id_number(number)
            .ok_or_else(|| Error::type_conversion(Value::I64(number), self.data_kind.name()))?;
        self.set(owner, value)
    }

    /// Reads the property from `owner` and converts it to a storage argument.
    pub fn extract_storage_arg(&self, owner: &dyn Any) -> Result<Value> {
        self.to_storage(self.get(owner)?)
    }

    /// Converts a host value to its storage representation.
    ///
    /// Entities held by foreign fields are converted to the storage form of
    /// their id.
    pub fn to_storage(&self, value: Value) -> Result<Value> {
        match (&self.foreign, value) {
            (_, Value::Null) => Ok(Value::Null),
            (Some(foreign), Value::Entity(entity)) => {
                foreign.id_field().to_storage(foreign.id_of(&entity)?)
            }
            (_, value) => self.converter.host_to_storage(&self.cx(), value),
        }
    }

    /// Reads this field's column from the current row.
    ///
    /// `columns` caches column positions by name across rows. A null column
    /// yields `Value::Null` for nullable fields and the kind's zero value for
    /// primitives; it fails when the column must not be null. Foreign fields
    /// yield the referenced id, which is then passed to [`assign`].
    ///
    /// [`assign`]: FieldDescriptor::assign
    pub fn result_to_host(
        &self,
        results: &dyn Results,
        columns: &mut HashMap<String, usize>,
    ) -> Result<Value> {
        let column = match columns.get(&self.column_name) {
            Some(column) => *column,
            None => {
                let column = results.find_column(&self.column_name)?;
                columns.insert(self.column_name.clone(), column);
                column
            }
        };

        if results.is_null(column)? {
            return self.null_value();
        }

        self.converter.result_to_host(&self.cx(), results, column)
    }

    fn null_value(&self) -> Result<Value> {
        if self.throw_if_null || (self.primitive && !self.can_be_null) {
            return Err(Error::unexpected_null(self.entity, &self.column_name));
        }

        if !self.primitive {
            return Ok(Value::Null);
        }

        self.data_kind
            .zero_value()
            .ok_or_else(|| Error::unexpected_null(self.entity, &self.column_name))
    }

    /// Assigns a value read from the database to the property.
    ///
    /// For foreign fields `value` is the referenced id: the cached reference
    /// is kept when it already has that id, otherwise a stub is stored. The
    /// stub is never refreshed here; use [`assign_and_refresh`] for fields
    /// configured with `foreign_auto_refresh`.
    ///
    /// [`assign_and_refresh`]: FieldDescriptor::assign_and_refresh
    pub fn assign(&self, owner: &mut dyn Any, value: Value) -> Result<()> {
        let Some(foreign) = &self.foreign else {
            return self.set(owner, value);
        };

        if value.is_null() || value.is_entity() {
            return self.set(owner, value);
        }

        match foreign.resolve(&self.get(owner)?, &value)? {
            Resolution::Cached => Ok(()),
            Resolution::Stub(stub) => self.set(owner, Value::Entity(stub)),
        }
    }

    /// Like [`assign`], but fetches the full referenced row through `source`
    /// when the field is configured with `foreign_auto_refresh`.
    ///
    /// This may block on the connection source and fails if the fetch fails
    /// or the referenced row does not exist; the owner is left unchanged in
    /// that case.
    ///
    /// [`assign`]: FieldDescriptor::assign
    pub async fn assign_and_refresh(
        &self,
        owner: &mut (dyn Any + Send),
        value: Value,
        source: &dyn ConnectionSource,
    ) -> Result<()> {
        let Some(foreign) = self.foreign.as_ref().filter(|foreign| foreign.auto_refresh()) else {
            return self.assign(&mut *owner, value);
        };

        if value.is_null() || value.is_entity() {
            return self.set(&mut *owner, value);
        }

        match foreign.resolve(&self.get(&*owner)?, &value)? {
            Resolution::Cached => Ok(()),
            Resolution::Stub(_) => {
                let entity = foreign.refresh(source, &value).await.map_err(|err| {
                    err.context(crate::err!("refreshing `{}` of `{}`", self.field_name, self.entity))
                })?;
                self.set(&mut *owner, Value::Entity(entity))
            }
        }
    }

    /// Looks up an enum constant by ordinal.
    pub fn enum_from_ordinal(&self, ordinal: i64) -> Result<Value> {
        converter::enum_from_ordinal(&self.cx(), ordinal)
    }

    /// Looks up an enum constant by name.
    pub fn enum_from_name(&self, name: &str) -> Result<Value> {
        converter::enum_from_name(&self.cx(), name)
    }

    fn cx(&self) -> ConvertCx<'_> {
        ConvertCx {
            entity: self.entity,
            field: self.field_name,
            ty: &self.value_ty,
            unknown_enum: self.unknown_enum,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} (column `{}`, {})",
            self.entity,
            self.field_name,
            self.column_name,
            self.data_kind.name()
        )
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("entity", &self.entity)
            .field("field_name", &self.field_name)
            .field("column_name", &self.column_name)
            .field("data_kind", &self.data_kind)
            .field("host_ty", &self.host_ty)
            .field("width", &self.width)
            .field("default_value", &self.default_value)
            .field("can_be_null", &self.can_be_null)
            .field("id", &self.id)
            .field("generated_id", &self.generated_id)
            .field("generated_id_sequence", &self.generated_id_sequence)
            .field("foreign", &self.foreign.as_ref().map(|f| f.entity().name()))
            .field("accessor", &self.accessor)
            .finish()
    }
}
