//! Database-specific knobs consulted while compiling field descriptors.

mod sequence;

use crate::{DataKind, FieldConverter, HostType};

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

/// Describes the capabilities and conventions of a database.
#[derive(Clone)]
pub struct Dialect {
    /// Name of the database, used in diagnostics.
    pub name: &'static str,

    /// When true, entity names (tables, columns, sequences) are stored upper
    /// case.
    pub entity_names_upper_case: bool,

    /// When true, generated ids are drawn from a named sequence rather than
    /// an auto-increment column.
    pub id_sequence_needed: bool,

    /// Converters that replace the default converter for a data kind.
    converters: IndexMap<DataKind, Arc<dyn FieldConverter>>,

    /// Converters for one host type, whatever its data kind.
    type_converters: Vec<(HostType, Arc<dyn FieldConverter>)>,
}

impl Dialect {
    /// SQLite: auto-increment ids, case-preserving names.
    pub fn sqlite() -> Self {
        Self {
            name: "sqlite",
            entity_names_upper_case: false,
            id_sequence_needed: false,
            converters: IndexMap::new(),
            type_converters: vec![],
        }
    }

    /// PostgreSQL: generated ids come from sequences.
    pub fn postgresql() -> Self {
        Self {
            name: "postgresql",
            id_sequence_needed: true,
            ..Self::sqlite()
        }
    }

    /// MySQL
    pub fn mysql() -> Self {
        Self {
            name: "mysql",
            ..Self::sqlite()
        }
    }

    /// Oracle: sequences, and names folded to upper case.
    pub fn oracle() -> Self {
        Self {
            name: "oracle",
            entity_names_upper_case: true,
            id_sequence_needed: true,
            converters: IndexMap::new(),
            type_converters: vec![],
        }
    }

    /// Registers a converter that overrides the default for `kind`.
    pub fn with_converter(mut self, kind: DataKind, converter: Arc<dyn FieldConverter>) -> Self {
        self.converters.insert(kind, converter);
        self
    }

    /// Registers a converter for every field holding `ty` (or `Option` of
    /// it). Host type overrides win over data kind overrides.
    pub fn with_type_converter(mut self, ty: HostType, converter: Arc<dyn FieldConverter>) -> Self {
        let ty = ty.unwrap_option().0.clone();
        self.type_converters.retain(|(existing, _)| *existing != ty);
        self.type_converters.push((ty, converter));
        self
    }

    /// The converter to use for a field of `kind` with host type `ty`.
    ///
    /// Lookup order: the host type override, the data kind override, then
    /// the kind's default converter.
    pub fn field_converter(&self, kind: DataKind, ty: &HostType) -> Arc<dyn FieldConverter> {
        let scalar = ty.unwrap_option().0;

        if let Some((_, converter)) = self.type_converters.iter().find(|(t, _)| t == scalar) {
            log::trace!("{} overrides the converter for {ty}", self.name);
            return converter.clone();
        }

        match self.converters.get(&kind) {
            Some(converter) => {
                log::trace!("{} overrides the {kind:?} converter for {ty}", self.name);
                converter.clone()
            }
            None => kind.converter(),
        }
    }

    /// Applies the dialect's case convention to a table, column or sequence
    /// name.
    pub fn normalize_entity_name(&self, name: &str) -> String {
        if self.entity_names_upper_case {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::sqlite()
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("entity_names_upper_case", &self.entity_names_upper_case)
            .field("id_sequence_needed", &self.id_sequence_needed)
            .field("converters", &self.converters.keys().collect::<Vec<_>>())
            .field(
                "type_converters",
                &self.type_converters.iter().map(|(ty, _)| ty).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::LongConverter;

    #[test]
    fn override_takes_precedence() {
        let dialect = Dialect::sqlite().with_converter(DataKind::Integer, Arc::new(LongConverter));

        let converter = dialect.field_converter(DataKind::Integer, &HostType::I32);
        assert_eq!(converter.storage_type(), crate::StorageType::Long);

        let converter = dialect.field_converter(DataKind::Short, &HostType::I16);
        assert_eq!(converter.storage_type(), crate::StorageType::Short);
    }

    #[test]
    fn host_type_override_wins() {
        let dialect = Dialect::sqlite()
            .with_converter(DataKind::Integer, Arc::new(LongConverter))
            .with_type_converter(
                HostType::Option(Box::new(HostType::I32)),
                Arc::new(crate::converter::ShortConverter),
            );

        let converter = dialect.field_converter(DataKind::Integer, &HostType::I32);
        assert_eq!(converter.storage_type(), crate::StorageType::Short);

        let converter =
            dialect.field_converter(DataKind::Integer, &HostType::Option(Box::new(HostType::I32)));
        assert_eq!(converter.storage_type(), crate::StorageType::Short);

        // Other host types of the same kind still see the kind override.
        let converter = dialect.field_converter(DataKind::Integer, &HostType::I64);
        assert_eq!(converter.storage_type(), crate::StorageType::Long);
    }

    #[test]
    fn upper_case_names() {
        assert_eq!(Dialect::oracle().normalize_entity_name("foo_seq"), "FOO_SEQ");
        assert_eq!(Dialect::postgresql().normalize_entity_name("foo_seq"), "foo_seq");
    }
}
