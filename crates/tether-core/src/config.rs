use crate::DataKind;

use serde::Deserialize;

/// Declared mapping options for one property.
///
/// This is the already-parsed form of a field declaration. Every option is
/// optional and defaulted; validation happens when the property is compiled
/// into a [`FieldDescriptor`](crate::FieldDescriptor).
///
/// The struct can also be read from a configuration file:
///
/// ```
/// # use tether_core::FieldConfig;
/// let config: FieldConfig = serde_json::from_str(r#"{ "column_name": "rank_column", "width": 100 }"#).unwrap();
/// assert_eq!(config.width, 100);
/// assert!(config.can_be_null);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    /// Column name. Defaults to the field name.
    pub column_name: Option<String>,

    /// Explicit data kind, overriding the one derived from the host type.
    pub data_kind: Option<DataKind>,

    /// Column width hint. `0` leaves the width to the database.
    pub width: usize,

    /// Default value, parsed by the field's converter.
    pub default_value: Option<String>,

    /// True if the column accepts nulls.
    pub can_be_null: bool,

    /// True if the field is the (externally assigned) id.
    pub id: bool,

    /// True if the id is generated by the database.
    pub generated_id: bool,

    /// Sequence used to generate the id.
    pub generated_id_sequence: Option<String>,

    /// True if the field holds another entity, persisted as that entity's id.
    pub foreign: bool,

    /// Fetch the full foreign row when the foreign id is assigned.
    pub foreign_auto_refresh: bool,

    /// Access the property through its getter/setter pair.
    pub use_accessor_methods: bool,

    /// Fail, rather than store a zero value, when the column is null.
    pub throw_if_null: bool,

    /// Enum constant used when a stored value matches no constant.
    pub unknown_enum_name: Option<String>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            column_name: None,
            data_kind: None,
            width: 0,
            default_value: None,
            can_be_null: true,
            id: false,
            generated_id: false,
            generated_id_sequence: None,
            foreign: false,
            foreign_auto_refresh: false,
            use_accessor_methods: false,
            throw_if_null: false,
            unknown_enum_name: None,
        }
    }
}

impl FieldConfig {
    /// True if any of the id options is set.
    pub fn declares_id(&self) -> bool {
        self.id || self.generated_id || self.generated_id_sequence.is_some()
    }
}
