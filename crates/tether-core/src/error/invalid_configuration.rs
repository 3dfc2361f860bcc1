use super::Error;

/// Error when a property's mapping configuration cannot be compiled.
///
/// This occurs when:
/// - `id`, `generated_id` and `generated_id_sequence` are combined in a way the dialect does not allow
/// - a generated id is declared on a non-integer kind, or with a default value
/// - a foreign field is also an id, is not an entity type, or references a type without an id
/// - an object-valued field is neither foreign nor natively storable
/// - accessor methods are missing or have the wrong signature
/// - a default value cannot be parsed
///
/// The affected entity type cannot be mapped.
#[derive(Debug)]
pub(super) struct InvalidConfiguration {
    entity: Box<str>,
    field: Box<str>,
    message: Box<str>,
}

impl std::error::Error for InvalidConfiguration {}

impl core::fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "invalid configuration for field `{}` of `{}`: {}",
            self.field, self.entity, self.message
        )
    }
}

impl Error {
    /// Creates an invalid configuration error for `field` of `entity`.
    pub fn invalid_configuration(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::InvalidConfiguration(InvalidConfiguration {
            entity: entity.into().into(),
            field: field.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid configuration error.
    pub fn is_invalid_configuration(&self) -> bool {
        self.has_kind(|kind| matches!(kind, super::ErrorKind::InvalidConfiguration(_)))
    }
}
