use super::Error;

/// Error when a field's host type has no storable data kind.
#[derive(Debug)]
pub(super) struct UnsupportedType {
    entity: Box<str>,
    field: Box<str>,
    ty: Box<str>,
}

impl std::error::Error for UnsupportedType {}

impl core::fmt::Display for UnsupportedType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "field `{}` of `{}` has unsupported type `{}`",
            self.field, self.entity, self.ty
        )
    }
}

impl Error {
    /// Creates an unsupported type error.
    pub fn unsupported_type(
        entity: impl Into<String>,
        field: impl Into<String>,
        ty: impl core::fmt::Display,
    ) -> Error {
        Error::from(super::ErrorKind::UnsupportedType(UnsupportedType {
            entity: entity.into().into(),
            field: field.into().into(),
            ty: ty.to_string().into(),
        }))
    }

    /// Returns `true` if this error is an unsupported type error.
    pub fn is_unsupported_type(&self) -> bool {
        self.has_kind(|kind| matches!(kind, super::ErrorKind::UnsupportedType(_)))
    }
}
