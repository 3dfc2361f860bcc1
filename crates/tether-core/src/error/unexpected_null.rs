use super::Error;

/// Error when a column that may not be null yields a null result.
#[derive(Debug)]
pub(super) struct UnexpectedNull {
    entity: Box<str>,
    column: Box<str>,
}

impl std::error::Error for UnexpectedNull {}

impl core::fmt::Display for UnexpectedNull {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unexpected null in column `{}` of `{}`",
            self.column, self.entity
        )
    }
}

impl Error {
    /// Creates an unexpected null error.
    pub fn unexpected_null(entity: impl Into<String>, column: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnexpectedNull(UnexpectedNull {
            entity: entity.into().into(),
            column: column.into().into(),
        }))
    }

    /// Returns `true` if this error is an unexpected null error.
    pub fn is_unexpected_null(&self) -> bool {
        self.has_kind(|kind| matches!(kind, super::ErrorKind::UnexpectedNull(_)))
    }
}
