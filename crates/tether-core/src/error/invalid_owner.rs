use super::Error;

/// Error when an accessor is invoked against an instance of the wrong type.
#[derive(Debug)]
pub(super) struct InvalidOwner {
    expected: &'static str,
}

impl std::error::Error for InvalidOwner {}

impl core::fmt::Display for InvalidOwner {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "owner instance is not a `{}`", self.expected)
    }
}

impl Error {
    /// Creates an invalid owner error naming the expected owner type.
    pub fn invalid_owner(expected: &'static str) -> Error {
        Error::from(super::ErrorKind::InvalidOwner(InvalidOwner { expected }))
    }

    /// Returns `true` if this error is an invalid owner error.
    pub fn is_invalid_owner(&self) -> bool {
        self.has_kind(|kind| matches!(kind, super::ErrorKind::InvalidOwner(_)))
    }
}
