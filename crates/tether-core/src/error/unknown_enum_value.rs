use super::Error;

/// Error when a stored ordinal or name matches none of an enum's constants.
#[derive(Debug)]
pub(super) struct UnknownEnumValue {
    enum_name: &'static str,
    value: Box<str>,
}

impl std::error::Error for UnknownEnumValue {}

impl core::fmt::Display for UnknownEnumValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unknown value `{}` for enum `{}`",
            self.value, self.enum_name
        )
    }
}

impl Error {
    /// Creates an unknown enum value error.
    pub fn unknown_enum_value(enum_name: &'static str, value: impl core::fmt::Display) -> Error {
        Error::from(super::ErrorKind::UnknownEnumValue(UnknownEnumValue {
            enum_name,
            value: value.to_string().into(),
        }))
    }

    /// Returns `true` if this error is an unknown enum value error.
    pub fn is_unknown_enum_value(&self) -> bool {
        self.has_kind(|kind| matches!(kind, super::ErrorKind::UnknownEnumValue(_)))
    }
}
