mod adhoc;
mod driver;
mod invalid_configuration;
mod invalid_owner;
mod record_not_found;
mod type_conversion;
mod unexpected_null;
mod unknown_enum_value;
mod unsupported_type;

use adhoc::AdhocError;
use driver::DriverError;
use invalid_configuration::InvalidConfiguration;
use invalid_owner::InvalidOwner;
use record_not_found::RecordNotFoundError;
use std::sync::Arc;
use type_conversion::TypeConversionError;
use unexpected_null::UnexpectedNull;
use unknown_enum_value::UnknownEnumValue;
use unsupported_type::UnsupportedType;

/// Builds an ad-hoc error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in Tether.
///
/// Errors fall into two classes. Configuration errors are produced while
/// compiling a property into a [`FieldDescriptor`](crate::FieldDescriptor)
/// and abort mapping setup for the whole entity type; see
/// [`Error::is_configuration`]. Every other error is a runtime error raised
/// by a single conversion or assignment.
///
/// The `is_*` predicates look through added context, so a classified error
/// keeps its classification after being wrapped.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context is shown first,
    /// followed by earlier context, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        if err.inner.is_none() {
            err = Error::from(ErrorKind::Unknown);
        }
        let inner = err.inner.as_mut().unwrap();
        assert!(
            inner.cause.is_none(),
            "consequent error must not already have a cause"
        );
        Arc::get_mut(inner).unwrap().cause = Some(self);
        err
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn has_kind(&self, f: impl Fn(&ErrorKind) -> bool) -> bool {
        self.chain().any(|err| f(err.kind()))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }

    /// Returns `true` if this error was raised while compiling a field
    /// mapping rather than while converting or assigning a value.
    pub fn is_configuration(&self) -> bool {
        self.has_kind(|kind| {
            matches!(
                kind,
                ErrorKind::InvalidConfiguration(_) | ErrorKind::UnsupportedType(_)
            )
        })
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Driver(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    Driver(DriverError),
    InvalidConfiguration(InvalidConfiguration),
    UnsupportedType(UnsupportedType),
    InvalidOwner(InvalidOwner),
    TypeConversion(TypeConversionError),
    UnexpectedNull(UnexpectedNull),
    UnknownEnumValue(UnknownEnumValue),
    RecordNotFound(RecordNotFoundError),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Driver(err) => core::fmt::Display::fmt(err, f),
            InvalidConfiguration(err) => core::fmt::Display::fmt(err, f),
            UnsupportedType(err) => core::fmt::Display::fmt(err, f),
            InvalidOwner(err) => core::fmt::Display::fmt(err, f),
            TypeConversion(err) => core::fmt::Display::fmt(err, f),
            UnexpectedNull(err) => core::fmt::Display::fmt(err, f),
            UnknownEnumValue(err) => core::fmt::Display::fmt(err, f),
            RecordNotFound(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown tether error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn error_size() {
        // Ensure Error stays at one word (size of pointer/Arc)
        let expected_size = core::mem::size_of::<usize>();
        assert_eq!(expected_size, core::mem::size_of::<Error>());
    }

    #[test]
    fn error_chain_display() {
        let root = Error::record_not_found("table=foreign_foreign id=4");
        let top = err!("refreshing `foreign` of `ForeignAutoRefresh`");

        let chained = root.context(top);
        assert_eq!(
            chained.to_string(),
            "refreshing `foreign` of `ForeignAutoRefresh`: record not found: table=foreign_foreign id=4"
        );
    }

    #[test]
    fn classification_survives_context() {
        let err = Error::record_not_found("table=foreign_foreign id=4")
            .context(err!("refreshing `foreign` of `ForeignAutoRefresh`"));
        assert!(err.is_record_not_found());
        assert!(!err.is_driver());
        assert!(!err.is_configuration());

        let err = Error::unsupported_type("Broken", "oops", "()").context(
            Error::invalid_configuration("RefersToBroken", "broken", "referenced type failed"),
        );
        assert!(err.is_configuration());
        assert!(err.is_unsupported_type());
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn anyhow_bridge() {
        let anyhow_err = anyhow::anyhow!("something failed");
        let our_err: Error = anyhow_err.into();
        assert_eq!(our_err.to_string(), "something failed");
    }

    #[test]
    fn configuration_errors_are_classified() {
        let err = Error::invalid_configuration("Foo", "id", "must not be both `id` and `generated_id`");
        assert!(err.is_configuration());
        assert!(err.is_invalid_configuration());
        assert_eq!(
            err.to_string(),
            "invalid configuration for field `id` of `Foo`: must not be both `id` and `generated_id`"
        );

        let err = Error::unsupported_type("UnknownFieldType", "oops", "()");
        assert!(err.is_configuration());
        assert!(err.is_unsupported_type());
    }

    #[test]
    fn runtime_errors_are_not_configuration() {
        let err = Error::invalid_owner("GetSet");
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "owner instance is not a `GetSet`");

        let err = Error::type_conversion(Value::I64(10), "String");
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "cannot convert I64 to String");
    }

    #[test]
    fn unexpected_null_display() {
        let err = Error::unexpected_null("ThrowIfNull", "primitive");
        assert!(err.is_unexpected_null());
        assert_eq!(
            err.to_string(),
            "unexpected null in column `primitive` of `ThrowIfNull`"
        );
    }

    #[test]
    fn unknown_enum_value_display() {
        let err = Error::unknown_enum_value("OurEnum", 100);
        assert!(err.is_unknown_enum_value());
        assert_eq!(err.to_string(), "unknown value `100` for enum `OurEnum`");
    }
}
