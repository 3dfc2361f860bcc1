/// Registers a direct-storage [`Property`](crate::Property) for a struct field.
///
/// ```ignore
/// property!(Foo, name)
/// property!(Foo, rank, FieldConfig { width: 100, ..FieldConfig::default() })
/// ```
#[macro_export]
macro_rules! property {
    ($entity:ty, $field:ident) => {
        $crate::Property::new::<$entity, _>(
            stringify!($field),
            |owner: &$entity| &owner.$field,
            |owner: &mut $entity| &mut owner.$field,
        )
    };
    ($entity:ty, $field:ident, $config:expr) => {
        $crate::property!($entity, $field).config($config)
    };
}

/// Implements [`HostValue`](crate::HostValue) for a fieldless enum.
///
/// The declared constant list is captured once; ordinals follow the order in
/// which the variants are listed.
#[macro_export]
macro_rules! persisted_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::HostValue for $ty {
            fn host_type() -> $crate::HostType {
                $crate::HostType::Enum($crate::EnumType::of::<$ty>(
                    stringify!($ty),
                    &[$(stringify!($variant)),+],
                ))
            }

            fn to_value(&self) -> $crate::Result<$crate::Value> {
                let name = match self {
                    $( $ty::$variant => stringify!($variant), )+
                };
                let constants: &[&str] = &[$(stringify!($variant)),+];
                Ok($crate::Value::Enum(
                    constants
                        .iter()
                        .position(|constant| *constant == name)
                        .unwrap_or_default(),
                ))
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::Enum(ordinal) => [$($ty::$variant),+]
                        .into_iter()
                        .nth(ordinal)
                        .ok_or_else(|| $crate::Error::unknown_enum_value(stringify!($ty), ordinal)),
                    value => Err($crate::Error::type_conversion(value, stringify!($ty))),
                }
            }
        }
    };
}
