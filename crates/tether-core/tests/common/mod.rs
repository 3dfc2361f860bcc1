#![allow(dead_code)]

use tether_core::{Dialect, Entity, FieldConfig, FieldDescriptor, Registry, Result};

/// Declares a test entity whose properties are all direct-storage slots.
///
/// Properties without a configuration expression are left unmapped.
macro_rules! entity {
    ($name:ident { $($field:ident : $ty:ty $(= $config:expr)?),* $(,)? }) => {
        #[derive(Debug, Default)]
        struct $name {
            $($field: $ty,)*
        }

        impl tether_core::Entity for $name {
            const NAME: &'static str = stringify!($name);

            fn schema() -> tether_core::EntityDef {
                tether_core::EntityDef::new(Self::NAME)
                    $(.property(tether_core::property!($name, $field $(, $config)?)))*
            }
        }
    };
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config() -> FieldConfig {
    FieldConfig::default()
}

/// Builds one mapped field of `E` against a fresh registry.
pub fn build<E: Entity>(dialect: Dialect, name: &str) -> Result<FieldDescriptor> {
    init_logging();
    let mut registry = Registry::new(dialect);
    let field = FieldDescriptor::of::<E>(&mut registry, name)?;
    Ok(field.unwrap_or_else(|| panic!("`{name}` of `{}` is not mapped", E::NAME)))
}
