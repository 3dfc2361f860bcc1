#[macro_use]
mod common;

use common::{build, config};
use pretty_assertions::assert_eq;
use tether_core::{property, Dialect, Entity, EntityDef, FieldConfig, Method, Value};

fn with_methods() -> FieldConfig {
    FieldConfig {
        use_accessor_methods: true,
        ..config()
    }
}

/// Declares an entity with one `id: i32` property mapped through accessor
/// methods, plus the given method table.
macro_rules! accessor_entity {
    ($name:ident, [$($method:expr),* $(,)?]) => {
        #[derive(Debug, Default)]
        struct $name {
            id: i32,
        }

        impl Entity for $name {
            const NAME: &'static str = stringify!($name);

            fn schema() -> EntityDef {
                EntityDef::new(Self::NAME)
                    .property(property!($name, id, with_methods()))
                    $(.method($method))*
            }
        }
    };
}

accessor_entity!(
    GetSet,
    [
        Method::getter("get_id", |owner: &GetSet| owner.id),
        Method::setter("set_id", |owner: &mut GetSet, id: i32| owner.id = id),
    ]
);

accessor_entity!(
    NoGet,
    [Method::setter("set_id", |owner: &mut NoGet, id: i32| owner.id = id)]
);

accessor_entity!(
    GetWrongType,
    [
        Method::getter("get_id", |owner: &GetWrongType| i64::from(owner.id)),
        Method::setter("set_id", |owner: &mut GetWrongType, id: i32| owner.id = id),
    ]
);

accessor_entity!(
    GetTakesArgument,
    [
        Method::setter_returning("get_id", |owner: &mut GetTakesArgument, _: i32| owner.id),
        Method::setter("set_id", |owner: &mut GetTakesArgument, id: i32| owner.id = id),
    ]
);

accessor_entity!(
    NoSet,
    [Method::getter("get_id", |owner: &NoSet| owner.id)]
);

accessor_entity!(
    SetWrongType,
    [
        Method::getter("get_id", |owner: &SetWrongType| owner.id),
        Method::setter("set_id", |owner: &mut SetWrongType, id: i64| {
            owner.id = id as i32
        }),
    ]
);

accessor_entity!(
    SetReturns,
    [
        Method::getter("get_id", |owner: &SetReturns| owner.id),
        Method::setter_returning("set_id", |owner: &mut SetReturns, id: i32| {
            owner.id = id;
            id
        }),
    ]
);

accessor_entity!(
    SetIsGetter,
    [
        Method::getter("get_id", |owner: &SetIsGetter| owner.id),
        Method::getter("set_id", |owner: &SetIsGetter| owner.id),
    ]
);

#[test]
fn getter_setter_pair() {
    let field = build::<GetSet>(Dialect::sqlite(), "id").unwrap();
    assert!(field.accessor().is_methods());

    let mut owner = GetSet { id: 121 };
    assert_eq!(field.extract_storage_arg(&owner).unwrap(), Value::I32(121));

    field.assign(&mut owner, Value::I32(202)).unwrap();
    assert_eq!(owner.id, 202);
    assert_eq!(field.get(&owner).unwrap(), Value::I32(202));
}

#[test]
fn signature_mismatches_are_rejected() {
    let errors = [
        build::<NoGet>(Dialect::sqlite(), "id").unwrap_err(),
        build::<GetWrongType>(Dialect::sqlite(), "id").unwrap_err(),
        build::<GetTakesArgument>(Dialect::sqlite(), "id").unwrap_err(),
        build::<NoSet>(Dialect::sqlite(), "id").unwrap_err(),
        build::<SetWrongType>(Dialect::sqlite(), "id").unwrap_err(),
        build::<SetReturns>(Dialect::sqlite(), "id").unwrap_err(),
        build::<SetIsGetter>(Dialect::sqlite(), "id").unwrap_err(),
    ];

    for err in errors {
        assert!(err.is_invalid_configuration(), "{err}");
    }
}

entity!(Other {
    id: i32 = config(),
});

#[test]
fn wrong_owner_is_rejected() {
    let field = build::<GetSet>(Dialect::sqlite(), "id").unwrap();
    let mut other = Other::default();

    assert!(field.get(&other).unwrap_err().is_invalid_owner());
    assert!(field
        .assign(&mut other, Value::I32(10))
        .unwrap_err()
        .is_invalid_owner());

    // Direct storage access checks the owner too.
    let field = build::<Other>(Dialect::sqlite(), "id").unwrap();
    let mut owner = GetSet::default();
    assert!(field
        .extract_storage_arg(&owner)
        .unwrap_err()
        .is_invalid_owner());
    assert!(field
        .set(&mut owner, Value::I32(1))
        .unwrap_err()
        .is_invalid_owner());
}

#[test]
fn wrong_value_type_is_rejected() {
    let field = build::<GetSet>(Dialect::sqlite(), "id").unwrap();
    let mut owner = GetSet::default();

    let err = field.set(&mut owner, Value::from("ten")).unwrap_err();
    assert!(err.is_type_conversion());
    assert!(!err.is_configuration());
}
