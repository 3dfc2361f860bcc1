#[macro_use]
mod common;

use common::{config, init_logging};
use pretty_assertions::assert_eq;
use tether_core::{DataKind, Dialect, FieldConfig, Registry};

use std::sync::Arc;

fn from_json(json: &str) -> FieldConfig {
    serde_json::from_str(json).unwrap()
}

entity!(Account {
    id: i64 = from_json(r#"{ "generated_id": true }"#),
    email: String = from_json(r#"{ "column_name": "email_address", "width": 255, "can_be_null": false }"#),
    balance: f64 = from_json(r#"{ "default_value": "0.5" }"#),
    note: Option<String>,
});

#[test]
fn register_publishes_mapped_fields() {
    init_logging();
    let mut registry = Registry::new(Dialect::postgresql());

    let table = registry.register::<Account>().unwrap();
    assert_eq!(table.name(), "account");
    assert_eq!(
        table
            .fields()
            .iter()
            .map(|field| field.column_name())
            .collect::<Vec<_>>(),
        ["id", "email_address", "balance"]
    );

    let id = table.id_field().unwrap();
    assert_eq!(id.data_kind(), DataKind::Long);
    assert_eq!(id.generated_id_sequence(), Some("account_id_seq"));

    let email = table.field("email").unwrap();
    assert_eq!(email.width(), 255);
    assert!(!email.can_be_null());

    // Registration is idempotent.
    let again = registry.register::<Account>().unwrap();
    assert!(Arc::ptr_eq(&table, &again));
    assert_eq!(registry.tables().count(), 1);
}

#[test]
fn field_lookup() {
    let mut registry = Registry::default();

    let balance = registry.field::<Account>("balance").unwrap().unwrap();
    assert_eq!(balance.data_kind(), DataKind::Double);
    assert!(registry.field::<Account>("note").unwrap().is_none());
}

entity!(TwoIds {
    first: i32 = FieldConfig {
        id: true,
        ..config()
    },
    second: i32 = FieldConfig {
        generated_id: true,
        ..config()
    },
});

#[test]
fn more_than_one_id_rejects_the_type() {
    let mut registry = Registry::default();

    let err = registry.register::<TwoIds>().unwrap_err();
    assert!(err.is_configuration());
    assert!(registry.table::<TwoIds>().is_none());
}

entity!(Broken {
    id: i32 = FieldConfig {
        id: true,
        ..config()
    },
    oops: () = config(),
});

entity!(RefersToBroken {
    id: i32 = FieldConfig {
        id: true,
        ..config()
    },
    broken: Option<Arc<Broken>> = FieldConfig {
        foreign: true,
        ..config()
    },
});

#[test]
fn failure_in_referenced_type_aborts_both() {
    let mut registry = Registry::default();

    let err = registry.register::<RefersToBroken>().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Broken"));
    assert_eq!(registry.tables().count(), 0);
}

entity!(CycleLeft {
    id: i32 = FieldConfig {
        id: true,
        ..config()
    },
    right: Option<Arc<CycleRight>> = FieldConfig {
        foreign: true,
        ..config()
    },
    oops: () = config(),
});

entity!(CycleRight {
    id: i32 = FieldConfig {
        id: true,
        ..config()
    },
    left: Option<Arc<CycleLeft>> = FieldConfig {
        foreign: true,
        ..config()
    },
});

#[test]
fn failure_after_mutual_reference_publishes_neither() {
    init_logging();
    let mut registry = Registry::default();

    // `CycleRight` compiles fine against the id of `CycleLeft`, but
    // `CycleLeft` itself fails afterwards.
    let err = registry.register::<CycleLeft>().unwrap_err();
    assert!(err.is_unsupported_type(), "{err}");
    assert!(registry.table::<CycleLeft>().is_none());
    assert!(registry.table::<CycleRight>().is_none());
    assert_eq!(registry.tables().count(), 0);

    // Nothing staged by the failed attempt leaks into later registrations.
    let err = registry.register::<CycleRight>().unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(registry.tables().count(), 0);

    registry.register::<Account>().unwrap();
    assert_eq!(registry.tables().count(), 1);
}

#[test]
fn referenced_types_are_published_with_the_referencing_type() {
    entity!(Owner {
        id: i32 = FieldConfig {
            id: true,
            ..config()
        },
        account: Option<Arc<Account>> = FieldConfig {
            foreign: true,
            ..config()
        },
    });

    let mut registry = Registry::default();
    registry.register::<Owner>().unwrap();

    assert!(registry.table::<Account>().is_some());
    assert_eq!(
        registry
            .tables()
            .map(|table| table.name().to_string())
            .collect::<Vec<_>>(),
        ["account", "owner"]
    );
}

#[test]
fn configuration_rejects_unknown_options() {
    let res = serde_json::from_str::<FieldConfig>(r#"{ "foreign_auto_refesh": true }"#);
    assert!(res.is_err());
}
