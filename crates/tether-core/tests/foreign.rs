#[macro_use]
mod common;

use common::{build, config, init_logging};
use pretty_assertions::assert_eq;
use tether_core::{
    async_trait, driver::GetById, Connection, ConnectionSource, DataKind, Dialect, EntityRef,
    Error, FieldConfig, Registry, Result, Value,
};

use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

fn foreign() -> FieldConfig {
    FieldConfig {
        foreign: true,
        ..config()
    }
}

fn generated_id() -> FieldConfig {
    FieldConfig {
        generated_id: true,
        ..config()
    }
}

entity!(ForeignParent {
    id: i32 = generated_id(),
    name: String = config(),
    foreign: Option<Arc<ForeignForeign>> = foreign(),
});

entity!(ForeignForeign {
    id: i32 = generated_id(),
    stuff: String = config(),
});

#[test]
fn foreign_column_and_kind() {
    let field = build::<ForeignParent>(Dialect::sqlite(), "foreign").unwrap();

    assert!(field.is_foreign());
    assert_eq!(field.column_name(), "foreign_id");
    assert_eq!(field.data_kind(), DataKind::Integer);

    let foreign = field.foreign().unwrap();
    assert_eq!(foreign.entity().name(), "ForeignForeign");
    assert_eq!(foreign.table_name(), "foreign_foreign");
    assert_eq!(foreign.id_field().field_name(), "id");
    assert!(!foreign.auto_refresh());
}

#[test]
fn foreign_reference_is_stable_for_same_id() {
    let field = build::<ForeignParent>(Dialect::sqlite(), "foreign").unwrap();
    let mut parent = ForeignParent::default();

    field.assign(&mut parent, Value::I32(10)).unwrap();
    let first = parent.foreign.clone().unwrap();
    assert_eq!(first.id, 10);
    assert_eq!(first.stuff, "");

    // Same id, possibly in a wider integer: nothing changes.
    field.assign(&mut parent, Value::I64(10)).unwrap();
    assert!(Arc::ptr_eq(&first, parent.foreign.as_ref().unwrap()));

    field.assign(&mut parent, Value::I32(11)).unwrap();
    let second = parent.foreign.clone().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.id, 11);
}

#[test]
fn foreign_storage_arg_is_the_referenced_id() {
    let field = build::<ForeignParent>(Dialect::sqlite(), "foreign").unwrap();
    let mut parent = ForeignParent::default();

    assert_eq!(field.extract_storage_arg(&parent).unwrap(), Value::Null);

    parent.foreign = Some(Arc::new(ForeignForeign {
        id: 3,
        stuff: "x".to_string(),
    }));
    assert_eq!(field.extract_storage_arg(&parent).unwrap(), Value::I32(3));
    assert_eq!(field.get_id(&parent).unwrap(), Value::I32(3));

    field.assign(&mut parent, Value::Null).unwrap();
    assert!(parent.foreign.is_none());
}

entity!(ForeignPrimitive {
    id: i32 = generated_id(),
    foreign: i32 = foreign(),
});

entity!(ForeignNoId {
    name: String = config(),
});

entity!(ForeignToNoId {
    foreign: Option<Arc<ForeignNoId>> = foreign(),
});

entity!(ForeignAndId {
    foreign: Option<Arc<ForeignForeign>> = FieldConfig {
        id: true,
        ..foreign()
    },
});

entity!(ObjectNotForeign {
    foreign: Option<Arc<ForeignForeign>> = config(),
});

#[test]
fn invalid_foreign_configuration() {
    let errors = [
        build::<ForeignPrimitive>(Dialect::sqlite(), "foreign").unwrap_err(),
        build::<ForeignToNoId>(Dialect::sqlite(), "foreign").unwrap_err(),
        build::<ForeignAndId>(Dialect::sqlite(), "foreign").unwrap_err(),
        build::<ObjectNotForeign>(Dialect::sqlite(), "foreign").unwrap_err(),
    ];

    for err in errors {
        assert!(err.is_invalid_configuration(), "{err}");
    }
}

entity!(Recursive {
    id: i32 = generated_id(),
    foreign: Option<Arc<Recursive>> = foreign(),
});

#[test]
fn self_reference_builds() {
    let field = build::<Recursive>(Dialect::sqlite(), "foreign").unwrap();
    assert_eq!(field.column_name(), "foreign_id");
    assert_eq!(field.data_kind(), DataKind::Integer);

    let mut registry = Registry::default();
    let table = registry.register::<Recursive>().unwrap();
    assert_eq!(table.fields().len(), 2);
    assert!(table.field("foreign").unwrap().is_foreign());
}

entity!(Left {
    id: i64 = generated_id(),
    right: Option<Arc<Right>> = foreign(),
});

entity!(Right {
    id: String = FieldConfig {
        id: true,
        ..config()
    },
    left: Option<Arc<Left>> = foreign(),
});

#[test]
fn mutual_references_build() {
    init_logging();
    let mut registry = Registry::default();

    let left = registry.register::<Left>().unwrap();
    assert_eq!(left.field("right").unwrap().data_kind(), DataKind::String);

    let right = registry.table::<Right>().unwrap();
    assert_eq!(right.field("left").unwrap().data_kind(), DataKind::Long);
}

entity!(ForeignAutoRefresh {
    id: i32 = generated_id(),
    foreign: Option<Arc<ForeignForeign>> = FieldConfig {
        foreign_auto_refresh: true,
        ..foreign()
    },
});

/// A connection source that serves `ForeignForeign` rows from memory and
/// counts acquisitions and releases.
#[derive(Default)]
struct MockSource {
    rows: Vec<(i32, &'static str)>,
    fail: bool,
    acquired: AtomicUsize,
    released: AtomicUsize,
    ops: Arc<Mutex<Vec<GetById>>>,
}

struct MockConnection {
    rows: Vec<(i32, &'static str)>,
    fail: bool,
    ops: Arc<Mutex<Vec<GetById>>>,
}

#[async_trait]
impl ConnectionSource for MockSource {
    async fn read_connection(&self, _table: &str) -> Result<Box<dyn Connection>> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            rows: self.rows.clone(),
            fail: self.fail,
            ops: self.ops.clone(),
        }))
    }

    fn release_connection(&self, _connection: Box<dyn Connection>) -> Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn get_by_id(&mut self, op: GetById) -> Result<Option<EntityRef>> {
        self.ops.lock().unwrap().push(op.clone());

        if self.fail {
            return Err(Error::driver(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }

        let Value::I32(id) = op.id else {
            return Ok(None);
        };

        Ok(self
            .rows
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(id, stuff)| -> EntityRef {
                Arc::new(ForeignForeign {
                    id: *id,
                    stuff: stuff.to_string(),
                })
            }))
    }
}

#[tokio::test]
async fn auto_refresh_fetches_and_releases() {
    let field = build::<ForeignAutoRefresh>(Dialect::sqlite(), "foreign").unwrap();
    assert!(field.foreign().unwrap().auto_refresh());

    let source = MockSource {
        rows: vec![(4123123, "21312j3213")],
        ..MockSource::default()
    };

    let mut owner = ForeignAutoRefresh::default();
    assert!(owner.foreign.is_none());

    field
        .assign_and_refresh(&mut owner, Value::I32(4123123), &source)
        .await
        .unwrap();

    let foreign = owner.foreign.clone().unwrap();
    assert_eq!(foreign.id, 4123123);
    assert_eq!(foreign.stuff, "21312j3213");

    assert_eq!(source.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(source.released.load(Ordering::SeqCst), 1);

    let ops = source.ops.lock().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].table, "foreign_foreign");
    assert_eq!(ops[0].id_column, "id");
    assert_eq!(ops[0].id, Value::I32(4123123));
    drop(ops);

    // Assigning the same id again does not hit the database.
    field
        .assign_and_refresh(&mut owner, Value::I32(4123123), &source)
        .await
        .unwrap();
    assert_eq!(source.acquired.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&foreign, owner.foreign.as_ref().unwrap()));
}

#[tokio::test]
async fn auto_refresh_failure_releases_connection() {
    let field = build::<ForeignAutoRefresh>(Dialect::sqlite(), "foreign").unwrap();
    let source = MockSource {
        fail: true,
        ..MockSource::default()
    };

    let mut owner = ForeignAutoRefresh::default();
    let err = field
        .assign_and_refresh(&mut owner, Value::I32(1), &source)
        .await
        .unwrap_err();

    assert!(err.is_driver(), "{err}");
    assert!(!err.is_record_not_found());
    assert!(!err.is_configuration());
    assert!(err.to_string().contains("connection reset"));
    assert!(owner.foreign.is_none());
    assert_eq!(source.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn auto_refresh_missing_row() {
    let field = build::<ForeignAutoRefresh>(Dialect::sqlite(), "foreign").unwrap();
    let source = MockSource::default();

    let mut owner = ForeignAutoRefresh::default();
    let err = field
        .assign_and_refresh(&mut owner, Value::I32(99), &source)
        .await
        .unwrap_err();

    assert!(err.is_record_not_found(), "{err}");
    assert!(!err.is_driver());
    assert_eq!(
        err.to_string(),
        "refreshing `foreign` of `ForeignAutoRefresh`: record not found: table=foreign_foreign id=I32(99)"
    );
    assert!(owner.foreign.is_none());
    assert_eq!(source.released.load(Ordering::SeqCst), 1);
}

#[test]
fn plain_assign_does_not_refresh() {
    let field = build::<ForeignAutoRefresh>(Dialect::sqlite(), "foreign").unwrap();
    let mut owner = ForeignAutoRefresh::default();

    field.assign(&mut owner, Value::I32(5)).unwrap();
    let stub = owner.foreign.clone().unwrap();
    assert_eq!(stub.id, 5);
    assert_eq!(stub.stuff, "");
}
