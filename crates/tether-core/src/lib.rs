#[macro_use]
mod macros;

pub mod accessor;
pub use accessor::{Accessor, Method, Slot};

mod config;
pub use config::FieldConfig;

pub mod converter;
pub use converter::{ConvertCx, FieldConverter, StorageType};

mod data_kind;
pub use data_kind::DataKind;

pub mod dialect;
pub use dialect::Dialect;

pub mod driver;
pub use driver::{Connection, ConnectionSource};

mod entity;
pub use entity::{Entity, EntityDef, EntityRef, EntityType, Property};

mod error;
pub use error::Error;

pub mod field;
pub use field::FieldDescriptor;

pub mod foreign;
pub use foreign::Foreign;

mod host;
pub use host::{EnumType, HostType, HostValue, Serialized};

mod registry;
pub use registry::{Registry, Table};

pub mod results;
pub use results::{Results, Row};

mod value;
pub use value::Value;

/// A Result type alias that uses Tether's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
