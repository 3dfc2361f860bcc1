//! Uniform get/set access to a mapped property.
//!
//! An [`Accessor`] is selected once, when a field descriptor is built: either
//! the property's storage [`Slot`] is used directly, or a matched pair of
//! accessor [`Method`]s is invoked. Both variants check the owner's concrete
//! type on every call and fail with an invalid owner error on mismatch;
//! values of the wrong type fail with a type conversion error.

use crate::{Entity, Error, HostType, HostValue, Result, Value};

use std::{any::Any, fmt, sync::Arc};

type ReadFn = Arc<dyn Fn(&dyn Any) -> Result<Value> + Send + Sync>;
type WriteFn = Arc<dyn Fn(&mut dyn Any, Value) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
pub enum Accessor {
    /// Reads and writes the property's storage directly.
    Slot(Slot),

    /// Invokes a getter/setter pair.
    Methods { getter: Method, setter: Method },
}

/// Direct access to the storage of one property.
#[derive(Clone)]
pub struct Slot {
    owner: &'static str,
    read: ReadFn,
    write: WriteFn,
}

/// An accessor method registered on an entity type.
#[derive(Clone)]
pub struct Method {
    name: &'static str,
    params: Vec<HostType>,
    returns: Option<HostType>,
    call: MethodCall,
}

#[derive(Clone)]
enum MethodCall {
    /// Takes `&self`
    Shared(ReadFn),

    /// Takes `&mut self` and one argument
    Exclusive(WriteFn),
}

impl Accessor {
    pub fn get(&self, owner: &dyn Any) -> Result<Value> {
        match self {
            Self::Slot(slot) => (slot.read)(owner),
            Self::Methods { getter, .. } => getter.invoke_shared(owner),
        }
    }

    pub fn set(&self, owner: &mut dyn Any, value: Value) -> Result<()> {
        match self {
            Self::Slot(slot) => (slot.write)(owner, value).map(drop),
            Self::Methods { setter, .. } => setter.invoke_exclusive(owner, value).map(drop),
        }
    }

    pub fn is_methods(&self) -> bool {
        matches!(self, Self::Methods { .. })
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => slot.fmt(fmt),
            Self::Methods { getter, setter } => fmt
                .debug_struct("Methods")
                .field("getter", &getter.name)
                .field("setter", &setter.name)
                .finish(),
        }
    }
}

impl Slot {
    pub(crate) fn new<E: Entity, V: HostValue>(
        get: fn(&E) -> &V,
        get_mut: fn(&mut E) -> &mut V,
    ) -> Self {
        let read = move |owner: &dyn Any| -> Result<Value> {
            let owner = downcast_ref::<E>(owner)?;
            get(owner).to_value()
        };

        let write = move |owner: &mut dyn Any, value: Value| -> Result<Value> {
            let owner = downcast_mut::<E>(owner)?;
            *get_mut(owner) = V::from_value(value)?;
            Ok(Value::Null)
        };

        Self {
            owner: E::NAME,
            read: Arc::new(read),
            write: Arc::new(write),
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Slot({})", self.owner)
    }
}

impl Method {
    /// Registers a getter: `fn(&self) -> R`.
    pub fn getter<E: Entity, R: HostValue>(name: &'static str, f: fn(&E) -> R) -> Self {
        let call = move |owner: &dyn Any| -> Result<Value> {
            let owner = downcast_ref::<E>(owner)?;
            f(owner).to_value()
        };

        Self {
            name,
            params: vec![],
            returns: Some(R::host_type()),
            call: MethodCall::Shared(Arc::new(call)),
        }
    }

    /// Registers a setter: `fn(&mut self, P)`.
    pub fn setter<E: Entity, P: HostValue>(name: &'static str, f: fn(&mut E, P)) -> Self {
        let call = move |owner: &mut dyn Any, value: Value| -> Result<Value> {
            let owner = downcast_mut::<E>(owner)?;
            f(owner, P::from_value(value)?);
            Ok(Value::Null)
        };

        Self {
            name,
            params: vec![P::host_type()],
            returns: None,
            call: MethodCall::Exclusive(Arc::new(call)),
        }
    }

    /// Registers a method that takes one argument and returns a value:
    /// `fn(&mut self, P) -> R`.
    pub fn setter_returning<E: Entity, P: HostValue, R: HostValue>(
        name: &'static str,
        f: fn(&mut E, P) -> R,
    ) -> Self {
        let call = move |owner: &mut dyn Any, value: Value| -> Result<Value> {
            let owner = downcast_mut::<E>(owner)?;
            f(owner, P::from_value(value)?).to_value()
        };

        Self {
            name,
            params: vec![P::host_type()],
            returns: Some(R::host_type()),
            call: MethodCall::Exclusive(Arc::new(call)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[HostType] {
        &self.params
    }

    /// `None` when the method returns `()`.
    pub fn returns(&self) -> Option<&HostType> {
        self.returns.as_ref()
    }

    pub fn takes_shared_self(&self) -> bool {
        matches!(self.call, MethodCall::Shared(_))
    }

    fn invoke_shared(&self, owner: &dyn Any) -> Result<Value> {
        match &self.call {
            MethodCall::Shared(call) => call(owner),
            MethodCall::Exclusive(_) => Err(crate::err!(
                "accessor method `{}` requires exclusive access",
                self.name
            )),
        }
    }

    fn invoke_exclusive(&self, owner: &mut dyn Any, value: Value) -> Result<Value> {
        match &self.call {
            MethodCall::Exclusive(call) => call(owner, value),
            MethodCall::Shared(_) => Err(crate::err!(
                "accessor method `{}` does not accept an argument",
                self.name
            )),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

fn downcast_ref<E: Entity>(owner: &dyn Any) -> Result<&E> {
    owner
        .downcast_ref::<E>()
        .ok_or_else(|| Error::invalid_owner(E::NAME))
}

fn downcast_mut<E: Entity>(owner: &mut dyn Any) -> Result<&mut E> {
    owner
        .downcast_mut::<E>()
        .ok_or_else(|| Error::invalid_owner(E::NAME))
}
