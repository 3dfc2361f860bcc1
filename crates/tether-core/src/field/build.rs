use super::*;
use crate::{Entity, EntityDef, FieldConfig, Method, Property, Registry};

impl FieldDescriptor {
    /// Compiles one property of `def` into a descriptor.
    ///
    /// Returns `Ok(None)` for properties without a mapping configuration.
    /// Foreign fields resolve the referenced type's id through `registry`,
    /// building and publishing the referenced table if needed.
    pub fn build(
        registry: &mut Registry,
        def: &EntityDef,
        property: &Property,
    ) -> Result<Option<FieldDescriptor>> {
        let Some(config) = &property.config else {
            return Ok(None);
        };

        Builder {
            entity: def.name,
            field: property.name,
            def,
            property,
            config,
        }
        .build(registry)
        .map(Some)
    }

    /// Compiles the property `name` of entity `E`.
    pub fn of<E: Entity>(registry: &mut Registry, name: &str) -> Result<Option<FieldDescriptor>> {
        let def = E::schema();
        let Some(property) = def.find_property(name) else {
            return Ok(None);
        };
        FieldDescriptor::build(registry, &def, property)
    }
}

struct Builder<'a> {
    entity: &'static str,
    field: &'static str,
    def: &'a EntityDef,
    property: &'a Property,
    config: &'a FieldConfig,
}

/// The kind-dependent part of a descriptor.
struct Kind {
    data_kind: DataKind,
    value_ty: HostType,
    converter: Arc<dyn FieldConverter>,
    default_column: String,
    foreign: Option<Foreign>,
}

impl Builder<'_> {
    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::invalid_configuration(self.entity, self.field, message)
    }

    fn build(self, registry: &mut Registry) -> Result<FieldDescriptor> {
        let dialect = registry.dialect_handle();
        let config = self.config;
        let table_name = self.def.resolved_table_name();
        let primitive = self.property.ty.is_primitive();

        if config.throw_if_null && !primitive {
            return Err(self.invalid(format!(
                "`throw_if_null` is only valid on non-`Option` scalar fields, found `{}`",
                self.property.ty
            )));
        }

        let kind = if config.foreign {
            self.foreign_kind(registry)?
        } else {
            self.scalar_kind(&dialect)?
        };

        let column_name = config.column_name.clone().unwrap_or(kind.default_column);

        // Ids
        let explicit_sequence = config.generated_id_sequence.as_deref();

        if config.id && (config.generated_id || explicit_sequence.is_some()) {
            return Err(self.invalid("`id` cannot be combined with `generated_id` or `generated_id_sequence`"));
        }

        if config.generated_id && explicit_sequence.is_some() && !dialect.id_sequence_needed {
            return Err(self.invalid(format!(
                "`generated_id` and `generated_id_sequence` cannot both be set for {}",
                dialect.name
            )));
        }

        let id = config.declares_id();
        let generated_id = config.generated_id || explicit_sequence.is_some();

        if generated_id && !kind.data_kind.is_valid_generated_id() {
            return Err(self.invalid(format!(
                "generated ids must be SHORT, INTEGER or LONG, found {}",
                kind.data_kind.name()
            )));
        }

        if id && (!kind.data_kind.is_appropriate_id() || kind.converter.is_stream_type()) {
            return Err(self.invalid(format!(
                "{} cannot be used as an id",
                kind.data_kind.name()
            )));
        }

        let generated_id_sequence = match explicit_sequence {
            Some(name) => Some(dialect.normalize_entity_name(name)),
            None if generated_id && dialect.id_sequence_needed => {
                Some(dialect.id_sequence_name(&table_name, &column_name, None))
            }
            None => None,
        };

        let unknown_enum = self.unknown_enum(&kind.value_ty)?;

        let accessor = if config.use_accessor_methods {
            self.method_accessor()?
        } else {
            Accessor::Slot(self.property.slot.clone())
        };

        // Defaults
        let default_value = match &config.default_value {
            Some(_) if generated_id => {
                return Err(self.invalid("generated ids cannot have a default value"));
            }
            Some(default) => {
                let cx = ConvertCx {
                    entity: self.entity,
                    field: self.field,
                    ty: &kind.value_ty,
                    unknown_enum,
                };
                let value = kind.converter.parse_default(&cx, default)?;

                if value.is_null() && config.throw_if_null && !config.can_be_null {
                    return Err(self.invalid("default value of a non-null field must not be null"));
                }

                Some(value)
            }
            None => None,
        };

        let descriptor = FieldDescriptor {
            entity: self.entity,
            table_name,
            field_name: self.field,
            column_name,
            data_kind: kind.data_kind,
            host_ty: self.property.ty.clone(),
            value_ty: kind.value_ty,
            converter: kind.converter,
            width: config.width,
            default_value,
            can_be_null: config.can_be_null,
            throw_if_null: config.throw_if_null,
            primitive,
            id,
            generated_id,
            generated_id_sequence,
            foreign: kind.foreign,
            unknown_enum,
            accessor,
        };

        log::debug!("built field descriptor {descriptor}");
        Ok(descriptor)
    }

    fn scalar_kind(&self, dialect: &crate::Dialect) -> Result<Kind> {
        let ty = &self.property.ty;
        let scalar = ty.unwrap_option().0;

        if let HostType::Entity(target) = scalar {
            return Err(self.invalid(format!(
                "field holds entity `{}` but is not marked `foreign`",
                target.name()
            )));
        }

        if self.config.foreign_auto_refresh {
            return Err(self.invalid("`foreign_auto_refresh` requires `foreign`"));
        }

        let data_kind = match self.config.data_kind {
            Some(kind) if kind.is_valid_for(ty) => kind,
            Some(kind) => {
                return Err(self.invalid(format!(
                    "data kind {} is not valid for type `{ty}`",
                    kind.name()
                )));
            }
            None => match DataKind::lookup(ty) {
                Some(kind) => kind,
                None => match scalar {
                    HostType::Bytes => {
                        return Err(self.invalid("byte array fields must set data kind BYTE_ARRAY"))
                    }
                    HostType::Serializable(_) => {
                        return Err(
                            self.invalid("serializable fields must set data kind SERIALIZABLE")
                        )
                    }
                    _ => return Err(Error::unsupported_type(self.entity, self.field, ty)),
                },
            },
        };

        Ok(Kind {
            data_kind,
            value_ty: scalar.clone(),
            converter: dialect.field_converter(data_kind, scalar),
            default_column: self.field.to_string(),
            foreign: None,
        })
    }

    fn foreign_kind(&self, registry: &mut Registry) -> Result<Kind> {
        let ty = &self.property.ty;

        if self.config.declares_id() {
            return Err(self.invalid("a foreign field cannot also be an id"));
        }

        let HostType::Entity(target) = ty.unwrap_option().0 else {
            return Err(self.invalid(format!(
                "foreign fields must hold a mapped entity, found `{ty}`"
            )));
        };

        let id = registry.foreign_id(target).map_err(|err| {
            err.context(self.invalid(format!(
                "referenced type `{}` cannot be mapped",
                target.name()
            )))
        })?;

        let Some(id) = id else {
            return Err(self.invalid(format!(
                "referenced type `{}` has no id field",
                target.name()
            )));
        };

        Ok(Kind {
            data_kind: id.data_kind,
            value_ty: id.value_ty.clone(),
            converter: id.converter.clone(),
            default_column: format!("{}_id", self.field),
            foreign: Some(Foreign::new(
                *target,
                id.table_name.clone(),
                id,
                self.config.foreign_auto_refresh,
            )),
        })
    }

    fn unknown_enum(&self, value_ty: &HostType) -> Result<Option<usize>> {
        let Some(name) = &self.config.unknown_enum_name else {
            return Ok(None);
        };

        let Some(ty) = value_ty.as_enum() else {
            return Err(self.invalid("`unknown_enum_name` is only valid on enum fields"));
        };

        ty.ordinal_of(name).map(Some).ok_or_else(|| {
            self.invalid(format!("`{name}` is not a constant of `{}`", ty.name()))
        })
    }

    /// Matches the `get_<field>` / `set_<field>` accessor pair (a getter
    /// named after the field itself is accepted too).
    fn method_accessor(&self) -> Result<Accessor> {
        let ty = &self.property.ty;
        let getter_name = format!("get_{}", self.field);
        let setter_name = format!("set_{}", self.field);

        let getter = self
            .def
            .find_method(&getter_name)
            .or_else(|| self.def.find_method(self.field))
            .ok_or_else(|| self.invalid(format!("no getter `{getter_name}` found")))?;

        if !is_getter(getter, ty) {
            return Err(self.invalid(format!(
                "getter `{}` must take `&self` and return `{ty}`",
                getter.name()
            )));
        }

        let setter = self
            .def
            .find_method(&setter_name)
            .ok_or_else(|| self.invalid(format!("no setter `{setter_name}` found")))?;

        if !is_setter(setter, ty) {
            return Err(self.invalid(format!(
                "setter `{}` must take `&mut self` and one `{ty}` argument and return nothing",
                setter.name()
            )));
        }

        Ok(Accessor::Methods {
            getter: getter.clone(),
            setter: setter.clone(),
        })
    }
}

fn is_getter(method: &Method, ty: &HostType) -> bool {
    method.takes_shared_self() && method.params().is_empty() && method.returns() == Some(ty)
}

fn is_setter(method: &Method, ty: &HostType) -> bool {
    !method.takes_shared_self()
        && method.params() == std::slice::from_ref(ty)
        && method.returns().is_none()
}
