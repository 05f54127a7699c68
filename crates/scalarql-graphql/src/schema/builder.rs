//! Schema assembly and validation.

use std::sync::Arc;

use indexmap::IndexMap;
use scalarql_core::{ScalarDescriptor, ScalarRegistry};
use tracing::{debug, trace};

use super::types::{InputObject, InputValue, Object, TypeRef};
use super::{NamedType, Schema, SchemaInner};
use crate::coercion::coerce_default;
use crate::config::ExecutorConfig;
use crate::error::SchemaError;

/// A type that can be registered with a [`SchemaBuilder`].
#[derive(Debug, Clone)]
pub enum Type {
    Scalar(Arc<ScalarDescriptor>),
    Object(Object),
    InputObject(InputObject),
}

impl Type {
    fn name(&self) -> &str {
        match self {
            Self::Scalar(scalar) => scalar.name(),
            Self::Object(object) => &object.name,
            Self::InputObject(input) => &input.name,
        }
    }
}

impl From<ScalarDescriptor> for Type {
    fn from(scalar: ScalarDescriptor) -> Self {
        Self::Scalar(Arc::new(scalar))
    }
}

impl From<Arc<ScalarDescriptor>> for Type {
    fn from(scalar: Arc<ScalarDescriptor>) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Object> for Type {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<InputObject> for Type {
    fn from(input: InputObject) -> Self {
        Self::InputObject(input)
    }
}

/// Collects type definitions and checks them in [`SchemaBuilder::finish`].
#[derive(Debug)]
pub struct SchemaBuilder {
    query: String,
    mutation: Option<String>,
    types: Vec<Type>,
    config: ExecutorConfig,
}

impl SchemaBuilder {
    pub(super) fn new(query: String) -> Self {
        Self {
            query,
            mutation: None,
            types: Vec::new(),
            config: ExecutorConfig::default(),
        }
    }

    /// Registers a scalar, object or input object.
    #[must_use]
    pub fn register(mut self, ty: impl Into<Type>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Sets the mutation root object.
    #[must_use]
    pub fn mutation(mut self, name: impl Into<String>) -> Self {
        self.mutation = Some(name.into());
        self
    }

    /// Sets the execution settings.
    #[must_use]
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the definitions and builds the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is registered twice, a root is missing, a
    /// type reference cannot be resolved or has the wrong kind, or a default
    /// value is refused by its scalar.
    pub fn finish(self) -> Result<Schema, SchemaError> {
        debug!(query = %self.query, types = self.types.len(), "Building GraphQL schema");

        self.config.validate().map_err(SchemaError::InvalidConfig)?;

        let mut scalars = ScalarRegistry::with_builtins();
        let mut objects = IndexMap::new();
        let mut input_objects = IndexMap::new();

        for ty in self.types {
            let name = ty.name().to_string();
            if objects.contains_key(&name) || input_objects.contains_key(&name) {
                return Err(SchemaError::DuplicateType(name));
            }
            match ty {
                Type::Scalar(scalar) => {
                    if scalars.contains(&name) {
                        return Err(SchemaError::DuplicateType(name));
                    }
                    scalars.register(scalar)?;
                }
                Type::Object(object) => {
                    if scalars.contains(&name) {
                        return Err(SchemaError::DuplicateType(name));
                    }
                    trace!(object = %name, fields = object.fields.len(), "Registered object");
                    objects.insert(name, object);
                }
                Type::InputObject(input) => {
                    if scalars.contains(&name) {
                        return Err(SchemaError::DuplicateType(name));
                    }
                    trace!(input = %name, fields = input.fields.len(), "Registered input object");
                    input_objects.insert(name, input);
                }
            }
        }

        let inner = SchemaInner {
            query_type: self.query,
            mutation_type: self.mutation,
            scalars,
            objects,
            input_objects,
            config: self.config,
        };

        check_roots(&inner)?;
        check_objects(&inner)?;
        check_input_objects(&inner)?;
        check_defaults(&inner)?;

        debug!(
            scalars = inner.scalars.len(),
            objects = inner.objects.len(),
            input_objects = inner.input_objects.len(),
            "GraphQL schema built"
        );

        Ok(Schema::from_inner(inner))
    }
}

fn check_roots(schema: &SchemaInner) -> Result<(), SchemaError> {
    if schema.object(&schema.query_type).is_none() {
        return Err(SchemaError::MissingRoot(schema.query_type.clone()));
    }
    if let Some(mutation) = &schema.mutation_type
        && schema.object(mutation).is_none()
    {
        return Err(SchemaError::MissingRoot(mutation.clone()));
    }
    Ok(())
}

fn check_objects(schema: &SchemaInner) -> Result<(), SchemaError> {
    for object in schema.objects.values() {
        if object.fields.is_empty() {
            return Err(SchemaError::EmptyObject(object.name.clone()));
        }
        for field in object.fields.values() {
            let owner = format!("field \"{}.{}\"", object.name, field.name);
            match schema.lookup(field.ty.type_name()) {
                Some(NamedType::Scalar(_)) | Some(NamedType::Object(_)) => {}
                Some(NamedType::InputObject(_)) => {
                    return Err(SchemaError::InvalidOutputType {
                        owner,
                        ty: field.ty.to_string(),
                    });
                }
                None => {
                    return Err(SchemaError::UnknownType {
                        name: field.ty.type_name().to_string(),
                        owner,
                    });
                }
            }
            for argument in field.arguments.values() {
                let owner = format!(
                    "argument \"{}\" of field \"{}.{}\"",
                    argument.name, object.name, field.name
                );
                check_input_type(schema, &argument.ty, owner)?;
            }
        }
    }
    Ok(())
}

fn check_input_objects(schema: &SchemaInner) -> Result<(), SchemaError> {
    for input in schema.input_objects.values() {
        if input.fields.is_empty() {
            return Err(SchemaError::EmptyObject(input.name.clone()));
        }
        for field in input.fields.values() {
            let owner = format!("input field \"{}.{}\"", input.name, field.name);
            check_input_type(schema, &field.ty, owner)?;
        }
    }
    Ok(())
}

fn check_input_type(schema: &SchemaInner, ty: &TypeRef, owner: String) -> Result<(), SchemaError> {
    match schema.lookup(ty.type_name()) {
        Some(NamedType::Scalar(_)) | Some(NamedType::InputObject(_)) => Ok(()),
        Some(NamedType::Object(_)) => Err(SchemaError::InvalidInputType {
            owner,
            ty: ty.to_string(),
        }),
        None => Err(SchemaError::UnknownType {
            name: ty.type_name().to_string(),
            owner,
        }),
    }
}

/// Defaults are literals, so each one must pass its scalar's `parse_literal`.
fn check_defaults(schema: &SchemaInner) -> Result<(), SchemaError> {
    let check = |owner: String, value: &InputValue| -> Result<(), SchemaError> {
        if let Some(default) = &value.default_value {
            coerce_default(schema, value, default).map_err(|err| SchemaError::InvalidDefaultValue {
                owner,
                message: err.message(),
            })?;
        }
        Ok(())
    };

    for object in schema.objects.values() {
        for field in object.fields.values() {
            for argument in field.arguments.values() {
                check(
                    format!(
                        "argument \"{}\" of field \"{}.{}\"",
                        argument.name, object.name, field.name
                    ),
                    argument,
                )?;
            }
        }
    }
    for input in schema.input_objects.values() {
        for field in input.fields.values() {
            check(format!("input field \"{}.{}\"", input.name, field.name), field)?;
        }
    }
    Ok(())
}
