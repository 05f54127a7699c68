//! Schema type definitions: objects, fields, arguments and input objects.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_graphql_parser::types::{BaseType, Type};
use async_graphql_value::ConstValue;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use indexmap::IndexMap;

use super::resolver::{FieldValue, ResolverContext};
use crate::error::FieldResult;

/// Reference to a type from a field or argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A named type, nullable.
    Named(String),
    /// A list of the inner type, nullable.
    List(Box<TypeRef>),
    /// The inner type, never null.
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub const STRING: &'static str = "String";
    pub const INT: &'static str = "Int";
    pub const FLOAT: &'static str = "Float";
    pub const BOOLEAN: &'static str = "Boolean";
    pub const ID: &'static str = "ID";

    /// `T`
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// `T!`
    pub fn named_nn(name: impl Into<String>) -> Self {
        Self::NonNull(Box::new(Self::named(name)))
    }

    /// `[T]`
    pub fn named_list(name: impl Into<String>) -> Self {
        Self::List(Box::new(Self::named(name)))
    }

    /// `[T!]`
    pub fn named_nn_list(name: impl Into<String>) -> Self {
        Self::List(Box::new(Self::named_nn(name)))
    }

    /// `[T]!`
    pub fn named_list_nn(name: impl Into<String>) -> Self {
        Self::NonNull(Box::new(Self::named_list(name)))
    }

    /// `[T!]!`
    pub fn named_nn_list_nn(name: impl Into<String>) -> Self {
        Self::NonNull(Box::new(Self::named_nn_list(name)))
    }

    /// Name of the innermost named type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.type_name(),
        }
    }

    /// Returns whether the outermost wrapper is non-null.
    #[must_use]
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    pub(crate) fn from_ast(ty: &Type) -> Self {
        let base = match &ty.base {
            BaseType::Named(name) => Self::Named(name.to_string()),
            BaseType::List(inner) => Self::List(Box::new(Self::from_ast(inner))),
        };
        if ty.nullable {
            base
        } else {
            Self::NonNull(Box::new(base))
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

pub(crate) type ResolverFn =
    Arc<dyn Fn(ResolverContext) -> BoxFuture<'static, FieldResult<FieldValue>> + Send + Sync>;

/// A field of an object type.
#[derive(Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) ty: TypeRef,
    pub(crate) arguments: IndexMap<String, InputValue>,
    pub(crate) resolver: ResolverFn,
}

impl Field {
    /// Creates a field resolved by an async closure.
    pub fn new<F, Fut>(name: impl Into<String>, ty: TypeRef, resolver: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<FieldValue>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: IndexMap::new(),
            resolver: Arc::new(move |ctx| resolver(ctx).boxed()),
        }
    }

    /// Sets the documentation.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an argument.
    #[must_use]
    pub fn argument(mut self, argument: InputValue) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type.
    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// An argument or input object field.
#[derive(Debug, Clone)]
pub struct InputValue {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) ty: TypeRef,
    pub(crate) default_value: Option<ConstValue>,
}

impl InputValue {
    /// Creates an input value without a default.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    /// Sets the documentation.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default, written as it would appear in query text.
    ///
    /// Defaults are coerced through `parse_literal` like any other literal.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<ConstValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Input value name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An object type.
#[derive(Debug, Clone)]
pub struct Object {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) fields: IndexMap<String, Field>,
}

impl Object {
    /// Creates an object type without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    /// Sets the documentation.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }
}

/// An input object type.
#[derive(Debug, Clone)]
pub struct InputObject {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) fields: IndexMap<String, InputValue>,
}

impl InputObject {
    /// Creates an input object type without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    /// Sets the documentation.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: InputValue) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
