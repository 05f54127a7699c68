//! Values passed into and returned from field resolvers.

use std::any::{Any, type_name};
use std::sync::Arc;

use indexmap::IndexMap;
use scalarql_core::InternalValue;

use crate::error::{FieldError, FieldResult, PathSegment};

/// Value produced by a resolver.
///
/// Scalar-typed fields hand the inner [`InternalValue`] to the scalar's
/// `serialize`; object-typed fields pass it on as the parent of the
/// sub-selection.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Value(InternalValue),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Wraps a direct value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(InternalValue::new(value))
    }

    /// Wraps a shared value without copying it.
    pub fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self::Value(InternalValue::from_arc(value))
    }

    /// Builds a list value.
    pub fn list(items: impl IntoIterator<Item = FieldValue>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Returns whether this is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<InternalValue> for FieldValue {
    fn from(value: InternalValue) -> Self {
        Self::Value(value)
    }
}

/// Coerced argument or input object field value.
#[derive(Debug, Clone)]
pub enum ArgumentValue {
    Null,
    Scalar(InternalValue),
    List(Vec<ArgumentValue>),
    Object(IndexMap<String, ArgumentValue>),
}

impl ArgumentValue {
    /// Returns whether this is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the scalar's internal value.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&InternalValue> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the scalar's internal value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_scalar().and_then(InternalValue::downcast_ref::<T>)
    }

    /// Returns the items of a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ArgumentValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the fields of an input object value.
    #[must_use]
    pub fn as_object(&self) -> Option<&IndexMap<String, ArgumentValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Arguments of one field invocation.
///
/// Arguments the query omitted and that have no default are absent, which is
/// different from an explicit `null`.
#[derive(Debug, Clone, Default)]
pub struct Arguments(IndexMap<String, ArgumentValue>);

impl Arguments {
    pub(crate) fn new(values: IndexMap<String, ArgumentValue>) -> Self {
        Self(values)
    }

    /// Looks up an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.0.get(name)
    }

    /// Returns whether an argument was supplied (possibly as `null`).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over supplied arguments.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Everything a resolver gets to see.
#[derive(Debug, Clone)]
pub struct ResolverContext {
    field_name: String,
    path: Vec<PathSegment>,
    parent: Option<InternalValue>,
    arguments: Arguments,
}

impl ResolverContext {
    pub(crate) fn new(
        field_name: impl Into<String>,
        path: Vec<PathSegment>,
        parent: Option<InternalValue>,
        arguments: Arguments,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            path,
            parent,
            arguments,
        }
    }

    /// Name of the field being resolved.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Response path of the field being resolved.
    #[must_use]
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Value of the enclosing object; `None` on root fields.
    #[must_use]
    pub fn parent_value(&self) -> Option<&InternalValue> {
        self.parent.as_ref()
    }

    /// Value of the enclosing object as a `T`.
    ///
    /// # Errors
    ///
    /// Returns an error on root fields or when the parent is not a `T`.
    pub fn parent<T: Any>(&self) -> FieldResult<&T> {
        let parent = self.parent.as_ref().ok_or_else(|| {
            FieldError::new(format!("Field \"{}\" has no parent value", self.field_name))
        })?;
        parent.downcast_ref::<T>().ok_or_else(|| {
            FieldError::new(format!(
                "Parent of field \"{}\" is a {}, expected {}",
                self.field_name,
                parent.type_name(),
                type_name::<T>()
            ))
        })
    }

    /// All supplied arguments.
    #[must_use]
    pub fn args(&self) -> &Arguments {
        &self.arguments
    }

    /// A scalar argument as a `T`.
    #[must_use]
    pub fn arg<T: Any>(&self, name: &str) -> Option<&T> {
        self.arguments.get(name).and_then(ArgumentValue::downcast_ref::<T>)
    }
}
