//! Scalar type descriptors.
//!
//! A [`ScalarDescriptor`] is the named, immutable conversion contract of one
//! scalar type. It owns three functions:
//!
//! | operation       | input            | output          | failure kind            |
//! |-----------------|------------------|-----------------|-------------------------|
//! | `serialize`     | [`InternalValue`] | [`WireValue`]   | `UnserializableValue`   |
//! | `parse_value`   | [`WireValue`]    | [`InternalValue`] | `InvalidVariableValue` |
//! | `parse_literal` | [`Literal`]      | [`InternalValue`] | `InvalidLiteralValue`  |
//!
//! Descriptors are usually derived from a type implementing [`CustomScalar`]
//! with [`ScalarDescriptor::of`], or assembled from closures with
//! [`ScalarDescriptor::builder`].

use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::error::{CoercionError, CoercionErrorKind, DescriptorError, Rejection};
use crate::literal::Literal;
use crate::value::{InternalValue, WireValue, describe_wire};

/// GraphQL name: [_A-Za-z][_0-9A-Za-z]*
static NAME_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("Invalid name regex")
});

type SerializeFn = dyn Fn(&InternalValue) -> Result<WireValue, Rejection> + Send + Sync;
type ParseValueFn = dyn Fn(&WireValue) -> Result<InternalValue, Rejection> + Send + Sync;
type ParseLiteralFn = dyn Fn(&Literal) -> Result<InternalValue, Rejection> + Send + Sync;

/// A Rust type usable as a custom GraphQL scalar.
///
/// # Example
///
/// ```
/// use scalarql_core::{CustomScalar, Literal, Rejection, ScalarDescriptor, WireValue};
///
/// struct Sku(String);
///
/// impl CustomScalar for Sku {
///     const NAME: &'static str = "Sku";
///
///     fn serialize(&self) -> Result<WireValue, Rejection> {
///         Ok(WireValue::String(self.0.clone()))
///     }
///
///     fn parse_value(value: &WireValue) -> Result<Self, Rejection> {
///         value.as_str().map(|s| Sku(s.to_owned())).ok_or_else(Rejection::unexpected)
///     }
///
///     fn parse_literal(node: &Literal) -> Result<Self, Rejection> {
///         node.as_str().map(|s| Sku(s.to_owned())).ok_or_else(Rejection::unexpected)
///     }
/// }
///
/// let descriptor = ScalarDescriptor::of::<Sku>().unwrap();
/// assert_eq!(descriptor.name(), "Sku");
/// ```
pub trait CustomScalar: Any + Send + Sync + Sized {
    /// Type name in the schema.
    const NAME: &'static str;

    /// Documentation shown for the type.
    const DESCRIPTION: Option<&'static str> = None;

    /// URL of the scalar's format specification.
    const SPECIFIED_BY_URL: Option<&'static str> = None;

    /// Converts the value to its response representation.
    fn serialize(&self) -> Result<WireValue, Rejection>;

    /// Builds a value from a decoded variable.
    fn parse_value(value: &WireValue) -> Result<Self, Rejection>;

    /// Builds a value from a literal in the query text.
    fn parse_literal(node: &Literal) -> Result<Self, Rejection>;
}

/// Conversion contract of a single scalar type.
///
/// Cloning is cheap; the functions are shared.
#[derive(Clone)]
pub struct ScalarDescriptor {
    name: String,
    description: Option<String>,
    specified_by_url: Option<String>,
    serialize: Arc<SerializeFn>,
    parse_value: Arc<ParseValueFn>,
    parse_literal: Arc<ParseLiteralFn>,
}

impl ScalarDescriptor {
    /// Starts building a descriptor from closures.
    pub fn builder(name: impl Into<String>) -> ScalarDescriptorBuilder {
        ScalarDescriptorBuilder {
            name: name.into(),
            description: None,
            specified_by_url: None,
            serialize: None,
            parse_value: None,
            parse_literal: None,
        }
    }

    /// Derives a descriptor from a [`CustomScalar`] implementation.
    ///
    /// `serialize` accepts only internal values holding a `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if `T::NAME` is not a valid GraphQL name.
    pub fn of<T: CustomScalar>() -> Result<Self, DescriptorError> {
        let mut builder = Self::builder(T::NAME)
            .serialize(|value| {
                value
                    .downcast_ref::<T>()
                    .ok_or_else(Rejection::unexpected)?
                    .serialize()
            })
            .parse_value(|value| T::parse_value(value).map(InternalValue::new))
            .parse_literal(|node| T::parse_literal(node).map(InternalValue::new));
        if let Some(description) = T::DESCRIPTION {
            builder = builder.description(description);
        }
        if let Some(url) = T::SPECIFIED_BY_URL {
            builder = builder.specified_by_url(url);
        }
        builder.build()
    }

    /// Type name in the schema.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation for the type.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// URL of the scalar's format specification.
    #[must_use]
    pub fn specified_by_url(&self) -> Option<&str> {
        self.specified_by_url.as_deref()
    }

    /// Converts an internal value into its response representation.
    ///
    /// Accepts the value itself or a reference to it.
    ///
    /// # Errors
    ///
    /// Returns an `UnserializableValue` error if the value is not one of the
    /// scalar's internal representations.
    pub fn serialize(&self, value: impl Borrow<InternalValue>) -> Result<WireValue, CoercionError> {
        let value = value.borrow();
        (self.serialize)(value).map_err(|rejection| {
            rejection.into_coercion_error(
                CoercionErrorKind::UnserializableValue,
                &self.name,
                value.type_name(),
            )
        })
    }

    /// Converts a decoded variable into an internal value.
    ///
    /// Accepts the value itself or a reference to it.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidVariableValue` error if the shape is not accepted.
    pub fn parse_value(&self, value: impl Borrow<WireValue>) -> Result<InternalValue, CoercionError> {
        let value = value.borrow();
        (self.parse_value)(value).map_err(|rejection| {
            rejection.into_coercion_error(
                CoercionErrorKind::InvalidVariableValue,
                &self.name,
                describe_wire(value),
            )
        })
    }

    /// Converts a literal from the query text into an internal value.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidLiteralValue` error if the literal kind is not accepted.
    pub fn parse_literal(&self, node: &Literal) -> Result<InternalValue, CoercionError> {
        (self.parse_literal)(node).map_err(|rejection| {
            rejection.into_coercion_error(
                CoercionErrorKind::InvalidLiteralValue,
                &self.name,
                node.kind().to_string(),
            )
        })
    }
}

impl fmt::Debug for ScalarDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("specified_by_url", &self.specified_by_url)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ScalarDescriptor`].
pub struct ScalarDescriptorBuilder {
    name: String,
    description: Option<String>,
    specified_by_url: Option<String>,
    serialize: Option<Arc<SerializeFn>>,
    parse_value: Option<Arc<ParseValueFn>>,
    parse_literal: Option<Arc<ParseLiteralFn>>,
}

impl ScalarDescriptorBuilder {
    /// Sets the documentation.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the format specification URL.
    #[must_use]
    pub fn specified_by_url(mut self, url: impl Into<String>) -> Self {
        self.specified_by_url = Some(url.into());
        self
    }

    /// Sets the output conversion.
    #[must_use]
    pub fn serialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&InternalValue) -> Result<WireValue, Rejection> + Send + Sync + 'static,
    {
        self.serialize = Some(Arc::new(f));
        self
    }

    /// Sets the variable input conversion.
    #[must_use]
    pub fn parse_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&WireValue) -> Result<InternalValue, Rejection> + Send + Sync + 'static,
    {
        self.parse_value = Some(Arc::new(f));
        self
    }

    /// Sets the literal input conversion.
    #[must_use]
    pub fn parse_literal<F>(mut self, f: F) -> Self
    where
        F: Fn(&Literal) -> Result<InternalValue, Rejection> + Send + Sync + 'static,
    {
        self.parse_literal = Some(Arc::new(f));
        self
    }

    /// Validates the name and assembles the descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, malformed or reserved, or if any
    /// of the three functions was not provided.
    pub fn build(self) -> Result<ScalarDescriptor, DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if !NAME_REGEX.is_match(&self.name) {
            return Err(DescriptorError::InvalidName(self.name));
        }
        if self.name.starts_with("__") {
            return Err(DescriptorError::ReservedName(self.name));
        }

        let missing = |operation: &'static str| DescriptorError::MissingOperation {
            scalar: self.name.clone(),
            operation,
        };
        let serialize = self.serialize.clone().ok_or_else(|| missing("serialize"))?;
        let parse_value = self.parse_value.clone().ok_or_else(|| missing("parse_value"))?;
        let parse_literal = self
            .parse_literal
            .clone()
            .ok_or_else(|| missing("parse_literal"))?;

        Ok(ScalarDescriptor {
            name: self.name,
            description: self.description,
            specified_by_url: self.specified_by_url,
            serialize,
            parse_value,
            parse_literal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upper_descriptor() -> ScalarDescriptor {
        ScalarDescriptor::builder("Upper")
            .description("Upper-cased string")
            .serialize(|value| {
                value
                    .downcast_ref::<String>()
                    .map(|s| WireValue::String(s.to_uppercase()))
                    .ok_or_else(Rejection::unexpected)
            })
            .parse_value(|value| match value {
                WireValue::String(s) if s.is_empty() => Err(Rejection::with_reason("empty")),
                WireValue::String(s) => Ok(InternalValue::new(s.to_uppercase())),
                _ => Err(Rejection::unexpected()),
            })
            .parse_literal(|node| match node {
                Literal::String(s) => Ok(InternalValue::new(s.to_uppercase())),
                _ => Err(Rejection::unexpected()),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_metadata() {
        let descriptor = upper_descriptor();
        assert_eq!(descriptor.name(), "Upper");
        assert_eq!(descriptor.description(), Some("Upper-cased string"));
        assert_eq!(descriptor.specified_by_url(), None);
    }

    #[test]
    fn test_invalid_names() {
        let build = |name: &str| {
            ScalarDescriptor::builder(name)
                .serialize(|_| Ok(WireValue::Null))
                .parse_value(|_| Ok(InternalValue::new(())))
                .parse_literal(|_| Ok(InternalValue::new(())))
                .build()
        };
        assert_eq!(build("").unwrap_err(), DescriptorError::EmptyName);
        assert!(matches!(build("1abc"), Err(DescriptorError::InvalidName(_))));
        assert!(matches!(build("has space"), Err(DescriptorError::InvalidName(_))));
        assert!(matches!(build("__Reserved"), Err(DescriptorError::ReservedName(_))));
        assert!(build("_private").is_ok());
    }

    #[test]
    fn test_missing_operation() {
        let err = ScalarDescriptor::builder("Half")
            .serialize(|_| Ok(WireValue::Null))
            .parse_value(|_| Ok(InternalValue::new(())))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::MissingOperation {
                scalar: "Half".into(),
                operation: "parse_literal",
            }
        );
    }

    #[test]
    fn test_serialize_rejection_names_type() {
        let err = upper_descriptor()
            .serialize(InternalValue::new(3u8))
            .unwrap_err();
        assert_eq!(err.kind, CoercionErrorKind::UnserializableValue);
        assert_eq!(err.scalar, "Upper");
        assert_eq!(err.received, "u8");
    }

    #[test]
    fn test_parse_value_rejection_keeps_reason() {
        let err = upper_descriptor().parse_value(json!("")).unwrap_err();
        assert_eq!(err.kind, CoercionErrorKind::InvalidVariableValue);
        assert_eq!(err.reason.as_deref(), Some("empty"));

        let err = upper_descriptor().parse_value(json!(true)).unwrap_err();
        assert_eq!(err.received, "boolean true");
        assert!(err.reason.is_none());
    }

    #[test]
    fn test_parse_literal_rejection_names_kind() {
        let err = upper_descriptor()
            .parse_literal(&Literal::Float(1.5))
            .unwrap_err();
        assert_eq!(err.kind, CoercionErrorKind::InvalidLiteralValue);
        assert_eq!(err.received, "float literal");
    }

    #[test]
    fn test_value_and_reference_forms() {
        let descriptor = upper_descriptor();
        let value = InternalValue::new(String::from("abc"));
        let by_ref = descriptor.serialize(&value).unwrap();
        let by_value = descriptor.serialize(value).unwrap();
        assert_eq!(by_ref, by_value);

        let wire = json!("xyz");
        let parsed_ref = descriptor.parse_value(&wire).unwrap();
        let parsed_val = descriptor.parse_value(wire).unwrap();
        assert_eq!(
            parsed_ref.downcast_ref::<String>(),
            parsed_val.downcast_ref::<String>()
        );
    }
}
