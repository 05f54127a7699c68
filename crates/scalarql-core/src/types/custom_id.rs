//! `CustomScalarType`: an application identifier exposed as a scalar.
//!
//! The identifier wraps a string. It serializes to that string, is built from
//! a string variable or a string literal, and rejects every other shape.

use std::fmt;

use crate::descriptor::CustomScalar;
use crate::error::Rejection;
use crate::literal::Literal;
use crate::value::WireValue;

/// Identifier object backing the `CustomScalarType` scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomId {
    value: String,
}

impl CustomId {
    /// Wraps an identifier string.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl CustomScalar for CustomId {
    const NAME: &'static str = "CustomScalarType";
    const DESCRIPTION: Option<&'static str> =
        Some("The `CustomScalarType` scalar type represents an ID Object.");

    fn serialize(&self) -> Result<WireValue, Rejection> {
        Ok(WireValue::String(self.to_string()))
    }

    fn parse_value(value: &WireValue) -> Result<Self, Rejection> {
        match value {
            WireValue::String(s) => Ok(Self::new(s.as_str())),
            _ => Err(Rejection::with_reason("value must be of type string")),
        }
    }

    fn parse_literal(node: &Literal) -> Result<Self, Rejection> {
        match node {
            Literal::String(s) => Ok(Self::new(s.as_str())),
            _ => Err(Rejection::with_reason("literal must be a string")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::descriptor::ScalarDescriptor;
    use crate::error::CoercionErrorKind;
    use crate::value::InternalValue;
    use serde_json::json;

    fn descriptor() -> ScalarDescriptor {
        ScalarDescriptor::of::<CustomId>().unwrap()
    }

    #[test]
    fn test_metadata() {
        let d = descriptor();
        assert_eq!(d.name(), "CustomScalarType");
        assert_eq!(
            d.description(),
            Some("The `CustomScalarType` scalar type represents an ID Object.")
        );
    }

    #[test]
    fn test_round_trip() {
        let d = descriptor();
        for raw in ["fb278f2a4a13f", "5b42ba57289", ""] {
            let original = CustomId::new(raw);
            let wire = d.serialize(InternalValue::new(original.clone())).unwrap();
            let back = d.parse_value(&wire).unwrap();
            assert_eq!(back.downcast_ref::<CustomId>(), Some(&original));
        }
    }

    #[test]
    fn test_serialize_value_and_handle_agree() {
        let d = descriptor();
        let id = CustomId::new("fb278f2a4a13f");
        let direct = d.serialize(InternalValue::new(id.clone())).unwrap();
        let handle = d.serialize(InternalValue::from_arc(Arc::new(id))).unwrap();
        assert_eq!(direct, json!("fb278f2a4a13f"));
        assert_eq!(direct, handle);
    }

    #[test]
    fn test_serialize_rejects_unrelated_types() {
        let d = descriptor();
        for value in [
            InternalValue::new(42i64),
            InternalValue::new(String::from("fb278f2a4a13f")),
            InternalValue::new(()),
        ] {
            let err = d.serialize(&value).unwrap_err();
            assert_eq!(err.kind, CoercionErrorKind::UnserializableValue);
            assert_eq!(err.received, value.type_name());
        }
    }

    #[test]
    fn test_parse_value_rejects_non_strings() {
        let d = descriptor();
        for wire in [json!(42), json!(true), json!(null), json!(["a"]), json!({"id": "a"})] {
            let err = d.parse_value(&wire).unwrap_err();
            assert_eq!(err.kind, CoercionErrorKind::InvalidVariableValue);
            assert_eq!(err.scalar, "CustomScalarType");
        }
    }

    #[test]
    fn test_parse_literal_accepts_only_strings() {
        let d = descriptor();
        let parsed = d.parse_literal(&Literal::String("5b42ba57289".into())).unwrap();
        assert_eq!(parsed.downcast_ref::<CustomId>(), Some(&CustomId::new("5b42ba57289")));

        for node in [
            Literal::Int(5),
            Literal::Float(5.0),
            Literal::Boolean(true),
            Literal::Null,
            Literal::Enum("ID".into()),
            Literal::List(vec![Literal::String("a".into())]),
        ] {
            let err = d.parse_literal(&node).unwrap_err();
            assert_eq!(err.kind, CoercionErrorKind::InvalidLiteralValue);
            assert_eq!(err.received, node.kind().to_string());
        }
    }
}
