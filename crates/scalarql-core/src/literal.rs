//! Literal nodes from a parsed query document.
//!
//! The parser's value type mixes literals with variable references and keeps
//! integers and floats in one number variant. [`Literal`] is the closed set of
//! literal kinds a scalar can be asked to parse, with ints and floats told
//! apart, so descriptors match on it exhaustively.

use std::fmt;

use async_graphql_value::ConstValue;
use indexmap::IndexMap;

/// A literal value written directly in a query document.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// Integer literal such as `42`. Wide enough for both signed and
    /// unsigned 64-bit literals; range checks belong to the scalar.
    Int(i128),
    /// Float literal such as `4.2` or `1e10`.
    Float(f64),
    /// String or block string literal.
    String(String),
    /// `true` / `false`
    Boolean(bool),
    /// Enum value such as `RED`.
    Enum(String),
    /// `[...]`
    List(Vec<Literal>),
    /// `{ key: value, ... }`
    Object(IndexMap<String, Literal>),
}

/// Discriminant of a [`Literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Null,
    Int,
    Float,
    String,
    Boolean,
    Enum,
    List,
    Object,
}

impl Literal {
    /// Returns the kind of this literal.
    #[must_use]
    pub fn kind(&self) -> LiteralKind {
        match self {
            Self::Null => LiteralKind::Null,
            Self::Int(_) => LiteralKind::Int,
            Self::Float(_) => LiteralKind::Float,
            Self::String(_) => LiteralKind::String,
            Self::Boolean(_) => LiteralKind::Boolean,
            Self::Enum(_) => LiteralKind::Enum,
            Self::List(_) => LiteralKind::List,
            Self::Object(_) => LiteralKind::Object,
        }
    }

    /// Returns the string content of a string literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null literal",
            Self::Int => "int literal",
            Self::Float => "float literal",
            Self::String => "string literal",
            Self::Boolean => "boolean literal",
            Self::Enum => "enum literal",
            Self::List => "list literal",
            Self::Object => "object literal",
        };
        f.write_str(name)
    }
}

/// A parser value that has no literal counterpart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("binary values cannot appear in a query document")]
pub struct NotALiteral;

impl TryFrom<&ConstValue> for Literal {
    type Error = NotALiteral;

    fn try_from(value: &ConstValue) -> Result<Self, Self::Error> {
        Ok(match value {
            ConstValue::Null => Self::Null,
            ConstValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Int(i128::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            ConstValue::String(s) => Self::String(s.clone()),
            ConstValue::Boolean(b) => Self::Boolean(*b),
            ConstValue::Enum(name) => Self::Enum(name.to_string()),
            ConstValue::List(items) => Self::List(
                items
                    .iter()
                    .map(Literal::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            ConstValue::Object(fields) => Self::Object(
                fields
                    .iter()
                    .map(|(k, v)| Literal::try_from(v).map(|lit| (k.to_string(), lit)))
                    .collect::<Result<_, _>>()?,
            ),
            ConstValue::Binary(_) => return Err(NotALiteral),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql_value::Name;

    #[test]
    fn test_int_and_float_are_distinct() {
        let int = Literal::try_from(&ConstValue::Number(42.into())).unwrap();
        assert_eq!(int, Literal::Int(42));

        let float = ConstValue::Number(serde_json::Number::from_f64(4.5).unwrap());
        assert_eq!(Literal::try_from(&float).unwrap(), Literal::Float(4.5));
    }

    #[test]
    fn test_unsigned_int_stays_int() {
        let big = Literal::try_from(&ConstValue::Number(u64::MAX.into())).unwrap();
        assert_eq!(big, Literal::Int(i128::from(u64::MAX)));
        assert_eq!(big.kind(), LiteralKind::Int);

        let min = Literal::try_from(&ConstValue::Number(i64::MIN.into())).unwrap();
        assert_eq!(min, Literal::Int(i128::from(i64::MIN)));
    }

    #[test]
    fn test_nested_conversion() {
        let mut fields = indexmap::IndexMap::new();
        fields.insert(Name::new("tags"), ConstValue::List(vec![ConstValue::String("a".into())]));
        fields.insert(Name::new("kind"), ConstValue::Enum(Name::new("RED")));

        let literal = Literal::try_from(&ConstValue::Object(fields)).unwrap();
        let Literal::Object(map) = literal else {
            panic!("expected object literal");
        };
        assert_eq!(map["tags"], Literal::List(vec![Literal::String("a".into())]));
        assert_eq!(map["kind"].kind(), LiteralKind::Enum);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(LiteralKind::String.to_string(), "string literal");
        assert_eq!(Literal::Int(1).kind().to_string(), "int literal");
    }
}
