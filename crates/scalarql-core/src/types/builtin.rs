//! The five scalars every GraphQL schema provides.
//!
//! Internal representations:
//!
//! - `String` - `String` (serialize also takes `&'static str`)
//! - `Int` - `i32` (serialize also takes the other primitive integers when in range)
//! - `Float` - `f64` (serialize also takes `f32` and `i32`/`i64`)
//! - `Boolean` - `bool`
//! - `ID` - `String` (integer input is converted to its decimal string)

use crate::descriptor::ScalarDescriptor;
use crate::error::Rejection;
use crate::literal::Literal;
use crate::value::{InternalValue, WireValue};

/// Returns all built-in scalar descriptors.
#[must_use]
pub fn all() -> Vec<ScalarDescriptor> {
    vec![string(), int(), float(), boolean(), id()]
}

fn as_text(value: &InternalValue) -> Option<&str> {
    value
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| value.downcast_ref::<&'static str>().copied())
}

fn as_integer(value: &InternalValue) -> Option<i128> {
    macro_rules! try_int {
        ($($ty:ty),*) => {
            $(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some(*v as i128);
                }
            )*
        };
    }
    try_int!(i32, i64, i16, i8, u8, u16, u32, u64, usize, isize);
    None
}

fn int_in_range(n: i128) -> Result<i32, Rejection> {
    i32::try_from(n).map_err(|_| Rejection::with_reason(format!("{n} is outside the 32-bit range")))
}

/// `String`: UTF-8 text.
#[must_use]
pub fn string() -> ScalarDescriptor {
    ScalarDescriptor::builder("String")
        .description("The `String` scalar type represents textual data, represented as UTF-8 character sequences.")
        .serialize(|value| {
            as_text(value)
                .map(|s| WireValue::String(s.to_owned()))
                .ok_or_else(Rejection::unexpected)
        })
        .parse_value(|value| match value {
            WireValue::String(s) => Ok(InternalValue::new(s.clone())),
            _ => Err(Rejection::unexpected()),
        })
        .parse_literal(|node| match node {
            Literal::String(s) => Ok(InternalValue::new(s.clone())),
            _ => Err(Rejection::unexpected()),
        })
        .build()
        .expect("valid builtin scalar")
}

/// `Int`: signed 32-bit integer.
#[must_use]
pub fn int() -> ScalarDescriptor {
    ScalarDescriptor::builder("Int")
        .description("The `Int` scalar type represents non-fractional signed whole numeric values between -(2^31) and 2^31 - 1.")
        .serialize(|value| {
            let n = as_integer(value).ok_or_else(Rejection::unexpected)?;
            int_in_range(n).map(WireValue::from)
        })
        .parse_value(|value| match value {
            WireValue::Number(n) => {
                let n = n
                    .as_i64()
                    .ok_or_else(|| Rejection::with_reason("expected a whole number"))?;
                int_in_range(i128::from(n)).map(InternalValue::new)
            }
            _ => Err(Rejection::unexpected()),
        })
        .parse_literal(|node| match node {
            Literal::Int(n) => int_in_range(*n).map(InternalValue::new),
            _ => Err(Rejection::unexpected()),
        })
        .build()
        .expect("valid builtin scalar")
}

/// `Float`: double-precision number.
#[must_use]
pub fn float() -> ScalarDescriptor {
    ScalarDescriptor::builder("Float")
        .description("The `Float` scalar type represents signed double-precision fractional values as specified by IEEE 754.")
        .serialize(|value| {
            let n = if let Some(f) = value.downcast_ref::<f64>() {
                *f
            } else if let Some(f) = value.downcast_ref::<f32>() {
                f64::from(*f)
            } else if let Some(i) = value.downcast_ref::<i32>() {
                f64::from(*i)
            } else if let Some(i) = value.downcast_ref::<i64>() {
                *i as f64
            } else {
                return Err(Rejection::unexpected());
            };
            serde_json::Number::from_f64(n)
                .map(WireValue::Number)
                .ok_or_else(|| Rejection::with_reason("non-finite float"))
        })
        .parse_value(|value| match value {
            WireValue::Number(n) => n
                .as_f64()
                .map(InternalValue::new)
                .ok_or_else(Rejection::unexpected),
            _ => Err(Rejection::unexpected()),
        })
        .parse_literal(|node| match node {
            Literal::Float(f) => Ok(InternalValue::new(*f)),
            Literal::Int(i) => Ok(InternalValue::new(*i as f64)),
            _ => Err(Rejection::unexpected()),
        })
        .build()
        .expect("valid builtin scalar")
}

/// `Boolean`: `true` or `false`.
#[must_use]
pub fn boolean() -> ScalarDescriptor {
    ScalarDescriptor::builder("Boolean")
        .description("The `Boolean` scalar type represents `true` or `false`.")
        .serialize(|value| {
            value
                .downcast_ref::<bool>()
                .map(|b| WireValue::Bool(*b))
                .ok_or_else(Rejection::unexpected)
        })
        .parse_value(|value| match value {
            WireValue::Bool(b) => Ok(InternalValue::new(*b)),
            _ => Err(Rejection::unexpected()),
        })
        .parse_literal(|node| match node {
            Literal::Boolean(b) => Ok(InternalValue::new(*b)),
            _ => Err(Rejection::unexpected()),
        })
        .build()
        .expect("valid builtin scalar")
}

/// `ID`: opaque identifier serialized as a string.
#[must_use]
pub fn id() -> ScalarDescriptor {
    ScalarDescriptor::builder("ID")
        .description("The `ID` scalar type represents a unique identifier, serialized as a string.")
        .serialize(|value| {
            if let Some(s) = as_text(value) {
                return Ok(WireValue::String(s.to_owned()));
            }
            as_integer(value)
                .map(|n| WireValue::String(n.to_string()))
                .ok_or_else(Rejection::unexpected)
        })
        .parse_value(|value| match value {
            WireValue::String(s) => Ok(InternalValue::new(s.clone())),
            WireValue::Number(n) if n.is_i64() || n.is_u64() => {
                Ok(InternalValue::new(n.to_string()))
            }
            _ => Err(Rejection::unexpected()),
        })
        .parse_literal(|node| match node {
            Literal::String(s) => Ok(InternalValue::new(s.clone())),
            Literal::Int(n) => Ok(InternalValue::new(n.to_string())),
            _ => Err(Rejection::unexpected()),
        })
        .build()
        .expect("valid builtin scalar")
}
