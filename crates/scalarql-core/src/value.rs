//! Value representations crossing the coercion boundary.
//!
//! Three shapes meet at a scalar descriptor:
//!
//! - [`InternalValue`] - the opaque application value handed to resolvers
//! - [`WireValue`] - the JSON value produced for responses or decoded from variables
//! - [`Literal`](crate::Literal) - a literal node from a query document (see [`crate::literal`])

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// JSON value exchanged with the outside world.
///
/// `serialize` produces one for a response, `parse_value` consumes one decoded
/// from a request's variables payload.
pub type WireValue = serde_json::Value;

/// Opaque application value owned by the execution engine.
///
/// The value is type-erased and reference counted, so it can be shared between
/// resolvers running concurrently. Both a direct value ([`InternalValue::new`])
/// and an ownership handle ([`InternalValue::from_arc`]) normalize to the same
/// representation, which is why descriptors never have to branch on
/// value-vs-handle.
#[derive(Clone)]
pub struct InternalValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl InternalValue {
    /// Wraps a direct value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Wraps an already shared value without copying it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: type_name::<T>(),
        }
    }

    /// Returns a reference to the value if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Returns whether the value is of type `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    /// Name of the concrete Rust type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns whether both values point at the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for InternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Short human-readable description of a wire value for error messages.
///
/// Strings and numbers are rendered with their content, containers only by
/// their size so that large payloads do not end up in error messages.
#[must_use]
pub fn describe_wire(value: &WireValue) -> String {
    match value {
        WireValue::Null => "null".to_string(),
        WireValue::Bool(b) => format!("boolean {b}"),
        WireValue::Number(n) => format!("number {n}"),
        WireValue::String(s) => format!("string {s:?}"),
        WireValue::Array(items) => format!("list of {} item(s)", items.len()),
        WireValue::Object(map) => format!("object with {} field(s)", map.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Marker(u8);

    #[test]
    fn test_direct_and_shared_forms_downcast_alike() {
        let direct = InternalValue::new(Marker(7));
        let shared = InternalValue::from_arc(Arc::new(Marker(7)));

        assert_eq!(direct.downcast_ref::<Marker>(), Some(&Marker(7)));
        assert_eq!(shared.downcast_ref::<Marker>(), Some(&Marker(7)));
        assert_eq!(direct.type_name(), shared.type_name());
    }

    #[test]
    fn test_downcast_to_wrong_type() {
        let value = InternalValue::new(42i64);
        assert!(value.downcast_ref::<String>().is_none());
        assert!(value.is::<i64>());
        assert_eq!(value.type_name(), "i64");
    }

    #[test]
    fn test_clone_shares_allocation() {
        let value = InternalValue::new(String::from("abc"));
        let copy = value.clone();
        assert!(value.ptr_eq(&copy));
    }

    #[test]
    fn test_describe_wire() {
        assert_eq!(describe_wire(&json!(42)), "number 42");
        assert_eq!(describe_wire(&json!("x")), "string \"x\"");
        assert_eq!(describe_wire(&json!(null)), "null");
        assert_eq!(describe_wire(&json!([1, 2])), "list of 2 item(s)");
        assert_eq!(describe_wire(&json!({"a": 1})), "object with 1 field(s)");
    }
}
