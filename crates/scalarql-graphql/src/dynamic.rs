//! Bridge to async-graphql dynamic schemas.
//!
//! async-graphql merges literals and variables into one resolved value before
//! a scalar sees them, so only `parse_value` can be applied on this side.
//! Output still goes through `serialize`.

use std::sync::Arc;

use async_graphql::dynamic::Scalar;
use async_graphql::{ErrorExtensions, Value};
use scalarql_core::{InternalValue, ScalarDescriptor};
use tracing::trace;

/// Builds an async-graphql dynamic scalar from a descriptor.
///
/// Incoming values are accepted when the descriptor's `parse_value` accepts
/// their JSON form.
pub fn dynamic_scalar(descriptor: Arc<ScalarDescriptor>) -> Scalar {
    let mut scalar = Scalar::new(descriptor.name());
    if let Some(description) = descriptor.description() {
        scalar = scalar.description(description);
    }
    if let Some(url) = descriptor.specified_by_url() {
        scalar = scalar.specified_by_url(url);
    }

    scalar.validator(move |value| {
        let Ok(json) = value.clone().into_json() else {
            return false;
        };
        match descriptor.parse_value(json) {
            Ok(_) => true,
            Err(err) => {
                trace!(error = %err, "Dynamic scalar rejected input");
                false
            }
        }
    })
}

/// Serializes an internal value for a dynamic resolver.
///
/// # Errors
///
/// Returns an error carrying the coercion error code when the descriptor
/// refuses the value.
pub fn serialize_to_const(
    descriptor: &ScalarDescriptor,
    value: &InternalValue,
) -> async_graphql::Result<Value> {
    let wire = descriptor.serialize(value).map_err(|err| {
        async_graphql::Error::new(err.to_string()).extend_with(|_, e| {
            e.set("code", err.error_code());
            e.set("scalar", err.scalar.as_str());
        })
    })?;
    Value::from_json(wire).map_err(|e| async_graphql::Error::new(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::dynamic::{Field, FieldFuture, InputValue, Object, Schema, TypeRef};
    use scalarql_core::{CustomId, CustomScalar};
    use serde_json::json;

    fn descriptor() -> Arc<ScalarDescriptor> {
        Arc::new(ScalarDescriptor::of::<CustomId>().unwrap())
    }

    fn schema() -> Schema {
        let descriptor = descriptor();
        let echo_descriptor = descriptor.clone();
        let broken_descriptor = descriptor.clone();

        let query = Object::new("Query")
            .field(
                Field::new("echo", TypeRef::named(CustomId::NAME), move |ctx| {
                    let descriptor = echo_descriptor.clone();
                    FieldFuture::new(async move {
                        let raw = ctx.args.try_get("id")?.string()?.to_string();
                        let id = descriptor.parse_value(json!(raw))?;
                        Ok(Some(serialize_to_const(&descriptor, &id)?))
                    })
                })
                .argument(InputValue::new("id", TypeRef::named_nn(CustomId::NAME))),
            )
            .field(Field::new("broken", TypeRef::named(CustomId::NAME), move |_| {
                let descriptor = broken_descriptor.clone();
                FieldFuture::new(async move {
                    Ok(Some(serialize_to_const(&descriptor, &InternalValue::new(42i32))?))
                })
            }));

        Schema::build("Query", None, None)
            .register(dynamic_scalar(descriptor))
            .register(query)
            .finish()
            .unwrap()
    }

    #[tokio::test]
    async fn test_literal_and_variable_accepted() {
        let schema = schema();
        let response = schema.execute(r#"{ echo(id: "5b42ba57289") }"#).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(response.data.into_json().unwrap(), json!({"echo": "5b42ba57289"}));

        let request = async_graphql::Request::new("query ($id: CustomScalarType!) { echo(id: $id) }")
            .variables(async_graphql::Variables::from_json(json!({"id": "abc"})));
        let response = schema.execute(request).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
    }

    #[tokio::test]
    async fn test_wrong_shape_rejected_by_validator() {
        let schema = schema();
        let response = schema.execute("{ echo(id: 42) }").await;
        assert!(!response.errors.is_empty());

        let request = async_graphql::Request::new("query ($id: CustomScalarType!) { echo(id: $id) }")
            .variables(async_graphql::Variables::from_json(json!({"id": 42})));
        let response = schema.execute(request).await;
        assert!(!response.errors.is_empty());
    }

    #[tokio::test]
    async fn test_serialize_failure_carries_code() {
        let response = schema().execute("{ broken }").await;
        assert_eq!(response.errors.len(), 1);
        let extensions = response.errors[0].extensions.as_ref().unwrap();
        assert_eq!(extensions.get("code"), Some(&Value::from("UNSERIALIZABLE_VALUE")));
    }

    #[test]
    fn test_dynamic_scalar_sdl_carries_description() {
        let sdl = schema().sdl();
        assert!(sdl.contains("scalar CustomScalarType"));
        assert!(sdl.contains("represents an ID Object."));
    }
}
