//! The customers schema served by the binary.
//!
//! ```graphql
//! scalar CustomScalarType
//!
//! type Customer {
//!   id: CustomScalarType
//! }
//!
//! type Query {
//!   customers(id: CustomScalarType): [Customer]
//! }
//! ```

use scalarql_core::{CustomId, CustomScalar, ScalarDescriptor};
use scalarql_graphql::{
    ExecutorConfig, Field, FieldValue, InputValue, Object, Schema, SchemaError, TypeRef,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomId,
}

pub fn build_schema(config: ExecutorConfig) -> Result<Schema, SchemaError> {
    let customer = Object::new("Customer").field(Field::new(
        "id",
        TypeRef::named(CustomId::NAME),
        |ctx| async move {
            let customer = ctx.parent::<Customer>()?;
            Ok(FieldValue::value(customer.id.clone()))
        },
    ));

    let query = Object::new("Query").field(
        Field::new("customers", TypeRef::named_list("Customer"), |ctx| async move {
            match ctx.arg::<CustomId>("id") {
                Some(id) => debug!(%id, "id from arguments"),
                None => debug!("no id argument"),
            }
            let customers = vec![Customer {
                id: CustomId::new("fb278f2a4a13f"),
            }];
            Ok(FieldValue::list(customers.into_iter().map(FieldValue::value)))
        })
        .argument(InputValue::new("id", TypeRef::named(CustomId::NAME))),
    );

    Schema::build("Query")
        .register(ScalarDescriptor::of::<CustomId>()?)
        .register(customer)
        .register(query)
        .config(config)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DEFAULT_QUERY;
    use scalarql_graphql::Request;

    fn schema() -> Schema {
        build_schema(ExecutorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_default_query_output() {
        let response = schema()
            .execute(Request::new(DEFAULT_QUERY).variable("id", "5b42ba57289"))
            .await;
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"data":{"customers":[{"id":"fb278f2a4a13f"}]}}"#
        );
    }

    #[tokio::test]
    async fn test_argument_forms() {
        let schema = schema();

        let literal = schema
            .execute(r#"query { customers(id: "5b42ba57289") { id } }"#)
            .await;
        assert!(literal.is_ok());

        let variable = schema
            .execute(
                Request::new("query($id: CustomScalarType) { customers(id: $id) { id } }")
                    .variable("id", "5b42ba57289"),
            )
            .await;
        assert_eq!(variable.data, literal.data);

        let rejected = schema
            .execute(
                Request::new("query($id: CustomScalarType) { customers(id: $id) { id } }")
                    .variable("id", 42),
            )
            .await;
        assert!(rejected.data.is_none());
        assert_eq!(rejected.errors[0].code(), Some("INVALID_VARIABLE_VALUE"));
    }

    #[test]
    fn test_sdl() {
        let sdl = schema().sdl();
        assert!(sdl.contains("scalar CustomScalarType"));
        assert!(sdl.contains("type Customer {\n  id: CustomScalarType\n}"));
        assert!(sdl.contains("customers(id: CustomScalarType): [Customer]"));
    }
}
