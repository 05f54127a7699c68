//! # scalarql-graphql
//!
//! GraphQL schema and execution layer built around pluggable custom scalars.
//!
//! The executor keeps the three coercion paths apart:
//!
//! - resolved field values are turned into response JSON with `serialize`;
//!   a refusal nulls that field and records a field error
//! - variables are coerced with `parse_value` before execution; a refusal
//!   rejects the request
//! - literals in the query text (and schema defaults) are coerced with
//!   `parse_literal` during validation; a refusal rejects the request
//!
//! ## Example
//!
//! ```
//! use scalarql_core::{CustomId, CustomScalar, ScalarDescriptor};
//! use scalarql_graphql::{Field, FieldValue, Object, Schema, TypeRef};
//!
//! # async fn run() {
//! let schema = Schema::build("Query")
//!     .register(ScalarDescriptor::of::<CustomId>().unwrap())
//!     .register(Object::new("Query").field(Field::new(
//!         "id",
//!         TypeRef::named(CustomId::NAME),
//!         |_| async { Ok(FieldValue::value(CustomId::new("fb278f2a4a13f"))) },
//!     )))
//!     .finish()
//!     .unwrap();
//!
//! let response = schema.execute("{ id }").await;
//! assert_eq!(response.data, Some(serde_json::json!({"id": "fb278f2a4a13f"})));
//! # }
//! ```
//!
//! ## Configuration
//!
//! Add to `scalarql.toml`:
//!
//! ```toml
//! [executor]
//! max_depth = 15
//! concurrent_fields = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Executor configuration
//! - [`schema`] - Schema model and builder
//! - [`dynamic`] - Mounting descriptors into async-graphql dynamic schemas
//! - [`error`] - Error types for schema building and execution

mod coercion;
pub mod config;
pub mod dynamic;
pub mod error;
mod executor;
pub mod request;
pub mod schema;
mod validation;

pub use config::ExecutorConfig;
pub use error::{FieldError, FieldResult, Location, PathSegment, RequestError, SchemaError, ServerError};
pub use request::{Request, Response};
pub use schema::{
    ArgumentValue, Arguments, Field, FieldValue, InputObject, InputValue, Object, ResolverContext,
    Schema, SchemaBuilder, TypeRef,
};
