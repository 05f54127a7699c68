//! # scalarql-core
//!
//! Scalar coercion contract for the scalarql GraphQL engine.
//!
//! A GraphQL scalar moves between three representations:
//!
//! - an opaque application value ([`InternalValue`])
//! - a JSON value in responses and variables ([`WireValue`])
//! - a literal written in the query text ([`Literal`])
//!
//! A [`ScalarDescriptor`] converts between them with three pure functions:
//! `serialize`, `parse_value` and `parse_literal`. Each failure is reported as
//! a [`CoercionError`] whose kind tells the engine which path failed.
//!
//! ## Modules
//!
//! - [`descriptor`] - descriptors and the [`CustomScalar`] trait
//! - [`registry`] - per-schema scalar registry
//! - [`types`] - built-in scalars and the `CustomScalarType` example
//! - [`value`] / [`literal`] - value representations
//! - [`error`] - coercion and registration errors

pub mod descriptor;
pub mod error;
pub mod literal;
pub mod registry;
pub mod types;
pub mod value;

pub use descriptor::{CustomScalar, ScalarDescriptor, ScalarDescriptorBuilder};
pub use error::{CoercionError, CoercionErrorKind, DescriptorError, Rejection, RegistryError};
pub use literal::{Literal, LiteralKind, NotALiteral};
pub use registry::ScalarRegistry;
pub use types::CustomId;
pub use value::{InternalValue, WireValue, describe_wire};
