//! Scalar implementations shipped with the crate.
//!
//! - [`builtin`] - `String`, `Int`, `Float`, `Boolean` and `ID`
//! - [`CustomId`] - the `CustomScalarType` identifier scalar

pub mod builtin;
mod custom_id;

pub use custom_id::CustomId;
