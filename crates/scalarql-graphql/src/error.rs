//! Error types for schema construction and query execution.
//!
//! - [`SchemaError`] - the schema could not be built
//! - [`RequestError`] - the request was rejected before execution started
//! - [`FieldError`] - a resolver failed; only that field is affected
//! - [`ServerError`] - the serialized form of any of the above in a response

use std::fmt;

use async_graphql_parser::Pos;
use scalarql_core::{CoercionError, DescriptorError, RegistryError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Errors that can occur while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("Type \"{0}\" is registered more than once")]
    DuplicateType(String),

    #[error("Root type \"{0}\" is not a registered object type")]
    MissingRoot(String),

    #[error("Object \"{0}\" must define at least one field")]
    EmptyObject(String),

    #[error("Unknown type \"{name}\" referenced by {owner}")]
    UnknownType { name: String, owner: String },

    #[error("{owner} must have an output type, but \"{ty}\" is an input object")]
    InvalidOutputType { owner: String, ty: String },

    #[error("{owner} must have an input type, but \"{ty}\" is an object")]
    InvalidInputType { owner: String, ty: String },

    #[error("Invalid default value for {owner}: {message}")]
    InvalidDefaultValue { owner: String, message: String },

    #[error("Invalid executor configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that reject a request before any field is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    /// The query text does not parse.
    Syntax {
        message: String,
        locations: Vec<Location>,
    },

    /// No operation with the requested name.
    OperationNotFound(String),

    /// Several operations and no operation name.
    OperationNameRequired,

    /// Operation type the schema cannot run.
    UnsupportedOperation(String),

    /// The document does not fit the schema.
    Validation {
        message: String,
        locations: Vec<Location>,
    },

    /// A variable value was refused by a scalar's `parse_value`.
    VariableCoercion {
        variable: String,
        path: String,
        error: CoercionError,
        location: Location,
    },

    /// An argument literal was refused by a scalar's `parse_literal`.
    ArgumentCoercion {
        argument: String,
        path: String,
        error: CoercionError,
        location: Location,
    },
}

impl RequestError {
    pub(crate) fn validation(message: impl Into<String>, pos: Pos) -> Self {
        Self::Validation {
            message: message.into(),
            locations: vec![pos.into()],
        }
    }

    /// Returns the error code for response error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "GRAPHQL_PARSE_FAILED",
            Self::OperationNotFound(_) | Self::OperationNameRequired => "OPERATION_RESOLUTION_FAILURE",
            Self::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            Self::Validation { .. } => "GRAPHQL_VALIDATION_FAILED",
            Self::VariableCoercion { error, .. } | Self::ArgumentCoercion { error, .. } => {
                error.error_code()
            }
        }
    }

    /// Converts the error to its response representation.
    #[must_use]
    pub fn to_server_error(&self) -> ServerError {
        let mut error = ServerError::new(self.to_string()).with_extension("code", self.error_code());
        match self {
            Self::Syntax { locations, .. } | Self::Validation { locations, .. } => {
                error.locations = locations.clone();
            }
            Self::VariableCoercion {
                error: coercion,
                location,
                ..
            }
            | Self::ArgumentCoercion {
                error: coercion,
                location,
                ..
            } => {
                error.locations = vec![*location];
                error = error.with_extension("scalar", coercion.scalar.as_str());
            }
            Self::OperationNotFound(_)
            | Self::OperationNameRequired
            | Self::UnsupportedOperation(_) => {}
        }
        error
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message, .. } => write!(f, "{message}"),
            Self::OperationNotFound(name) => write!(f, "Unknown operation named \"{name}\""),
            Self::OperationNameRequired => {
                write!(f, "Operation name is required when the document contains several operations")
            }
            Self::UnsupportedOperation(kind) => {
                write!(f, "Schema is not configured for {kind} operations")
            }
            Self::Validation { message, .. } => write!(f, "{message}"),
            Self::VariableCoercion {
                variable,
                path,
                error,
                ..
            } => {
                if path.is_empty() {
                    write!(f, "Variable \"${variable}\" got invalid value: {error}")
                } else {
                    write!(f, "Variable \"${variable}\" got invalid value at \"{path}\": {error}")
                }
            }
            Self::ArgumentCoercion {
                argument,
                path,
                error,
                ..
            } => {
                if path.is_empty() {
                    write!(f, "Argument \"{argument}\" has invalid value: {error}")
                } else {
                    write!(f, "Argument \"{argument}\" has invalid value at \"{path}\": {error}")
                }
            }
        }
    }
}

impl std::error::Error for RequestError {}

/// Line and column of a document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<Pos> for Location {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}

/// One step of a response path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Response key of a field.
    Field(String),
    /// Position in a list.
    Index(usize),
}

/// Error entry of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, JsonValue>>,
}

impl ServerError {
    /// Creates an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Adds an extension entry.
    #[must_use]
    pub fn with_extension(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extensions
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Returns `extensions.code`, if present.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(JsonValue::as_str)
    }

    /// Field-scoped error for a value `serialize` refused.
    pub(crate) fn from_coercion(
        error: &CoercionError,
        pos: Pos,
        path: Vec<PathSegment>,
    ) -> Self {
        let mut server = Self::new(error.to_string())
            .with_extension("code", error.error_code())
            .with_extension("scalar", error.scalar.as_str());
        server.locations = vec![pos.into()];
        server.path = path;
        server
    }
}

/// Error returned by a field resolver.
///
/// Anything implementing `Display` converts into a `FieldError`, so resolvers
/// can use `?` on most error types.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Option<Map<String, JsonValue>>,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }

    /// Adds an extension entry.
    #[must_use]
    pub fn extend_with(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extensions
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn into_server_error(self, pos: Pos, path: Vec<PathSegment>) -> ServerError {
        ServerError {
            message: self.message,
            locations: vec![pos.into()],
            path,
            extensions: self.extensions,
        }
    }
}

impl<T: fmt::Display> From<T> for FieldError {
    fn from(err: T) -> Self {
        Self::new(err.to_string())
    }
}

/// Result type of field resolvers.
pub type FieldResult<T> = std::result::Result<T, FieldError>;

#[cfg(test)]
mod tests {
    use super::*;
    use scalarql_core::CoercionErrorKind;
    use serde_json::json;

    fn coercion(kind: CoercionErrorKind) -> CoercionError {
        CoercionError::new(kind, "CustomScalarType", "number 42")
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RequestError::Syntax {
                message: "x".into(),
                locations: vec![]
            }
            .error_code(),
            "GRAPHQL_PARSE_FAILED"
        );
        assert_eq!(
            RequestError::VariableCoercion {
                variable: "id".into(),
                path: String::new(),
                error: coercion(CoercionErrorKind::InvalidVariableValue),
                location: Location { line: 1, column: 7 },
            }
            .error_code(),
            "INVALID_VARIABLE_VALUE"
        );
    }

    #[test]
    fn test_variable_coercion_to_server_error() {
        let err = RequestError::VariableCoercion {
            variable: "id".into(),
            path: String::new(),
            error: coercion(CoercionErrorKind::InvalidVariableValue),
            location: Location { line: 1, column: 7 },
        };
        let server = err.to_server_error();
        assert_eq!(server.code(), Some("INVALID_VARIABLE_VALUE"));
        assert!(server.message.starts_with("Variable \"$id\" got invalid value"));
        assert_eq!(
            serde_json::to_value(&server).unwrap()["extensions"],
            json!({"code": "INVALID_VARIABLE_VALUE", "scalar": "CustomScalarType"})
        );
    }

    #[test]
    fn test_server_error_serialization_skips_empty() {
        let value = serde_json::to_value(ServerError::new("boom")).unwrap();
        assert_eq!(value, json!({"message": "boom"}));
    }

    #[test]
    fn test_path_segments_serialize_untagged() {
        let mut err = ServerError::new("boom");
        err.path = vec![
            PathSegment::Field("customers".into()),
            PathSegment::Index(0),
            PathSegment::Field("id".into()),
        ];
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["path"], json!(["customers", 0, "id"]));
    }

    #[test]
    fn test_field_error_from_display() {
        let err: FieldError = "not found".into();
        assert_eq!(err.message(), "not found");
        let err = FieldError::new("denied").extend_with("code", "FORBIDDEN");
        let server = err.into_server_error(Pos { line: 2, column: 3 }, vec![]);
        assert_eq!(server.code(), Some("FORBIDDEN"));
        assert_eq!(server.locations, vec![Location { line: 2, column: 3 }]);
    }
}
