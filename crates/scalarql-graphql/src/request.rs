//! Request and response payloads.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{RequestError, ServerError};

/// A GraphQL request as posted by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Query document text.
    pub query: String,

    /// Operation to run when the document has several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    /// Variable values, already decoded from JSON.
    #[serde(default, deserialize_with = "deserialize_variables")]
    pub variables: Map<String, JsonValue>,
}

fn deserialize_variables<'de, D>(deserializer: D) -> Result<Map<String, JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, JsonValue>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Request {
    /// Creates a request for the given document.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Selects the operation to run.
    #[must_use]
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Replaces all variables.
    #[must_use]
    pub fn variables(mut self, variables: Map<String, JsonValue>) -> Self {
        self.variables = variables;
        self
    }

    /// Sets one variable.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

impl From<&str> for Request {
    fn from(query: &str) -> Self {
        Self::new(query)
    }
}

impl From<String> for Request {
    fn from(query: String) -> Self {
        Self::new(query)
    }
}

/// Result of executing a request.
///
/// `data` is absent when the request was rejected before execution and
/// `null` when a non-null root field failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServerError>,
}

impl Response {
    /// Response for a request rejected before execution.
    #[must_use]
    pub fn from_errors(errors: &[RequestError]) -> Self {
        Self {
            data: None,
            errors: errors.iter().map(RequestError::to_server_error).collect(),
        }
    }

    /// Returns whether the response carries no errors.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns whether the response carries errors.
    #[must_use]
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}
