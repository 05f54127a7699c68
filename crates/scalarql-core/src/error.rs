//! Error types for scalar coercion.
//!
//! [`CoercionError`] is the only error a descriptor operation can produce.
//! The execution engine inspects its [`CoercionErrorKind`] to decide whether
//! the failure is field scoped (output) or aborts the request (input).

use std::fmt;

use thiserror::Error;

/// Which of the three coercion operations rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoercionErrorKind {
    /// `serialize` did not recognize the internal value.
    UnserializableValue,
    /// `parse_value` did not accept the decoded variable.
    InvalidVariableValue,
    /// `parse_literal` did not accept the literal node.
    InvalidLiteralValue,
}

impl CoercionErrorKind {
    /// Returns the error code used in response error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnserializableValue => "UNSERIALIZABLE_VALUE",
            Self::InvalidVariableValue => "INVALID_VARIABLE_VALUE",
            Self::InvalidLiteralValue => "INVALID_LITERAL_VALUE",
        }
    }

    /// Returns whether a failure of this kind aborts the whole request.
    #[must_use]
    pub fn is_request_level(&self) -> bool {
        !matches!(self, Self::UnserializableValue)
    }
}

/// A value did not fit a scalar's accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    /// Operation that failed.
    pub kind: CoercionErrorKind,
    /// Name of the scalar type.
    pub scalar: String,
    /// What was received: a Rust type name, a wire shape or a literal kind.
    pub received: String,
    /// Optional detail supplied by the scalar implementation.
    pub reason: Option<String>,
}

impl CoercionError {
    /// Creates a new coercion error.
    pub fn new(
        kind: CoercionErrorKind,
        scalar: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            scalar: scalar.into(),
            received: received.into(),
            reason: None,
        }
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the error code used in response error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = &self.scalar;
        let received = &self.received;
        match self.kind {
            CoercionErrorKind::UnserializableValue => {
                write!(f, "Scalar \"{scalar}\" cannot serialize a value of type {received}")?;
            }
            CoercionErrorKind::InvalidVariableValue => {
                write!(f, "Invalid variable value for scalar \"{scalar}\": got {received}")?;
            }
            CoercionErrorKind::InvalidLiteralValue => {
                write!(f, "Invalid literal for scalar \"{scalar}\": got {received}")?;
            }
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

impl std::error::Error for CoercionError {}

/// Returned by scalar implementations to refuse a value.
///
/// A rejection carries no scalar name and no operation; the descriptor
/// wrapping the implementation fills those in when it builds the
/// [`CoercionError`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejection {
    reason: Option<String>,
}

impl Rejection {
    /// The value's shape is not one the scalar accepts.
    #[must_use]
    pub fn unexpected() -> Self {
        Self::default()
    }

    /// The shape is accepted but the content is not.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }

    /// Returns the detail message, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub(crate) fn into_coercion_error(
        self,
        kind: CoercionErrorKind,
        scalar: &str,
        received: impl Into<String>,
    ) -> CoercionError {
        let error = CoercionError::new(kind, scalar, received);
        match self.reason {
            Some(reason) => error.with_reason(reason),
            None => error,
        }
    }
}

/// Errors building a [`ScalarDescriptor`](crate::ScalarDescriptor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("Scalar name cannot be empty")]
    EmptyName,

    #[error("Invalid scalar name \"{0}\": must match [_A-Za-z][_0-9A-Za-z]*")]
    InvalidName(String),

    #[error("Scalar name \"{0}\" is reserved: names starting with \"__\" belong to introspection")]
    ReservedName(String),

    #[error("Scalar \"{scalar}\" is missing its {operation} function")]
    MissingOperation {
        scalar: String,
        operation: &'static str,
    },
}

/// Errors registering scalars.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Scalar \"{0}\" is already registered")]
    Duplicate(String),
}
