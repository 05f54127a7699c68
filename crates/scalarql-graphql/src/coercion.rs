//! Input side of the coercion dispatcher.
//!
//! Variables arrive as decoded JSON and go through each scalar's
//! `parse_value`; arguments written in the query text (and schema defaults)
//! arrive as AST values and go through `parse_literal`. Lists, non-null
//! wrappers and input objects are walked here so that descriptors only ever
//! see a single scalar position.

use std::collections::HashMap;

use async_graphql_parser::Pos;
use async_graphql_value::{ConstValue, Name, Value};
use indexmap::IndexMap;
use scalarql_core::{CoercionError, Literal};
use serde_json::Value as JsonValue;

use crate::error::{Location, RequestError};
use crate::schema::{ArgumentValue, InputObject, InputValue, NamedType, SchemaInner, TypeRef};

/// Failure while coercing one input position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InputError {
    /// A scalar refused the value.
    Coercion { path: String, error: CoercionError },
    /// The value does not fit the type's structure.
    Invalid { path: String, message: String },
}

impl InputError {
    fn invalid(path: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn into_variable_error(self, variable: &str, pos: Pos) -> RequestError {
        match self {
            Self::Coercion { path, error } => RequestError::VariableCoercion {
                variable: variable.to_string(),
                path,
                error,
                location: Location::from(pos),
            },
            Self::Invalid { path, message } => RequestError::validation(
                format!("Variable \"${variable}\" got invalid value{}: {message}", at(&path)),
                pos,
            ),
        }
    }

    pub(crate) fn into_argument_error(self, argument: &str, pos: Pos) -> RequestError {
        match self {
            Self::Coercion { path, error } => RequestError::ArgumentCoercion {
                argument: argument.to_string(),
                path,
                error,
                location: Location::from(pos),
            },
            Self::Invalid { path, message } => RequestError::validation(
                format!("Argument \"{argument}\" has invalid value{}: {message}", at(&path)),
                pos,
            ),
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            Self::Coercion { path, error } => format!("{error}{}", at(path)),
            Self::Invalid { path, message } => format!("{message}{}", at(path)),
        }
    }
}

fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at \"{path}\"")
    }
}

fn field_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// Type a variable was declared with.
#[derive(Debug)]
struct Declared {
    ty: TypeRef,
    has_default: bool,
}

/// Coerced operation variables.
#[derive(Debug, Default)]
pub(crate) struct Variables {
    declared: HashMap<String, Declared>,
    values: HashMap<String, ArgumentValue>,
    raw: HashMap<String, JsonValue>,
}

impl Variables {
    fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name)
    }

    fn raw(&self, name: &str) -> Option<&JsonValue> {
        self.raw.get(name)
    }

    fn declared(&self, name: &str) -> Option<&Declared> {
        self.declared.get(name)
    }
}

/// Returns whether a variable of type `variable` may be used where `location`
/// is expected.
///
/// A nullable variable fits a non-null location only when it has a default.
fn is_allowed_position(variable: &TypeRef, has_default: bool, location: &TypeRef) -> bool {
    match location {
        TypeRef::NonNull(inner) if !variable.is_non_null() => {
            has_default && is_compatible(variable, inner)
        }
        _ => is_compatible(variable, location),
    }
}

fn is_compatible(variable: &TypeRef, location: &TypeRef) -> bool {
    match (variable, location) {
        (TypeRef::NonNull(variable), TypeRef::NonNull(location)) => is_compatible(variable, location),
        (_, TypeRef::NonNull(_)) => false,
        (TypeRef::NonNull(variable), location) => is_compatible(variable, location),
        (TypeRef::List(variable), TypeRef::List(location)) => is_compatible(variable, location),
        (TypeRef::Named(variable), TypeRef::Named(location)) => variable == location,
        _ => false,
    }
}

/// Coerces every variable declared by an operation.
///
/// All variables are checked so that the client sees every bad value at once.
pub(crate) fn coerce_variables(
    schema: &SchemaInner,
    definitions: &[async_graphql_parser::Positioned<async_graphql_parser::types::VariableDefinition>],
    provided: &serde_json::Map<String, JsonValue>,
) -> Result<Variables, Vec<RequestError>> {
    let mut variables = Variables::default();
    let mut errors = Vec::new();

    for definition in definitions {
        let name = definition.node.name.node.as_str();
        let pos = definition.pos;
        let ty = TypeRef::from_ast(&definition.node.var_type.node);
        variables.declared.insert(
            name.to_string(),
            Declared {
                ty: ty.clone(),
                has_default: definition.node.default_value.is_some(),
            },
        );

        match schema.lookup(ty.type_name()) {
            Some(NamedType::Scalar(_)) | Some(NamedType::InputObject(_)) => {}
            Some(NamedType::Object(_)) => {
                errors.push(RequestError::validation(
                    format!("Variable \"${name}\" cannot be of non-input type \"{ty}\""),
                    pos,
                ));
                continue;
            }
            None => {
                errors.push(RequestError::validation(
                    format!("Unknown type \"{}\" for variable \"${name}\"", ty.type_name()),
                    pos,
                ));
                continue;
            }
        }

        if let Some(value) = provided.get(name) {
            match coerce_variable(schema, &ty, value, "") {
                Ok(coerced) => {
                    variables.values.insert(name.to_string(), coerced);
                    variables.raw.insert(name.to_string(), value.clone());
                }
                Err(err) => errors.push(err.into_variable_error(name, pos)),
            }
        } else if let Some(default) = &definition.node.default_value {
            let literal = default.node.clone().into_value();
            match coerce_literal(schema, &ty, &literal, &Variables::default(), "") {
                Ok(coerced) => {
                    variables.values.insert(name.to_string(), coerced);
                    if let Ok(json) = default.node.clone().into_json() {
                        variables.raw.insert(name.to_string(), json);
                    }
                }
                Err(err) => errors.push(err.into_variable_error(name, default.pos)),
            }
        } else if ty.is_non_null() {
            errors.push(RequestError::validation(
                format!("Variable \"${name}\" of required type \"{ty}\" was not provided"),
                pos,
            ));
        }
    }

    if errors.is_empty() {
        Ok(variables)
    } else {
        Err(errors)
    }
}

/// Coerces a decoded JSON value against an input type.
pub(crate) fn coerce_variable(
    schema: &SchemaInner,
    ty: &TypeRef,
    value: &JsonValue,
    path: &str,
) -> Result<ArgumentValue, InputError> {
    match ty {
        TypeRef::NonNull(inner) => {
            if value.is_null() {
                return Err(InputError::invalid(path, format!("expected non-null value of type \"{ty}\"")));
            }
            coerce_variable(schema, inner, value, path)
        }
        _ if value.is_null() => Ok(ArgumentValue::Null),
        TypeRef::List(inner) => match value {
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_variable(schema, inner, item, &index_path(path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(ArgumentValue::List),
            single => Ok(ArgumentValue::List(vec![coerce_variable(
                schema, inner, single, path,
            )?])),
        },
        TypeRef::Named(name) => match schema.lookup(name) {
            Some(NamedType::Scalar(descriptor)) => descriptor
                .parse_value(value)
                .map(ArgumentValue::Scalar)
                .map_err(|error| InputError::Coercion {
                    path: path.to_string(),
                    error,
                }),
            Some(NamedType::InputObject(object)) => {
                let JsonValue::Object(map) = value else {
                    return Err(InputError::invalid(
                        path,
                        format!("expected an object for input type \"{name}\""),
                    ));
                };
                check_unknown_fields(object, map.keys().map(String::as_str), path)?;
                coerce_input_fields(schema, object, path, |field| {
                    map.get(field.name.as_str())
                        .map(|v| coerce_variable(schema, &field.ty, v, &field_path(path, &field.name)))
                })
            }
            _ => Err(InputError::invalid(path, format!("\"{name}\" is not an input type"))),
        },
    }
}

/// Coerces an AST value against an input type.
///
/// Variable references are replaced by their already coerced values.
pub(crate) fn coerce_literal(
    schema: &SchemaInner,
    ty: &TypeRef,
    value: &Value,
    variables: &Variables,
    path: &str,
) -> Result<ArgumentValue, InputError> {
    if let Value::Variable(name) = value {
        let Some(declared) = variables.declared(name.as_str()) else {
            return Err(InputError::invalid(
                path,
                format!("variable \"${name}\" is not defined"),
            ));
        };
        if !is_allowed_position(&declared.ty, declared.has_default, ty) {
            return Err(InputError::invalid(
                path,
                format!(
                    "variable \"${name}\" of type \"{}\" used in position expecting type \"{ty}\"",
                    declared.ty
                ),
            ));
        }
        return match variables.get(name.as_str()) {
            Some(coerced) if ty.is_non_null() && coerced.is_null() => Err(InputError::invalid(
                path,
                format!("variable \"${name}\" is null but \"{ty}\" is required"),
            )),
            Some(coerced) => Ok(coerced.clone()),
            None if ty.is_non_null() => Err(InputError::invalid(
                path,
                format!("variable \"${name}\" was not provided but \"{ty}\" is required"),
            )),
            None => Ok(ArgumentValue::Null),
        };
    }

    match ty {
        TypeRef::NonNull(inner) => {
            if matches!(value, Value::Null) {
                return Err(InputError::invalid(path, format!("expected non-null value of type \"{ty}\"")));
            }
            coerce_literal(schema, inner, value, variables, path)
        }
        _ if matches!(value, Value::Null) => Ok(ArgumentValue::Null),
        TypeRef::List(inner) => match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_literal(schema, inner, item, variables, &index_path(path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(ArgumentValue::List),
            single => Ok(ArgumentValue::List(vec![coerce_literal(
                schema, inner, single, variables, path,
            )?])),
        },
        TypeRef::Named(name) => match schema.lookup(name) {
            Some(NamedType::Scalar(descriptor)) => {
                let literal = to_literal(value, variables, path)?;
                descriptor
                    .parse_literal(&literal)
                    .map(ArgumentValue::Scalar)
                    .map_err(|error| InputError::Coercion {
                        path: path.to_string(),
                        error,
                    })
            }
            Some(NamedType::InputObject(object)) => {
                let Value::Object(map) = value else {
                    return Err(InputError::invalid(
                        path,
                        format!("expected an object for input type \"{name}\""),
                    ));
                };
                check_unknown_fields(object, map.keys().map(Name::as_str), path)?;
                coerce_input_fields(schema, object, path, |field| {
                    map.iter()
                        .find(|(key, _)| key.as_str() == field.name)
                        .map(|(_, v)| {
                            coerce_literal(schema, &field.ty, v, variables, &field_path(path, &field.name))
                        })
                })
            }
            _ => Err(InputError::invalid(path, format!("\"{name}\" is not an input type"))),
        },
    }
}

/// Coerces a schema default value.
pub(crate) fn coerce_default(
    schema: &SchemaInner,
    input: &InputValue,
    default: &ConstValue,
) -> Result<ArgumentValue, InputError> {
    coerce_literal(
        schema,
        &input.ty,
        &default.clone().into_value(),
        &Variables::default(),
        &input.name,
    )
}

fn check_unknown_fields<'k>(
    object: &InputObject,
    keys: impl Iterator<Item = &'k str>,
    path: &str,
) -> Result<(), InputError> {
    for key in keys {
        if !object.fields.contains_key(key) {
            return Err(InputError::invalid(
                path,
                format!("field \"{key}\" is not defined by type \"{}\"", object.name),
            ));
        }
    }
    Ok(())
}

fn coerce_input_fields<F>(
    schema: &SchemaInner,
    object: &InputObject,
    path: &str,
    mut provided: F,
) -> Result<ArgumentValue, InputError>
where
    F: FnMut(&InputValue) -> Option<Result<ArgumentValue, InputError>>,
{
    let mut fields = IndexMap::new();
    for field in object.fields.values() {
        match provided(field) {
            Some(result) => {
                fields.insert(field.name.clone(), result?);
            }
            None => {
                if let Some(default) = &field.default_value {
                    let value = coerce_default(schema, field, default).map_err(|err| {
                        InputError::invalid(&field_path(path, &field.name), err.message())
                    })?;
                    fields.insert(field.name.clone(), value);
                } else if field.ty.is_non_null() {
                    return Err(InputError::invalid(
                        path,
                        format!(
                            "field \"{}\" of required type \"{}\" was not provided",
                            field.name, field.ty
                        ),
                    ));
                }
            }
        }
    }
    Ok(ArgumentValue::Object(fields))
}

/// Resolves nested variable references and converts to a scalar literal.
fn to_literal(value: &Value, variables: &Variables, path: &str) -> Result<Literal, InputError> {
    let constant = value.clone().into_const_with(|name| {
        let raw = variables.raw(name.as_str()).ok_or_else(|| {
            InputError::invalid(path, format!("variable \"${name}\" has no value"))
        })?;
        ConstValue::from_json(raw.clone()).map_err(|e| InputError::invalid(path, e.to_string()))
    })?;
    Literal::try_from(&constant).map_err(|e| InputError::invalid(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, FieldValue, Object, Schema};
    use scalarql_core::{CoercionErrorKind, CustomId, CustomScalar, ScalarDescriptor};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::build("Query")
            .register(ScalarDescriptor::of::<CustomId>().unwrap())
            .register(
                InputObject::new("CustomerFilter")
                    .field(InputValue::new("id", TypeRef::named_nn(CustomId::NAME)))
                    .field(InputValue::new("limit", TypeRef::named(TypeRef::INT)).default_value(10)),
            )
            .register(Object::new("Query").field(Field::new(
                "ping",
                TypeRef::named(TypeRef::STRING),
                |_| async { Ok(FieldValue::value("pong")) },
            )))
            .finish()
            .unwrap()
    }

    fn parse_value(source: &str) -> Value {
        let doc = async_graphql_parser::parse_query(format!("{{ f(a: {source}) }}")).unwrap();
        let (_, op) = doc.operations.iter().next().unwrap();
        let async_graphql_parser::types::Selection::Field(field) =
            &op.node.selection_set.node.items[0].node
        else {
            panic!("expected field");
        };
        field.node.arguments[0].1.node.clone()
    }

    #[test]
    fn test_variable_scalar_goes_through_parse_value() {
        let schema = schema();
        let value =
            coerce_variable(schema.inner(), &TypeRef::named(CustomId::NAME), &json!("abc"), "").unwrap();
        assert_eq!(value.downcast_ref::<CustomId>(), Some(&CustomId::new("abc")));

        let err = coerce_variable(schema.inner(), &TypeRef::named(CustomId::NAME), &json!(42), "")
            .unwrap_err();
        let InputError::Coercion { error, .. } = err else {
            panic!("expected coercion error");
        };
        assert_eq!(error.kind, CoercionErrorKind::InvalidVariableValue);
    }

    #[test]
    fn test_variable_single_item_becomes_list() {
        let schema = schema();
        let value = coerce_variable(
            schema.inner(),
            &TypeRef::named_nn_list(CustomId::NAME),
            &json!("abc"),
            "",
        )
        .unwrap();
        assert_eq!(value.as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_variable_input_object_defaults_and_paths() {
        let schema = schema();
        let ty = TypeRef::named("CustomerFilter");
        let value = coerce_variable(schema.inner(), &ty, &json!({"id": "abc"}), "").unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields["limit"].downcast_ref::<i32>(), Some(&10));

        let err = coerce_variable(schema.inner(), &ty, &json!({"id": 7}), "").unwrap_err();
        assert!(matches!(err, InputError::Coercion { ref path, .. } if path == "id"));

        let err = coerce_variable(schema.inner(), &ty, &json!({"limit": 1}), "").unwrap_err();
        assert!(matches!(err, InputError::Invalid { .. }));

        let err = coerce_variable(schema.inner(), &ty, &json!({"id": "a", "extra": 1}), "")
            .unwrap_err();
        assert!(err.message().contains("\"extra\""));
    }

    #[test]
    fn test_literal_scalar_goes_through_parse_literal() {
        let schema = schema();
        let ty = TypeRef::named(CustomId::NAME);
        let value =
            coerce_literal(schema.inner(), &ty, &parse_value("\"5b42ba57289\""), &Variables::default(), "")
                .unwrap();
        assert_eq!(value.downcast_ref::<CustomId>(), Some(&CustomId::new("5b42ba57289")));

        let err = coerce_literal(schema.inner(), &ty, &parse_value("42"), &Variables::default(), "")
            .unwrap_err();
        let InputError::Coercion { error, .. } = err else {
            panic!("expected coercion error");
        };
        assert_eq!(error.kind, CoercionErrorKind::InvalidLiteralValue);
        assert_eq!(error.received, "int literal");
    }

    #[test]
    fn test_literal_list_paths() {
        let schema = schema();
        let ty = TypeRef::named_list(CustomId::NAME);
        let err = coerce_literal(schema.inner(), &ty, &parse_value("[\"a\", 1]"), &Variables::default(), "")
            .unwrap_err();
        assert!(matches!(err, InputError::Coercion { ref path, .. } if path == "[1]"));
    }

    #[test]
    fn test_literal_null_for_non_null() {
        let schema = schema();
        let err = coerce_literal(
            schema.inner(),
            &TypeRef::named_nn(CustomId::NAME),
            &parse_value("null"),
            &Variables::default(),
            "",
        )
        .unwrap_err();
        assert!(matches!(err, InputError::Invalid { .. }));
    }

    #[test]
    fn test_undefined_variable_reference() {
        let schema = schema();
        let err = coerce_literal(
            schema.inner(),
            &TypeRef::named(CustomId::NAME),
            &parse_value("$missing"),
            &Variables::default(),
            "",
        )
        .unwrap_err();
        assert!(err.message().contains("not defined"));
    }

    #[test]
    fn test_variable_positions() {
        let id = || TypeRef::named(CustomId::NAME);
        let id_nn = || TypeRef::named_nn(CustomId::NAME);

        assert!(is_allowed_position(&id(), false, &id()));
        assert!(is_allowed_position(&id_nn(), false, &id()));
        assert!(!is_allowed_position(&id(), false, &id_nn()));
        assert!(is_allowed_position(&id(), true, &id_nn()));

        assert!(!is_allowed_position(&TypeRef::named(TypeRef::INT), false, &id()));
        assert!(!is_allowed_position(&id_nn(), false, &TypeRef::named_nn_list(CustomId::NAME)));
        assert!(is_allowed_position(
            &TypeRef::named_nn_list_nn(CustomId::NAME),
            false,
            &TypeRef::named_nn_list(CustomId::NAME)
        ));
        assert!(!is_allowed_position(
            &TypeRef::named_list(CustomId::NAME),
            false,
            &TypeRef::named_nn_list(CustomId::NAME)
        ));
    }
}
