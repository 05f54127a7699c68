//! Query execution.
//!
//! Execution runs in three stages: the request is parsed and its operation
//! selected, variables are coerced and the operation validated (any failure
//! here rejects the whole request), then fields are resolved and their values
//! completed. Scalar completion is where `serialize` runs; a refusal there
//! only nulls the affected field.

use async_graphql_parser::types::{
    Directive, ExecutableDocument, Field as FieldNode, OperationDefinition, OperationType, Selection,
    SelectionSet,
};
use async_graphql_parser::{Pos, Positioned};
use async_graphql_value::Name;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, join_all};
use indexmap::IndexMap;
use parking_lot::Mutex;
use scalarql_core::InternalValue;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace, warn};

use crate::coercion::{Variables, coerce_default, coerce_literal, coerce_variables};
use crate::error::{Location, PathSegment, RequestError, ServerError};
use crate::request::{Request, Response};
use crate::schema::{
    Arguments, FieldValue, NamedType, Object, ResolverContext, Schema, SchemaInner,
    TypeRef,
};
use crate::validation::{Fragments, validate_operation};

type FieldsByKey<'b> = IndexMap<String, Vec<&'b Positioned<FieldNode>>>;

impl Schema {
    /// Executes a request.
    ///
    /// Never fails as a whole: problems are reported in
    /// [`Response::errors`].
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let request = request.into();
        let schema = self.inner();

        let document = match async_graphql_parser::parse_query(&request.query) {
            Ok(document) => document,
            Err(err) => {
                debug!(error = %err, "Failed to parse GraphQL query");
                let error = RequestError::Syntax {
                    message: err.to_string(),
                    locations: err.positions().map(Location::from).collect(),
                };
                return Response::from_errors(&[error]);
            }
        };

        let operation = match select_operation(&document, request.operation_name.as_deref()) {
            Ok(operation) => operation,
            Err(err) => return Response::from_errors(&[err]),
        };

        let (root_name, serial) = match operation.node.ty {
            OperationType::Query => (schema.query_type.as_str(), !schema.config.concurrent_fields),
            OperationType::Mutation => match &schema.mutation_type {
                Some(mutation) => (mutation.as_str(), true),
                None => {
                    return Response::from_errors(&[RequestError::UnsupportedOperation(
                        "mutation".into(),
                    )]);
                }
            },
            OperationType::Subscription => {
                return Response::from_errors(&[RequestError::UnsupportedOperation(
                    "subscription".into(),
                )]);
            }
        };
        let Some(root) = schema.object(root_name) else {
            return Response::from_errors(&[RequestError::UnsupportedOperation(
                operation_kind(operation.node.ty).into(),
            )]);
        };

        debug!(
            operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
            kind = operation_kind(operation.node.ty),
            "Executing GraphQL operation"
        );

        let variables = match coerce_variables(
            schema,
            &operation.node.variable_definitions,
            &request.variables,
        ) {
            Ok(variables) => variables,
            Err(errors) => {
                warn!(errors = errors.len(), "Rejected request: invalid variable values");
                return Response::from_errors(&errors);
            }
        };

        if let Err(errors) = validate_operation(
            schema,
            root,
            &operation.node.selection_set,
            &document.fragments,
            &variables,
        ) {
            if errors
                .iter()
                .any(|e| matches!(e, RequestError::ArgumentCoercion { .. }))
            {
                warn!(errors = errors.len(), "Rejected request: invalid literal values");
            } else {
                debug!(errors = errors.len(), "Rejected request: validation failed");
            }
            return Response::from_errors(&errors);
        }

        let ctx = ExecutionContext {
            schema,
            fragments: &document.fragments,
            variables: &variables,
            errors: Mutex::new(Vec::new()),
        };

        let mut fields = FieldsByKey::new();
        ctx.collect_fields(root, &operation.node.selection_set, &mut fields);
        let data = ctx
            .execute_fields(root, None, fields, Vec::new(), serial)
            .await
            .unwrap_or(JsonValue::Null);

        let errors = ctx.errors.into_inner();
        trace!(errors = errors.len(), "GraphQL operation finished");
        Response {
            data: Some(data),
            errors,
        }
    }
}

fn select_operation<'d>(
    document: &'d ExecutableDocument,
    name: Option<&str>,
) -> Result<&'d Positioned<OperationDefinition>, RequestError> {
    match name {
        Some(name) => document
            .operations
            .iter()
            .find(|(op_name, _)| op_name.map(Name::as_str) == Some(name))
            .map(|(_, operation)| operation)
            .ok_or_else(|| RequestError::OperationNotFound(name.to_string())),
        None => {
            let mut operations = document.operations.iter();
            match (operations.next(), operations.next()) {
                (Some((_, operation)), None) => Ok(operation),
                _ => Err(RequestError::OperationNameRequired),
            }
        }
    }
}

struct ExecutionContext<'a> {
    schema: &'a SchemaInner,
    fragments: &'a Fragments,
    variables: &'a Variables,
    errors: Mutex<Vec<ServerError>>,
}

impl ExecutionContext<'_> {
    fn push_error(&self, error: ServerError) {
        self.errors.lock().push(error);
    }

    /// Groups the fields of a selection set by response key, expanding
    /// fragments and dropping skipped selections.
    fn collect_fields<'b>(
        &'b self,
        object: &Object,
        set: &'b Positioned<SelectionSet>,
        out: &mut FieldsByKey<'b>,
    ) {
        for selection in &set.node.items {
            match &selection.node {
                Selection::Field(field) => {
                    if !self.is_included(&field.node.directives) {
                        continue;
                    }
                    let key = field
                        .node
                        .alias
                        .as_ref()
                        .unwrap_or(&field.node.name)
                        .node
                        .to_string();
                    out.entry(key).or_default().push(field);
                }
                Selection::FragmentSpread(spread) => {
                    if !self.is_included(&spread.node.directives) {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(&spread.node.fragment_name.node) else {
                        continue;
                    };
                    if fragment.node.type_condition.node.on.node.as_str() == object.name {
                        self.collect_fields(object, &fragment.node.selection_set, out);
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.is_included(&inline.node.directives) {
                        continue;
                    }
                    let applies = inline
                        .node
                        .type_condition
                        .as_ref()
                        .is_none_or(|c| c.node.on.node.as_str() == object.name);
                    if applies {
                        self.collect_fields(object, &inline.node.selection_set, out);
                    }
                }
            }
        }
    }

    fn is_included(&self, directives: &[Positioned<Directive>]) -> bool {
        let condition_ty = TypeRef::named_nn(TypeRef::BOOLEAN);
        for directive in directives {
            let Some((_, value)) = directive
                .node
                .arguments
                .iter()
                .find(|(name, _)| name.node.as_str() == "if")
            else {
                continue;
            };
            let condition = coerce_literal(self.schema, &condition_ty, &value.node, self.variables, "")
                .ok()
                .and_then(|v| v.downcast_ref::<bool>().copied())
                .unwrap_or(false);
            match directive.node.name.node.as_str() {
                "skip" if condition => return false,
                "include" if !condition => return false,
                _ => {}
            }
        }
        true
    }

    /// Resolves every field of a selection set.
    ///
    /// Returns `None` when a non-null field failed, so the enclosing value
    /// must become null.
    fn execute_fields<'b>(
        &'b self,
        object: &'b Object,
        parent: Option<InternalValue>,
        fields: FieldsByKey<'b>,
        path: Vec<PathSegment>,
        serial: bool,
    ) -> BoxFuture<'b, Option<JsonValue>> {
        async move {
            let results = if serial {
                let mut results = Vec::with_capacity(fields.len());
                for (key, nodes) in fields {
                    let value = self
                        .execute_field(object, parent.clone(), &key, nodes, path.clone())
                        .await;
                    results.push((key, value));
                }
                results
            } else {
                let keys: Vec<String> = fields.keys().cloned().collect();
                let values = join_all(fields.into_iter().map(|(key, nodes)| {
                    self.execute_field(object, parent.clone(), &key, nodes, path.clone())
                }))
                .await;
                keys.into_iter().zip(values).collect()
            };

            let mut map = Map::new();
            for (key, value) in results {
                map.insert(key, value?);
            }
            Some(JsonValue::Object(map))
        }
        .boxed()
    }

    fn execute_field<'b>(
        &'b self,
        object: &'b Object,
        parent: Option<InternalValue>,
        key: &str,
        nodes: Vec<&'b Positioned<FieldNode>>,
        path: Vec<PathSegment>,
    ) -> BoxFuture<'b, Option<JsonValue>> {
        let key = key.to_string();
        async move {
            let node = nodes[0];
            let name = node.node.name.node.as_str();
            if name == "__typename" {
                return Some(JsonValue::String(object.name.clone()));
            }
            let Some(definition) = object.get_field(name) else {
                return Some(JsonValue::Null);
            };

            let mut field_path = path;
            field_path.push(PathSegment::Field(key));

            let arguments = match self.field_arguments(definition, node) {
                Ok(arguments) => arguments,
                Err(message) => {
                    self.field_error(message, node.pos, field_path);
                    return if definition.ty.is_non_null() {
                        None
                    } else {
                        Some(JsonValue::Null)
                    };
                }
            };

            trace!(object = %object.name, field = name, "Resolving field");
            let ctx = ResolverContext::new(name, field_path.clone(), parent, arguments);
            match (definition.resolver)(ctx).await {
                Ok(value) => {
                    self.complete_value(&definition.ty, value, &object.name, &nodes, field_path)
                        .await
                }
                Err(err) => {
                    self.push_error(err.into_server_error(node.pos, field_path));
                    if definition.ty.is_non_null() {
                        None
                    } else {
                        Some(JsonValue::Null)
                    }
                }
            }
        }
        .boxed()
    }

    fn field_arguments(
        &self,
        definition: &crate::schema::Field,
        node: &Positioned<FieldNode>,
    ) -> Result<Arguments, String> {
        let mut values = IndexMap::new();
        for argument in definition.arguments.values() {
            let provided = node
                .node
                .arguments
                .iter()
                .find(|(name, _)| name.node.as_str() == argument.name);
            let value = match (provided, &argument.default_value) {
                (Some((_, value)), _) => {
                    coerce_literal(self.schema, &argument.ty, &value.node, self.variables, "")
                }
                (None, Some(default)) => coerce_default(self.schema, argument, default),
                (None, None) => continue,
            };
            let value = value.map_err(|err| {
                format!("Argument \"{}\" has invalid value: {}", argument.name, err.message())
            })?;
            values.insert(argument.name.clone(), value);
        }
        Ok(Arguments::new(values))
    }

    /// Completes a resolved value against the field type.
    fn complete_value<'b>(
        &'b self,
        ty: &'b TypeRef,
        value: FieldValue,
        parent_type: &'b str,
        nodes: &'b [&'b Positioned<FieldNode>],
        path: Vec<PathSegment>,
    ) -> BoxFuture<'b, Option<JsonValue>> {
        async move {
            match ty {
                TypeRef::NonNull(inner) => {
                    if value.is_null() {
                        let field = nodes[0].node.name.node.as_str();
                        let mut error = ServerError::new(format!(
                            "Cannot return null for non-nullable field {parent_type}.{field}"
                        ));
                        error.locations = vec![nodes[0].pos.into()];
                        error.path = path;
                        self.push_error(error);
                        return None;
                    }
                    self.complete_inner(inner, value, parent_type, nodes, path).await
                }
                _ if value.is_null() => Some(JsonValue::Null),
                _ => Some(
                    self.complete_inner(ty, value, parent_type, nodes, path)
                        .await
                        .unwrap_or(JsonValue::Null),
                ),
            }
        }
        .boxed()
    }

    fn complete_inner<'b>(
        &'b self,
        ty: &'b TypeRef,
        value: FieldValue,
        parent_type: &'b str,
        nodes: &'b [&'b Positioned<FieldNode>],
        path: Vec<PathSegment>,
    ) -> BoxFuture<'b, Option<JsonValue>> {
        async move {
            let pos = nodes[0].pos;
            match (ty, value) {
                (TypeRef::NonNull(_), value) => {
                    self.complete_value(ty, value, parent_type, nodes, path).await
                }
                (TypeRef::List(item_ty), FieldValue::List(items)) => {
                    let mut completed = Vec::with_capacity(items.len());
                    for (index, item) in items.into_iter().enumerate() {
                        let mut item_path = path.clone();
                        item_path.push(PathSegment::Index(index));
                        completed.push(
                            self.complete_value(item_ty, item, parent_type, nodes, item_path)
                                .await?,
                        );
                    }
                    Some(JsonValue::Array(completed))
                }
                (TypeRef::List(_), _) => {
                    self.field_error(
                        format!("Expected a list value for field of type \"{ty}\""),
                        pos,
                        path,
                    );
                    None
                }
                (TypeRef::Named(name), FieldValue::Value(value)) => {
                    match self.schema.lookup(name) {
                        Some(NamedType::Scalar(descriptor)) => match descriptor.serialize(&value) {
                            Ok(wire) => Some(wire),
                            Err(err) => {
                                debug!(scalar = %name, error = %err, "Scalar refused to serialize value");
                                self.push_error(ServerError::from_coercion(&err, pos, path));
                                None
                            }
                        },
                        Some(NamedType::Object(object)) => {
                            let mut fields = FieldsByKey::new();
                            for node in nodes {
                                self.collect_fields(object, &node.node.selection_set, &mut fields);
                            }
                            self.execute_fields(
                                object,
                                Some(value),
                                fields,
                                path,
                                !self.schema.config.concurrent_fields,
                            )
                            .await
                        }
                        Some(NamedType::InputObject(_)) | None => {
                            self.field_error(format!("Type \"{name}\" cannot be used as output"), pos, path);
                            None
                        }
                    }
                }
                (TypeRef::Named(name), _) => {
                    self.field_error(
                        format!("Expected a single value for field of type \"{name}\", got a list"),
                        pos,
                        path,
                    );
                    None
                }
            }
        }
        .boxed()
    }

    fn field_error(&self, message: String, pos: Pos, path: Vec<PathSegment>) {
        let mut error = ServerError::new(message);
        error.locations = vec![pos.into()];
        error.path = path;
        self.push_error(error);
    }
}

fn operation_kind(ty: OperationType) -> &'static str {
    match ty {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}
