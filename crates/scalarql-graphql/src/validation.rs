//! Pre-execution validation of the selected operation.
//!
//! Every field, argument, fragment and directive reachable from the
//! operation is checked against the schema. Argument literals are coerced here
//! so that a scalar refusing a literal rejects the request before any resolver
//! runs.

use std::collections::HashMap;

use async_graphql_parser::Positioned;
use async_graphql_parser::types::{Directive, FragmentDefinition, Selection, SelectionSet};
use async_graphql_value::Name;
use tracing::trace;

use crate::coercion::{Variables, coerce_literal};
use crate::error::RequestError;
use crate::schema::{Field, NamedType, Object, SchemaInner, TypeRef};

pub(crate) type Fragments = HashMap<Name, Positioned<FragmentDefinition>>;

/// Validates a selection set rooted at `root`.
pub(crate) fn validate_operation(
    schema: &SchemaInner,
    root: &Object,
    selection_set: &Positioned<SelectionSet>,
    fragments: &Fragments,
    variables: &Variables,
) -> Result<(), Vec<RequestError>> {
    let mut validator = Validator {
        schema,
        fragments,
        variables,
        errors: Vec::new(),
        fragment_stack: Vec::new(),
        depth_exceeded: false,
    };
    validator.selection_set(root, selection_set, 1);

    if validator.errors.is_empty() {
        Ok(())
    } else {
        trace!(errors = validator.errors.len(), "Operation failed validation");
        Err(validator.errors)
    }
}

struct Validator<'a> {
    schema: &'a SchemaInner,
    fragments: &'a Fragments,
    variables: &'a Variables,
    errors: Vec<RequestError>,
    fragment_stack: Vec<Name>,
    depth_exceeded: bool,
}

impl Validator<'_> {
    fn selection_set(&mut self, object: &Object, set: &Positioned<SelectionSet>, depth: usize) {
        for selection in &set.node.items {
            match &selection.node {
                Selection::Field(field) => {
                    self.directives(&field.node.directives);
                    self.field(object, field, depth);
                }
                Selection::FragmentSpread(spread) => {
                    self.directives(&spread.node.directives);
                    let name = &spread.node.fragment_name.node;
                    let Some(fragment) = self.fragments.get(name) else {
                        self.error(format!("Unknown fragment \"{name}\""), spread.pos);
                        continue;
                    };
                    if self.fragment_stack.contains(name) {
                        self.error(format!("Cannot spread fragment \"{name}\" within itself"), spread.pos);
                        continue;
                    }
                    let condition = &fragment.node.type_condition.node.on;
                    if !self.type_condition(object, &condition.node, condition.pos) {
                        continue;
                    }
                    self.fragment_stack.push(name.clone());
                    self.selection_set(object, &fragment.node.selection_set, depth);
                    self.fragment_stack.pop();
                }
                Selection::InlineFragment(inline) => {
                    self.directives(&inline.node.directives);
                    if let Some(condition) = &inline.node.type_condition
                        && !self.type_condition(object, &condition.node.on.node, condition.pos)
                    {
                        continue;
                    }
                    self.selection_set(object, &inline.node.selection_set, depth);
                }
            }
        }
    }

    fn field(
        &mut self,
        object: &Object,
        field: &Positioned<async_graphql_parser::types::Field>,
        depth: usize,
    ) {
        if depth > self.schema.config.max_depth {
            if !self.depth_exceeded {
                self.depth_exceeded = true;
                self.error(
                    format!(
                        "Query is nested too deep: maximum depth is {}",
                        self.schema.config.max_depth
                    ),
                    field.pos,
                );
            }
            return;
        }

        let name = field.node.name.node.as_str();
        if name == "__typename" {
            if !field.node.selection_set.node.items.is_empty() {
                self.error(
                    "Field \"__typename\" must not have a selection since type \"String!\" has no subfields",
                    field.node.selection_set.pos,
                );
            }
            return;
        }

        let Some(definition) = object.get_field(name) else {
            self.error(
                format!("Cannot query field \"{name}\" on type \"{}\"", object.name),
                field.pos,
            );
            return;
        };

        self.arguments(definition, field);

        let subselection = &field.node.selection_set;
        match self.schema.lookup(definition.ty.type_name()) {
            Some(NamedType::Object(child)) => {
                if subselection.node.items.is_empty() {
                    self.error(
                        format!(
                            "Field \"{name}\" of type \"{}\" must have a selection of subfields",
                            definition.ty
                        ),
                        field.pos,
                    );
                } else {
                    self.selection_set(child, subselection, depth + 1);
                }
            }
            _ => {
                if !subselection.node.items.is_empty() {
                    self.error(
                        format!(
                            "Field \"{name}\" must not have a selection since type \"{}\" has no subfields",
                            definition.ty
                        ),
                        subselection.pos,
                    );
                }
            }
        }
    }

    fn arguments(&mut self, definition: &Field, field: &Positioned<async_graphql_parser::types::Field>) {
        for (name, value) in &field.node.arguments {
            let Some(argument) = definition.arguments.get(name.node.as_str()) else {
                self.error(
                    format!(
                        "Unknown argument \"{}\" on field \"{}\"",
                        name.node, definition.name
                    ),
                    name.pos,
                );
                continue;
            };
            if let Err(err) = coerce_literal(self.schema, &argument.ty, &value.node, self.variables, "") {
                self.errors.push(err.into_argument_error(&argument.name, value.pos));
            }
        }

        for argument in definition.arguments.values() {
            let provided = field
                .node
                .arguments
                .iter()
                .any(|(name, _)| name.node.as_str() == argument.name);
            if !provided && argument.ty.is_non_null() && argument.default_value.is_none() {
                self.error(
                    format!(
                        "Field \"{}\" argument \"{}\" of type \"{}\" is required but not provided",
                        definition.name, argument.name, argument.ty
                    ),
                    field.pos,
                );
            }
        }
    }

    fn directives(&mut self, directives: &[Positioned<Directive>]) {
        for directive in directives {
            let name = directive.node.name.node.as_str();
            if name != "skip" && name != "include" {
                self.error(format!("Unknown directive \"@{name}\""), directive.pos);
                continue;
            }
            let mut condition = None;
            for (arg, value) in &directive.node.arguments {
                if arg.node.as_str() == "if" {
                    condition = Some(value);
                } else {
                    self.error(
                        format!("Unknown argument \"{}\" on directive \"@{name}\"", arg.node),
                        arg.pos,
                    );
                }
            }
            let Some(value) = condition else {
                self.error(
                    format!("Directive \"@{name}\" argument \"if\" of type \"Boolean!\" is required but not provided"),
                    directive.pos,
                );
                continue;
            };
            let ty = TypeRef::named_nn(TypeRef::BOOLEAN);
            if let Err(err) = coerce_literal(self.schema, &ty, &value.node, self.variables, "") {
                self.errors.push(err.into_argument_error("if", value.pos));
            }
        }
    }

    /// Returns whether selections under the condition apply to `object`.
    fn type_condition(&mut self, object: &Object, condition: &Name, pos: async_graphql_parser::Pos) -> bool {
        match self.schema.lookup(condition.as_str()) {
            None => {
                self.error(format!("Unknown type \"{condition}\""), pos);
                false
            }
            Some(_) if condition.as_str() == object.name => true,
            Some(_) => {
                self.error(
                    format!(
                        "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{condition}\"",
                        object.name
                    ),
                    pos,
                );
                false
            }
        }
    }

    fn error(&mut self, message: impl Into<String>, pos: async_graphql_parser::Pos) {
        self.errors.push(RequestError::validation(message, pos));
    }
}
