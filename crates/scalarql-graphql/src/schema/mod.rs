//! Schema definition.
//!
//! A [`Schema`] is assembled with [`Schema::build`], which returns a
//! [`SchemaBuilder`]. Every schema owns its own scalar registry, seeded with
//! the built-in scalars, so custom scalars registered on one schema are
//! invisible to others.

mod builder;
mod resolver;
mod types;

use std::fmt::Write as _;
use std::sync::Arc;

use indexmap::IndexMap;
use scalarql_core::{ScalarDescriptor, ScalarRegistry};

use crate::config::ExecutorConfig;

pub use builder::{SchemaBuilder, Type};
pub use resolver::{ArgumentValue, Arguments, FieldValue, ResolverContext};
pub use types::{Field, InputObject, InputValue, Object, TypeRef};

/// An executable schema.
///
/// Cloning is cheap; clones share the same definitions.
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

pub(crate) struct SchemaInner {
    pub(crate) query_type: String,
    pub(crate) mutation_type: Option<String>,
    pub(crate) scalars: ScalarRegistry,
    pub(crate) objects: IndexMap<String, Object>,
    pub(crate) input_objects: IndexMap<String, InputObject>,
    pub(crate) config: ExecutorConfig,
}

/// A named type looked up by name.
#[derive(Clone, Copy)]
pub(crate) enum NamedType<'a> {
    Scalar(&'a Arc<ScalarDescriptor>),
    Object(&'a Object),
    InputObject(&'a InputObject),
}

impl SchemaInner {
    pub(crate) fn lookup(&self, name: &str) -> Option<NamedType<'_>> {
        if let Some(scalar) = self.scalars.get(name) {
            return Some(NamedType::Scalar(scalar));
        }
        if let Some(object) = self.objects.get(name) {
            return Some(NamedType::Object(object));
        }
        self.input_objects.get(name).map(NamedType::InputObject)
    }

    pub(crate) fn object(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }
}

impl Schema {
    /// Starts building a schema whose query root is the object `query`.
    pub fn build(query: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(query.into())
    }

    pub(crate) fn from_inner(inner: SchemaInner) -> Self {
        Self(Arc::new(inner))
    }

    pub(crate) fn inner(&self) -> &SchemaInner {
        &self.0
    }

    /// Name of the query root type.
    #[must_use]
    pub fn query_type(&self) -> &str {
        &self.0.query_type
    }

    /// Name of the mutation root type, if any.
    #[must_use]
    pub fn mutation_type(&self) -> Option<&str> {
        self.0.mutation_type.as_deref()
    }

    /// Scalars known to this schema.
    #[must_use]
    pub fn scalars(&self) -> &ScalarRegistry {
        &self.0.scalars
    }

    /// Looks up a scalar descriptor by type name.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&Arc<ScalarDescriptor>> {
        self.0.scalars.get(name)
    }

    /// Looks up an object type by name.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<&Object> {
        self.0.objects.get(name)
    }

    /// Looks up an input object type by name.
    #[must_use]
    pub fn input_object(&self, name: &str) -> Option<&InputObject> {
        self.0.input_objects.get(name)
    }

    /// Execution settings.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.0.config
    }

    /// Renders the schema in GraphQL SDL.
    ///
    /// Built-in scalars are omitted. Custom scalars carry their description
    /// and `@specifiedBy` URL.
    #[must_use]
    pub fn sdl(&self) -> String {
        let mut out = String::new();
        let inner = &self.0;

        let default_roots = inner.query_type == "Query"
            && inner.mutation_type.as_deref().is_none_or(|m| m == "Mutation");
        if !default_roots {
            out.push_str("schema {\n");
            let _ = writeln!(out, "  query: {}", inner.query_type);
            if let Some(mutation) = &inner.mutation_type {
                let _ = writeln!(out, "  mutation: {mutation}");
            }
            out.push_str("}\n\n");
        }

        for scalar in inner.scalars.iter() {
            if is_builtin_scalar(scalar.name()) {
                continue;
            }
            write_description(&mut out, scalar.description(), "");
            let _ = write!(out, "scalar {}", scalar.name());
            if let Some(url) = scalar.specified_by_url() {
                let _ = write!(out, " @specifiedBy(url: {})", quote(url));
            }
            out.push_str("\n\n");
        }

        for object in inner.objects.values() {
            write_description(&mut out, object.description.as_deref(), "");
            let _ = writeln!(out, "type {} {{", object.name);
            for field in object.fields.values() {
                write_description(&mut out, field.description.as_deref(), "  ");
                let _ = write!(out, "  {}", field.name);
                if !field.arguments.is_empty() {
                    let args: Vec<String> = field.arguments.values().map(input_value_sdl).collect();
                    let _ = write!(out, "({})", args.join(", "));
                }
                let _ = writeln!(out, ": {}", field.ty);
            }
            out.push_str("}\n\n");
        }

        for input in inner.input_objects.values() {
            write_description(&mut out, input.description.as_deref(), "");
            let _ = writeln!(out, "input {} {{", input.name);
            for field in input.fields.values() {
                write_description(&mut out, field.description.as_deref(), "  ");
                let _ = writeln!(out, "  {}", input_value_sdl(field));
            }
            out.push_str("}\n\n");
        }

        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
        out
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("query_type", &self.0.query_type)
            .field("mutation_type", &self.0.mutation_type)
            .field("scalars", &self.0.scalars.len())
            .field("objects", &self.0.objects.len())
            .field("input_objects", &self.0.input_objects.len())
            .finish()
    }
}

/// Returns whether the name belongs to a scalar every schema provides.
#[must_use]
pub fn is_builtin_scalar(name: &str) -> bool {
    matches!(name, "String" | "Int" | "Float" | "Boolean" | "ID")
}

fn input_value_sdl(value: &InputValue) -> String {
    match &value.default_value {
        Some(default) => format!("{}: {} = {default}", value.name, value.ty),
        None => format!("{}: {}", value.name, value.ty),
    }
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) {
    if let Some(description) = description {
        let _ = writeln!(out, "{indent}{}", quote(description));
    }
}

fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
