//! Per-schema scalar registry.
//!
//! The registry is owned by whoever builds a schema, so several schemas can
//! live in one process with different scalar sets. Lookups hand out shared
//! descriptors that stay valid for the registry's lifetime.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::descriptor::ScalarDescriptor;
use crate::error::RegistryError;
use crate::types::builtin;

/// Scalar descriptors indexed by type name.
#[derive(Debug, Clone, Default)]
pub struct ScalarRegistry {
    scalars: IndexMap<String, Arc<ScalarDescriptor>>,
}

impl ScalarRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `String`, `Int`, `Float`, `Boolean` and `ID`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::all() {
            registry
                .scalars
                .insert(descriptor.name().to_string(), Arc::new(descriptor));
        }
        registry
    }

    /// Registers a descriptor under its name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken.
    pub fn register(
        &mut self,
        descriptor: impl Into<Arc<ScalarDescriptor>>,
    ) -> Result<(), RegistryError> {
        let descriptor = descriptor.into();
        let name = descriptor.name().to_string();
        if self.scalars.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        debug!(scalar = %name, "Registered scalar");
        self.scalars.insert(name, descriptor);
        Ok(())
    }

    /// Looks up a descriptor by type name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ScalarDescriptor>> {
        self.scalars.get(name)
    }

    /// Returns whether a scalar with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    /// Iterates descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ScalarDescriptor>> {
        self.scalars.values()
    }

    /// Number of registered scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }
}
