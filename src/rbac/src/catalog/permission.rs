use std::collections::HashSet;
use tracing::debug;

use crate::error::{DefinitionKind, RbacError, Result};
use crate::types::{validate_identifier, PermissionId};

/// Registry of permission identifiers
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    /// Registration order
    ordered: Vec<PermissionId>,

    /// Membership index
    index: HashSet<PermissionId>,

    frozen: bool,
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a permission
    ///
    /// # Errors
    ///
    /// - `DuplicateDefinition` if the id is already registered
    /// - `Frozen` after [`PermissionCatalog::freeze`]
    pub fn register(&mut self, id: impl Into<PermissionId>) -> Result<()> {
        let id = id.into();

        if self.frozen {
            return Err(RbacError::Frozen("permission catalog"));
        }

        validate_identifier("Permission", &id)?;

        if self.index.contains(&id) {
            return Err(RbacError::DuplicateDefinition {
                kind: DefinitionKind::Permission,
                id,
            });
        }

        debug!("Registered permission {}", id);
        self.index.insert(id.clone());
        self.ordered.push(id);
        Ok(())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Permissions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PermissionId> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
