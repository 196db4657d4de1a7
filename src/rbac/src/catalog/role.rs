use std::collections::HashMap;
use tracing::debug;

use crate::error::{DefinitionKind, RbacError, Result};
use crate::types::{validate_identifier, Namespace, Role, RoleId};

/// Registry of roles grouped by namespace
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    /// Roles in registration order
    roles: Vec<Role>,

    /// Role id -> position in `roles`
    index: HashMap<RoleId, usize>,

    frozen: bool,
}

impl RoleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role in a namespace
    pub fn register(&mut self, id: impl Into<RoleId>, namespace: Namespace) -> Result<()> {
        self.register_role(Role::new(id, namespace))
    }

    /// Register a fully described role
    ///
    /// # Errors
    ///
    /// - `DuplicateDefinition` if the id is already registered, in any namespace
    /// - `Frozen` after [`RoleCatalog::freeze`]
    pub fn register_role(&mut self, role: Role) -> Result<()> {
        if self.frozen {
            return Err(RbacError::Frozen("role catalog"));
        }

        validate_identifier("Role", &role.id)?;

        if self.index.contains_key(&role.id) {
            return Err(RbacError::DuplicateDefinition {
                kind: DefinitionKind::Role,
                id: role.id,
            });
        }

        debug!("Registered role {} in namespace {}", role.id, role.namespace);
        self.index.insert(role.id.clone(), self.roles.len());
        self.roles.push(role);
        Ok(())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Role> {
        self.index.get(id).map(|&idx| &self.roles[idx])
    }

    /// Roles of one namespace in registration order
    pub fn list_by_namespace(&self, namespace: Namespace) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|role| role.namespace == namespace)
            .collect()
    }

    /// All roles in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
