//! Direct role -> permission grants
//!
//! Only direct grants live here. Inherited permissions are resolved by the
//! engine through the role hierarchy.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{PermissionCatalog, RoleCatalog};
use crate::error::{RbacError, Result};
use crate::types::{PermissionId, RoleId};

/// Role -> directly granted permissions
#[derive(Debug, Clone)]
pub struct RolePermissionBindings {
    roles: Arc<RoleCatalog>,
    permissions: Arc<PermissionCatalog>,
    grants: HashMap<RoleId, BTreeSet<PermissionId>>,
    frozen: bool,
}

impl RolePermissionBindings {
    pub fn new(roles: Arc<RoleCatalog>, permissions: Arc<PermissionCatalog>) -> Self {
        Self {
            roles,
            permissions,
            grants: HashMap::new(),
            frozen: false,
        }
    }

    /// Grant `permission` directly to `role`
    ///
    /// Granting the same pair twice is a no-op.
    ///
    /// # Errors
    ///
    /// - `Frozen` after [`RolePermissionBindings::freeze`]
    /// - `UnknownRole` / `UnknownPermission` for unregistered identifiers
    pub fn grant(&mut self, role: &str, permission: &str) -> Result<()> {
        if self.frozen {
            return Err(RbacError::Frozen("role permission bindings"));
        }

        if !self.roles.exists(role) {
            return Err(RbacError::UnknownRole(role.to_string()));
        }

        if !self.permissions.exists(permission) {
            return Err(RbacError::UnknownPermission(permission.to_string()));
        }

        if self
            .grants
            .entry(role.to_string())
            .or_default()
            .insert(permission.to_string())
        {
            debug!("Granted {} to {}", permission, role);
        }

        Ok(())
    }

    /// Grant every registered permission to `role`
    pub fn grant_all(&mut self, role: &str) -> Result<()> {
        let permissions = Arc::clone(&self.permissions);
        for permission in permissions.iter() {
            self.grant(role, permission)?;
        }
        Ok(())
    }

    /// Permissions granted directly to `role` (never inherited ones)
    ///
    /// A registered role without grants yields an empty set.
    pub fn direct_permissions_of(&self, role: &str) -> Result<BTreeSet<PermissionId>> {
        if !self.roles.exists(role) {
            return Err(RbacError::UnknownRole(role.to_string()));
        }

        Ok(self.direct(role).cloned().unwrap_or_default())
    }

    /// Borrowing lookup for callers that already validated `role`
    pub(crate) fn direct(&self, role: &str) -> Option<&BTreeSet<PermissionId>> {
        self.grants.get(role)
    }

    pub fn grant_count(&self) -> usize {
        self.grants.values().map(BTreeSet::len).sum()
    }

    pub fn freeze(&mut self) {
        if !self.frozen {
            info!("Role permission bindings frozen: {} grants", self.grant_count());
        }
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn role_catalog(&self) -> &Arc<RoleCatalog> {
        &self.roles
    }

    pub fn permission_catalog(&self) -> &Arc<PermissionCatalog> {
        &self.permissions
    }
}
